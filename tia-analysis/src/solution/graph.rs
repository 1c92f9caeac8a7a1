//! Project dependency graph: cycle detection and compilation order.

use std::path::{Path, PathBuf};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tia_core::errors::SolutionError;
use tia_core::types::collections::FxHashMap;

use super::types::SolutionInfo;

/// Dependency graph over the projects of one solution.
///
/// Only references whose target is also a project in the solution
/// contribute edges; references to external projects are ignored.
pub struct ProjectDependencyGraph {
    graph: DiGraph<PathBuf, ()>,
    nodes: FxHashMap<PathBuf, NodeIndex>,
}

impl ProjectDependencyGraph {
    /// Build the graph. Edge direction is dependent -> dependency.
    pub fn build(solution: &SolutionInfo) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes: FxHashMap<PathBuf, NodeIndex> = FxHashMap::default();

        for project in &solution.projects {
            let path = canonical_key(&project.path);
            let idx = graph.add_node(path.clone());
            nodes.insert(path, idx);
        }

        for project in &solution.projects {
            let from = nodes[&canonical_key(&project.path)];
            for reference in &project.project_references {
                if let Some(&to) = nodes.get(&canonical_key(reference)) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        Self { graph, nodes }
    }

    /// Compilation order: dependencies first.
    ///
    /// The first strongly-connected component with more than one member (or
    /// a self-loop) fails the build with `CircularDependency`, reporting
    /// the cycle members in order.
    pub fn compilation_order(&self) -> Result<Vec<PathBuf>, SolutionError> {
        // tarjan_scc returns components in reverse topological order, which
        // is exactly dependencies-first.
        let sccs = tarjan_scc(&self.graph);

        for scc in &sccs {
            let is_cycle = scc.len() > 1
                || (scc.len() == 1 && self.graph.contains_edge(scc[0], scc[0]));
            if is_cycle {
                let cycle = scc
                    .iter()
                    .map(|&idx| self.graph[idx].display().to_string())
                    .collect();
                return Err(SolutionError::CircularDependency { cycle });
            }
        }

        Ok(sccs
            .into_iter()
            .flatten()
            .map(|idx| self.graph[idx].clone())
            .collect())
    }

    /// Direct dependencies of a project.
    pub fn dependencies_of(&self, project_path: &Path) -> Vec<PathBuf> {
        let Some(&idx) = self.nodes.get(&canonical_key(project_path)) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Outgoing)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    /// Projects that directly reference the given project.
    pub fn dependents_of(&self, project_path: &Path) -> Vec<PathBuf> {
        let Some(&idx) = self.nodes.get(&canonical_key(project_path)) else {
            return Vec::new();
        };
        self.graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .map(|n| self.graph[n].clone())
            .collect()
    }

    pub fn project_count(&self) -> usize {
        self.graph.node_count()
    }
}

/// Normalize a path for identity comparison across manifest spellings.
pub(crate) fn canonical_key(path: &Path) -> PathBuf {
    match path.canonicalize() {
        Ok(p) => p,
        Err(_) => lexical_normalize(path),
    }
}

/// Resolve `.` and `..` components without touching the filesystem.
fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

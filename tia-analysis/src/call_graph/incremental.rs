//! Incremental, method-focused graph construction.
//!
//! Builds a partial graph around one target method instead of the whole
//! solution: the symbol index names the files that may declare the target,
//! a scoped compilation covers them, and bounded expansion pulls in files
//! that declare discovered callees or reference the frontier by name.
//! Results are cached by `(target_method_id, max_depth)` and evicted only
//! by an explicit clear.

use std::path::PathBuf;
use std::sync::Arc;

use tia_core::errors::GraphError;
use tia_core::traits::CancellationToken;
use tia_core::types::collections::{FxHashMap, FxHashSet};
use tracing::{debug, info};

use crate::index::SymbolIndex;
use crate::semantic::provider::ScopedCompilation;

use super::builder::CallGraphBuilder;
use super::graph::CallGraph;

pub struct IncrementalGraphBuilder {
    parallelism: usize,
    cache: FxHashMap<(String, u32), Arc<CallGraph>>,
}

impl IncrementalGraphBuilder {
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism,
            cache: FxHashMap::default(),
        }
    }

    /// Build (or fetch) the partial graph around `target_method_id`,
    /// expanded up to `max_depth` hops in both directions.
    pub fn build_focused(
        &mut self,
        target_method_id: &str,
        max_depth: u32,
        index: &SymbolIndex,
        token: &CancellationToken,
    ) -> Result<Arc<CallGraph>, GraphError> {
        let key = (target_method_id.to_string(), max_depth);
        if let Some(graph) = self.cache.get(&key) {
            return Ok(Arc::clone(graph));
        }

        let seed_files = index.find_files_containing_method(target_method_id);
        if seed_files.is_empty() {
            debug!(method = target_method_id, "no declaring files; empty focused graph");
            let empty = Arc::new(CallGraph::new());
            self.cache.insert(key, Arc::clone(&empty));
            return Ok(empty);
        }

        let graph = self.expand(target_method_id, max_depth, seed_files, index, token)?;
        let graph = Arc::new(graph);
        self.cache.insert(key, Arc::clone(&graph));
        Ok(graph)
    }

    /// Drop all cached focused graphs.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    pub fn cached_graph_count(&self) -> usize {
        self.cache.len()
    }

    fn expand(
        &self,
        target_method_id: &str,
        max_depth: u32,
        seed_files: Vec<PathBuf>,
        index: &SymbolIndex,
        token: &CancellationToken,
    ) -> Result<CallGraph, GraphError> {
        let builder = CallGraphBuilder::new(self.parallelism);
        let mut included: FxHashSet<PathBuf> = seed_files.iter().cloned().collect();
        let mut provider = ScopedCompilation::new(seed_files);
        let (mut graph, _) = builder.build(&provider, token)?;

        // Each round covers one more hop of the eventual BFS, starting at
        // the target itself. New files mean new edges, so the graph is
        // rebuilt over the larger scope.
        for round in 0..=max_depth {
            if token.is_cancelled() {
                break;
            }
            let frontier = bounded_frontier(&graph, target_method_id, round);
            if frontier.is_empty() {
                break;
            }

            let mut new_files: Vec<PathBuf> = Vec::new();
            for method_id in &frontier {
                // Dependencies: files declaring callees not yet modeled.
                if graph.get_method_info(method_id).is_none() {
                    for file in index.find_files_containing_method(method_id) {
                        if included.insert(file.clone()) {
                            new_files.push(file);
                        }
                    }
                    continue;
                }
                // Callers: files that reference the frontier method by name.
                let simple = simple_name_of(method_id);
                for file in index.find_files_referencing(&simple) {
                    if included.insert(file.clone()) {
                        new_files.push(file);
                    }
                }
            }

            // A round with no new files still advances: the next frontier
            // may reach methods whose referencing files are not yet in.
            if !new_files.is_empty() {
                debug!(
                    round,
                    added = new_files.len(),
                    total = included.len(),
                    "extending focused graph"
                );
                provider.add_files(new_files);
                let (rebuilt, _) = builder.build(&provider, token)?;
                graph = rebuilt;
            }
        }

        info!(
            method = target_method_id,
            files = included.len(),
            methods = graph.method_count(),
            "focused graph built"
        );
        Ok(graph)
    }
}

/// Methods at exactly `depth` hops from the target, in both directions.
/// Depth 0 is the target itself.
fn bounded_frontier(graph: &CallGraph, target: &str, depth: u32) -> Vec<String> {
    let mut current: FxHashSet<String> = FxHashSet::default();
    current.insert(target.to_string());
    let mut visited = current.clone();

    for _ in 0..depth {
        let mut next: FxHashSet<String> = FxHashSet::default();
        for id in &current {
            for neighbor in graph
                .get_method_calls(id)
                .into_iter()
                .chain(graph.get_method_dependents(id))
            {
                if visited.insert(neighbor.clone()) {
                    next.insert(neighbor);
                }
            }
        }
        if next.is_empty() {
            return Vec::new();
        }
        current = next;
    }

    current.into_iter().collect()
}

fn simple_name_of(method_id: &str) -> String {
    let head = method_id.split('(').next().unwrap_or(method_id);
    head.rsplit('.').next().unwrap_or(head).to_string()
}

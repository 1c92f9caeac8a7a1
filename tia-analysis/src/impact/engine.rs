//! The impact engine: diff in, ranked impacted tests out.
//!
//! Pipeline: parse the diff, load the solution, build the symbol index,
//! decide scope, build the call graph over that scope, map changed names
//! to declared methods, and walk the reverse graph to tests.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tia_core::config::TiaConfig;
use tia_core::errors::AnalysisError;
use tia_core::traits::CancellationToken;
use tia_core::types::collections::FxHashSet;
use tracing::{debug, info};

use crate::call_graph::{
    CallGraph, CallGraphBuilder, ConfidenceLadder, IncrementalGraphBuilder, TestCoverageResult,
};
use crate::diff::{parse_diff, ChangeType, CodeChangeSet, DiffSource};
use crate::index::SymbolIndex;
use crate::semantic::provider::{ScopedCompilation, WorkspaceCompilation};
use crate::solution::graph::canonical_key;
use crate::solution::{ProjectDependencyGraph, SolutionInfo, SolutionLoader};

use super::types::{ImpactResult, ImpactedTest};

/// Changed-file share of the solution below which the engine builds a
/// scoped graph instead of a whole-solution graph.
const SCOPED_BUILD_RATIO: f64 = 0.30;

/// Top-level analyzer for one solution.
pub struct ImpactAnalyzer {
    config: TiaConfig,
    token: CancellationToken,
}

impl ImpactAnalyzer {
    pub fn new(config: TiaConfig) -> Self {
        Self {
            config,
            token: CancellationToken::new(),
        }
    }

    pub fn with_token(config: TiaConfig, token: CancellationToken) -> Self {
        Self { config, token }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    /// Analyze which tests a diff impacts.
    pub fn analyze_diff_impact(
        &self,
        diff: &DiffSource,
        solution_path: &Path,
    ) -> Result<ImpactResult, AnalysisError> {
        let diff_text = diff.read()?;
        let changes = parse_diff(&diff_text);

        let loader = SolutionLoader::new(&self.config);
        let solution = loader.load(solution_path)?;
        let solution_dir = solution_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        self.check_cancelled()?;

        let parallelism = self.config.index.effective_parallelism();
        let changed_files = resolve_changed_files(&changes, &solution_dir);

        // Index scope: projects owning changed files plus their direct
        // dependents, when the change is small; otherwise everything.
        let mut index = SymbolIndex::new();
        let dep_graph = ProjectDependencyGraph::build(&solution);
        let scoped = is_scoped_build(&solution, &changed_files);
        if scoped {
            let relevant = relevant_projects(&solution, &dep_graph, &changed_files);
            if index
                .build_scoped(&solution, &changed_files, &relevant, parallelism, &self.token)
                .is_err()
            {
                // Nothing indexable in scope (e.g. the diff names files
                // outside every project): degrade to a full index.
                index.build_from_solution(&solution, parallelism, &self.token)?;
            }
        } else {
            // Whole-graph builds order projects first; a dependency cycle
            // is fatal here.
            dep_graph.compilation_order()?;
            index.build_from_solution(&solution, parallelism, &self.token)?;
        }
        self.check_cancelled()?;

        // Graph scope: changed files plus one layer of files referencing
        // their symbols.
        let builder = CallGraphBuilder::new(parallelism);
        let (graph, stats) = if scoped {
            let files = scope_files(&index, &changes, &changed_files);
            let provider = ScopedCompilation::new(files);
            builder.build(&provider, &self.token)?
        } else {
            let provider = WorkspaceCompilation::new(solution.clone());
            builder.build(&provider, &self.token)?
        };
        self.check_cancelled()?;
        debug!(
            methods = stats.total_methods,
            edges = stats.total_edges,
            scoped,
            "impact graph ready"
        );

        let changed_method_ids = changed_method_ids(&graph, &changes, &solution_dir);
        let result = self.compute_impact(&graph, &changes, changed_method_ids);

        info!(
            impacted_tests = result.total_impacted_tests,
            affected_methods = result.affected_methods.len(),
            "impact analysis complete"
        );
        Ok(result)
    }

    /// Tests exercising one method, via a focused incremental graph.
    pub fn analyze_method_impact(
        &self,
        method_id: &str,
        solution_path: &Path,
    ) -> Result<Vec<TestCoverageResult>, AnalysisError> {
        let loader = SolutionLoader::new(&self.config);
        let solution = loader.load(solution_path)?;

        let parallelism = self.config.index.effective_parallelism();
        let mut index = SymbolIndex::new();
        index.build_from_solution(&solution, parallelism, &self.token)?;
        self.check_cancelled()?;

        let depth = self.config.graph.effective_default_depth();
        let mut incremental = IncrementalGraphBuilder::new(parallelism);
        let graph = incremental.build_focused(method_id, depth, &index, &self.token)?;
        self.check_cancelled()?;

        Ok(graph.get_test_coverage_for_method(method_id, self.ladder()))
    }

    fn compute_impact(
        &self,
        graph: &CallGraph,
        changes: &CodeChangeSet,
        changed_method_ids: Vec<String>,
    ) -> ImpactResult {
        let ladder = self.ladder();
        let distances = graph.reverse_distances(&changed_method_ids);

        let mut affected: FxHashSet<String> = changed_method_ids.iter().cloned().collect();
        affected.extend(distances.keys().cloned());

        let mut impacted_tests = Vec::new();
        for method_id in &affected {
            let Some(info) = graph.get_method_info(method_id) else {
                continue;
            };
            if !info.is_test_method {
                continue;
            }
            let depth = distances.get(method_id).copied().unwrap_or(0);
            let confidence = if depth == 0 { 1.0 } else { ladder.confidence(depth) };
            let (namespace, type_name) = split_containing_type(&info.containing_type);
            impacted_tests.push(ImpactedTest {
                id: info.id.clone(),
                method_name: info.simple_name.clone(),
                type_name,
                namespace,
                file_path: info.file_path.clone(),
                confidence,
                call_depth: depth,
                impact_reasons: impact_reason(depth),
            });
        }

        impacted_tests.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut affected_methods: Vec<String> = affected.into_iter().collect();
        affected_methods.sort();

        ImpactResult {
            analyzed_at: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0),
            total_changes: changes.len(),
            total_files: changes.changed_files().len(),
            total_methods: changes.changed_methods().len(),
            total_impacted_tests: impacted_tests.len(),
            code_changes: changes.changes.clone(),
            affected_methods,
            impacted_tests,
        }
    }

    fn ladder(&self) -> ConfidenceLadder {
        ConfidenceLadder::from_name(self.config.graph.effective_confidence_ladder())
    }

    fn check_cancelled(&self) -> Result<(), AnalysisError> {
        if self.token.is_cancelled() {
            Err(AnalysisError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// True when the diff touches a small enough share of the solution to
/// justify a scoped index and graph.
fn is_scoped_build(solution: &SolutionInfo, changed_files: &[PathBuf]) -> bool {
    if changed_files.is_empty() {
        return false;
    }
    let total = solution.source_files().count();
    if total == 0 {
        return false;
    }
    (changed_files.len() as f64 / total as f64) < SCOPED_BUILD_RATIO
}

/// Diff paths resolved against the solution directory. Deleted files no
/// longer exist on disk but still resolve lexically.
fn resolve_changed_files(changes: &CodeChangeSet, solution_dir: &Path) -> Vec<PathBuf> {
    changes
        .changes
        .iter()
        .filter(|c| c.change_type != ChangeType::Configuration)
        .map(|c| canonical_key(&solution_dir.join(&c.file_path)))
        .collect()
}

/// Names of projects owning changed files, plus their direct dependents.
fn relevant_projects(
    solution: &SolutionInfo,
    dep_graph: &ProjectDependencyGraph,
    changed_files: &[PathBuf],
) -> Vec<String> {
    let mut names: FxHashSet<String> = FxHashSet::default();
    for project in &solution.projects {
        let owns_change = project
            .source_files
            .iter()
            .any(|f| changed_files.iter().any(|c| c == &canonical_key(f)));
        if !owns_change {
            continue;
        }
        names.insert(project.name.clone());
        for dependent in dep_graph.dependents_of(&project.path) {
            if let Some(p) = solution
                .projects
                .iter()
                .find(|p| canonical_key(&p.path) == dependent)
            {
                names.insert(p.name.clone());
            }
        }
    }
    names.into_iter().collect()
}

/// Changed files plus one layer of files referencing their symbols.
///
/// "Their symbols" covers everything the changed files declare, not just
/// the names the diff text happened to contain.
fn scope_files(
    index: &SymbolIndex,
    changes: &CodeChangeSet,
    changed_files: &[PathBuf],
) -> Vec<PathBuf> {
    let mut files: FxHashSet<PathBuf> = changed_files
        .iter()
        .filter(|f| f.exists())
        .cloned()
        .collect();

    let extractor = crate::index::extract::SymbolExtractor::new();
    let mut names: FxHashSet<String> = FxHashSet::default();
    for file in changed_files {
        if !file.exists() {
            continue;
        }
        let symbols = extractor.extract(file);
        names.extend(symbols.types);
        names.extend(symbols.methods.into_iter().map(|(simple, _)| simple));
    }
    names.extend(changes.changed_methods());
    names.extend(changes.changed_types());

    for name in &names {
        files.extend(index.find_files_referencing(name));
        files.extend(index.find_files_containing_method(name));
    }
    for ty in changes.changed_types() {
        files.extend(index.find_files_containing_type(&ty));
    }

    let mut out: Vec<PathBuf> = files.into_iter().collect();
    out.sort();
    out
}

/// Map diff-level names to declared method ids in the graph.
///
/// Per file: explicit names match declarations in that file first, then
/// anywhere in the graph (a changed line may name a callee declared
/// elsewhere). Files with no extracted names fall back to every method
/// declared in the file; deleted files always take the fallback.
fn changed_method_ids(
    graph: &CallGraph,
    changes: &CodeChangeSet,
    solution_dir: &Path,
) -> Vec<String> {
    let mut ids: FxHashSet<String> = FxHashSet::default();

    for change in &changes.changes {
        if change.change_type == ChangeType::Configuration {
            continue;
        }
        let file = canonical_key(&solution_dir.join(&change.file_path));
        let file_method_ids = graph.methods_in_file(&file);

        if change.changed_methods.is_empty() || change.change_type == ChangeType::Deleted {
            ids.extend(file_method_ids);
            continue;
        }

        for name in &change.changed_methods {
            let in_file: Vec<&String> = file_method_ids
                .iter()
                .filter(|id| {
                    graph
                        .get_method_info(id)
                        .is_some_and(|m| &m.simple_name == name)
                })
                .collect();

            if !in_file.is_empty() {
                ids.extend(in_file.into_iter().cloned());
                continue;
            }

            let mut matched_elsewhere = false;
            for info in graph.methods() {
                if &info.simple_name == name {
                    ids.insert(info.id.clone());
                    matched_elsewhere = true;
                }
            }
            if !matched_elsewhere {
                debug!(name, "changed name matched no declared method");
            }
        }

        // A changed type name marks its declared methods as changed even
        // when no method-level name was extracted for them.
        for type_name in &change.changed_types {
            for id in &file_method_ids {
                if graph
                    .get_method_info(id)
                    .is_some_and(|m| m.containing_type.ends_with(type_name))
                {
                    ids.insert(id.clone());
                }
            }
        }
    }

    ids.into_iter().collect()
}

fn split_containing_type(containing_type: &str) -> (String, String) {
    match containing_type.rfind('.') {
        Some(idx) => (
            containing_type[..idx].to_string(),
            containing_type[idx + 1..].to_string(),
        ),
        None => (String::new(), containing_type.to_string()),
    }
}

fn impact_reason(depth: u32) -> String {
    match depth {
        0 => "test method changed directly".to_string(),
        1 => "directly calls a changed method".to_string(),
        d => format!("reaches a changed method through {d} calls"),
    }
}

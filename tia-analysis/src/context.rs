//! Per-request workspace context.
//!
//! One analysis request owns one context. Caches live here, not in
//! process-wide state; when the context drops, so does everything it
//! cached.

use std::path::{Path, PathBuf};

use tia_core::config::TiaConfig;
use tia_core::errors::AnalysisError;
use tia_core::traits::{CancellationToken, ChangeReport, SnapshotStore};

use crate::cache::{detect_changes, fingerprint_solution, MemorySnapshotStore};
use crate::call_graph::{ConfidenceLadder, IncrementalGraphBuilder, TestCoverageResult};
use crate::index::SymbolIndex;
use crate::solution::{SolutionInfo, SolutionLoader};

/// Everything one analysis request carries: config, cancellation, the
/// loaded solution, the symbol index, and the incremental graph cache.
pub struct WorkspaceContext {
    pub config: TiaConfig,
    pub token: CancellationToken,
    solution: SolutionInfo,
    index: SymbolIndex,
    incremental: IncrementalGraphBuilder,
    snapshots: MemorySnapshotStore,
}

impl WorkspaceContext {
    /// Load the solution at `solution_path` and prepare an empty context
    /// around it.
    pub fn open(solution_path: &Path, config: TiaConfig) -> Result<Self, AnalysisError> {
        let loader = SolutionLoader::new(&config);
        let solution = loader.load(solution_path)?;
        let parallelism = config.index.effective_parallelism();

        Ok(Self {
            config,
            token: CancellationToken::new(),
            solution,
            index: SymbolIndex::new(),
            incremental: IncrementalGraphBuilder::new(parallelism),
            snapshots: MemorySnapshotStore::new(),
        })
    }

    pub fn solution(&self) -> &SolutionInfo {
        &self.solution
    }

    /// Build (or rebuild) the symbol index for the whole solution.
    pub fn build_index(&mut self) -> Result<(), AnalysisError> {
        let parallelism = self.config.index.effective_parallelism();
        self.index
            .build_from_solution(&self.solution, parallelism, &self.token)?;
        Ok(())
    }

    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut SymbolIndex {
        &mut self.index
    }

    /// Tests exercising one method, via the cached incremental builder.
    /// Requires a built index.
    pub fn tests_for_method(
        &mut self,
        method_id: &str,
    ) -> Result<Vec<TestCoverageResult>, AnalysisError> {
        let depth = self.config.graph.effective_default_depth();
        let ladder =
            ConfidenceLadder::from_name(self.config.graph.effective_confidence_ladder());
        let graph =
            self.incremental
                .build_focused(method_id, depth, &self.index, &self.token)?;
        Ok(graph.get_test_coverage_for_method(method_id, ladder))
    }

    /// Fingerprint the current tree and report changes against the last
    /// saved snapshot; then save the new snapshot.
    pub fn detect_and_snapshot(&self) -> Result<ChangeReport, AnalysisError> {
        let current = fingerprint_solution(&self.solution);
        let report = match self.snapshots.load().map_err(AnalysisError::Cache)? {
            Some(previous) => detect_changes(&previous, &current),
            None => ChangeReport {
                has_changes: true,
                reason: "no previous snapshot".to_string(),
                added: current.files.keys().cloned().collect::<Vec<PathBuf>>(),
                ..Default::default()
            },
        };
        self.snapshots.save(&current).map_err(AnalysisError::Cache)?;
        Ok(report)
    }

    /// Drop every cache owned by this context.
    pub fn clear_caches(&mut self) -> Result<(), AnalysisError> {
        self.incremental.clear();
        self.snapshots.clear().map_err(AnalysisError::Cache)?;
        Ok(())
    }
}

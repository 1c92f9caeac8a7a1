//! Per-subsystem configuration sections.
//!
//! Every field is optional so that merge layers can distinguish "set" from
//! "default". Callers read through the `effective_*` accessors.

use serde::{Deserialize, Serialize};

/// Symbol index construction settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IndexConfig {
    /// Upper bound on parallel file workers. Defaults to
    /// `min(2 x available_parallelism, 64)`.
    pub parallelism: Option<usize>,
    /// Source file extension to index. Defaults to `cs`.
    pub source_extension: Option<String>,
}

impl IndexConfig {
    pub fn effective_parallelism(&self) -> usize {
        self.parallelism.unwrap_or_else(default_parallelism)
    }

    pub fn effective_source_extension(&self) -> &str {
        self.source_extension.as_deref().unwrap_or("cs")
    }
}

/// Hardware-derived default: 2x available parallelism, capped at 64.
pub fn default_parallelism() -> usize {
    let hw = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    (hw * 2).min(64)
}

/// Call graph settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GraphConfig {
    /// Default depth bound for incremental, method-focused builds.
    pub default_depth: Option<u32>,
    /// Confidence ladder: `stepwise` (default) or `linear`.
    pub confidence_ladder: Option<String>,
}

impl GraphConfig {
    pub fn effective_default_depth(&self) -> u32 {
        self.default_depth.unwrap_or(5)
    }

    pub fn effective_confidence_ladder(&self) -> &str {
        self.confidence_ladder.as_deref().unwrap_or("stepwise")
    }
}

/// Coverage analyzer settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CoverageConfig {
    /// When true, the fuzzy substring matching rule is disabled and only
    /// full-id and simple-name matches count.
    pub strict_matching: Option<bool>,
}

impl CoverageConfig {
    pub fn effective_strict_matching(&self) -> bool {
        self.strict_matching.unwrap_or(false)
    }
}

/// Workspace/project load watchdog settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoadConfig {
    /// Per-project load budget in seconds. Exceeding it degrades to the
    /// manual manifest parser for the remaining projects.
    pub project_timeout_secs: Option<u64>,
    /// Per-solution load budget in seconds.
    pub solution_timeout_secs: Option<u64>,
}

impl LoadConfig {
    pub fn effective_project_timeout_secs(&self) -> u64 {
        self.project_timeout_secs.unwrap_or(15)
    }

    pub fn effective_solution_timeout_secs(&self) -> u64 {
        self.solution_timeout_secs.unwrap_or(30)
    }
}

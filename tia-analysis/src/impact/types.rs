//! Impact analysis result types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::diff::CodeChange;

/// A test that may be affected by the analyzed changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactedTest {
    /// Canonical method id of the test.
    pub id: String,
    pub method_name: String,
    pub type_name: String,
    pub namespace: String,
    /// File declaring the test. The runtime assembly is a loader concern;
    /// the source analogue is the declaring file.
    pub file_path: PathBuf,
    /// Inherited from the call-path length to the nearest changed method.
    pub confidence: f64,
    /// Hops to the nearest changed method; 0 when the test itself changed.
    pub call_depth: u32,
    pub impact_reasons: String,
}

/// Result of a diff impact analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactResult {
    /// Seconds since the Unix epoch at analysis time.
    pub analyzed_at: u64,
    pub code_changes: Vec<CodeChange>,
    pub total_changes: usize,
    pub total_files: usize,
    pub total_methods: usize,
    pub total_impacted_tests: usize,
    /// Transitive reverse closure of the changed methods, including the
    /// changed methods themselves.
    pub affected_methods: Vec<String>,
    pub impacted_tests: Vec<ImpactedTest>,
}

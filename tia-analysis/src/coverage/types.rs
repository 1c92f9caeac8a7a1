//! Coverage types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Broad category of a test, inferred from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestType {
    Unit,
    Integration,
    Database,
    Api,
    Ui,
}

impl TestType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Integration => "integration",
            Self::Database => "database",
            Self::Api => "api",
            Self::Ui => "ui",
        }
    }

    /// Infer the category from a test identifier.
    pub fn infer(identifier: &str) -> Self {
        let lower = identifier.to_lowercase();
        if lower.contains("integration") {
            Self::Integration
        } else if lower.contains("database") || lower.contains("sql") || lower.contains("repository")
        {
            Self::Database
        } else if lower.contains("api") || lower.contains("controller") || lower.contains("endpoint")
        {
            Self::Api
        } else if lower.contains("ui") || lower.contains("e2e") || lower.contains("browser") {
            Self::Ui
        } else {
            Self::Unit
        }
    }
}

/// A candidate test supplied by the caller, typically from prior impact
/// analysis or an explicit list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCoverageInfo {
    pub test_method_id: String,
    pub test_class: String,
    pub test_namespace: String,
    pub assembly_name: String,
    pub confidence: f64,
    /// Edges between the test and the covered method, >= 1.
    pub call_depth: u32,
    pub call_path: Vec<String>,
    pub test_type: TestType,
}

impl From<&crate::impact::ImpactedTest> for TestCoverageInfo {
    /// The usual pipeline: impact analysis names the candidate tests the
    /// coverage analyzer consumes.
    fn from(test: &crate::impact::ImpactedTest) -> Self {
        Self {
            test_method_id: test.id.clone(),
            test_class: test.type_name.clone(),
            test_namespace: test.namespace.clone(),
            assembly_name: String::new(),
            confidence: test.confidence,
            call_depth: test.call_depth.max(1),
            call_path: Vec::new(),
            test_type: TestType::infer(&test.id),
        }
    }
}

impl From<&crate::call_graph::TestCoverageResult> for TestCoverageInfo {
    /// A graph coverage query carries the call path; keep it so the
    /// matcher can see which methods the test actually reaches.
    fn from(result: &crate::call_graph::TestCoverageResult) -> Self {
        let mut info = Self::from_identifier(&result.test_method_id);
        info.confidence = result.confidence;
        info.call_depth = result.call_depth.max(1);
        info.call_path = result.call_path.clone();
        info
    }
}

impl TestCoverageInfo {
    /// Build from a free-form `Namespace.Type.Method` identifier
    /// (parameters optional). Unknown structure degrades gracefully.
    pub fn from_identifier(identifier: &str) -> Self {
        let head = identifier.split('(').next().unwrap_or(identifier);
        let mut parts: Vec<&str> = head.rsplitn(3, '.').collect();
        parts.reverse();

        let (namespace, class) = match parts.len() {
            3 => (parts[0].to_string(), parts[1].to_string()),
            2 => (String::new(), parts[0].to_string()),
            _ => (String::new(), String::new()),
        };

        Self {
            test_method_id: identifier.to_string(),
            test_class: class,
            test_namespace: namespace,
            assembly_name: String::new(),
            confidence: 1.0,
            call_depth: 1,
            call_path: Vec::new(),
            test_type: TestType::infer(identifier),
        }
    }
}

/// Counts by confidence band, plus the mean.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceBreakdown {
    /// Confidence >= 0.8.
    pub high: usize,
    /// 0.5 <= confidence < 0.8.
    pub medium: usize,
    /// Confidence < 0.5.
    pub low: usize,
    pub mean_confidence: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendationType {
    MissingTests,
    LowConfidence,
    IndirectCoverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub recommendation_type: RecommendationType,
    pub description: String,
    pub priority: Priority,
    pub affected_items: Vec<String>,
}

/// Coverage of a change set by the supplied tests.
///
/// Invariants: `covered + uncovered = total_changed_methods`, and the
/// percentage is 100 exactly when nothing changed or everything is
/// covered.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageResult {
    pub coverage_percentage: f64,
    pub total_changed_methods: usize,
    pub covered_changed_methods: usize,
    pub uncovered_changed_methods: usize,
    pub uncovered_methods: Vec<String>,
    pub uncovered_files: Vec<PathBuf>,
    /// Changed method name to the tests covering it.
    pub method_coverage: BTreeMap<String, Vec<TestCoverageInfo>>,
    pub confidence_breakdown: ConfidenceBreakdown,
    /// Test-type name to count over the supplied tests.
    pub coverage_by_test_type: BTreeMap<String, usize>,
    pub recommendations: Vec<Recommendation>,
}

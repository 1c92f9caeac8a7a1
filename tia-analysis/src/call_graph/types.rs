//! Call graph types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How a call site reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallKind {
    Direct,
    PropertyGet,
    PropertySet,
    Constructor,
    Extension,
    Interface,
    Virtual,
    Static,
    Delegate,
    Operator,
}

impl CallKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::PropertyGet => "property-get",
            Self::PropertySet => "property-set",
            Self::Constructor => "constructor",
            Self::Extension => "extension",
            Self::Interface => "interface",
            Self::Virtual => "virtual",
            Self::Static => "static",
            Self::Delegate => "delegate",
            Self::Operator => "operator",
        }
    }
}

/// A method declaration known to the graph. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodInfo {
    /// Canonical id: `Namespace.Type.Method(ParamType1,ParamType2)`.
    pub id: String,
    pub simple_name: String,
    pub containing_type: String,
    pub file_path: PathBuf,
    pub line_number: u32,
    pub is_test_method: bool,
}

/// One directed call discovered during construction. Kind and line are
/// carried here and collapsed into plain edge membership in the graph.
#[derive(Debug, Clone)]
pub struct MethodCallEdge {
    pub caller: String,
    pub callee: String,
    pub kind: CallKind,
    pub line_number: u32,
}

/// Statistics from a graph build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_methods: usize,
    pub total_edges: usize,
    pub total_files: usize,
    pub test_methods: usize,
    /// Call sites that resolved to a target, over all call sites seen.
    pub resolved_call_sites: usize,
    pub total_call_sites: usize,
}

impl GraphStats {
    pub fn resolution_rate(&self) -> f64 {
        if self.total_call_sites == 0 {
            0.0
        } else {
            self.resolved_call_sites as f64 / self.total_call_sites as f64
        }
    }
}

/// A test reaching a method, with the path that proves it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCoverageResult {
    pub test_method_id: String,
    /// Path from the test to the target, test first.
    pub call_path: Vec<String>,
    /// Edges between test and target; 1 for a direct call.
    pub call_depth: u32,
    pub confidence: f64,
}

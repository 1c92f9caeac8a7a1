//! Summary report over a built call graph.

use serde::{Deserialize, Serialize};

use crate::call_graph::CallGraph;

const TOP_METHOD_COUNT: usize = 10;

/// A method with a call count attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodCallCount {
    pub method_id: String,
    pub count: usize,
}

/// Per-method detail row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDetail {
    pub method_id: String,
    pub file_path: String,
    pub line_number: u32,
    pub is_test_method: bool,
    pub outgoing_calls: usize,
    pub incoming_calls: usize,
}

/// Whole-graph summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallGraphReport {
    pub total_methods: usize,
    pub total_source_files: usize,
    pub methods_with_most_calls: Vec<MethodCallCount>,
    pub most_called_methods: Vec<MethodCallCount>,
    pub method_details: Vec<MethodDetail>,
}

/// Build the report from a graph.
pub fn build_call_graph_report(graph: &CallGraph) -> CallGraphReport {
    let mut details: Vec<MethodDetail> = graph
        .methods()
        .map(|info| MethodDetail {
            method_id: info.id.clone(),
            file_path: info.file_path.display().to_string(),
            line_number: info.line_number,
            is_test_method: info.is_test_method,
            outgoing_calls: graph.get_method_calls(&info.id).len(),
            incoming_calls: graph.get_method_dependents(&info.id).len(),
        })
        .collect();
    details.sort_by(|a, b| a.method_id.cmp(&b.method_id));

    let mut by_outgoing: Vec<MethodCallCount> = details
        .iter()
        .filter(|d| d.outgoing_calls > 0)
        .map(|d| MethodCallCount {
            method_id: d.method_id.clone(),
            count: d.outgoing_calls,
        })
        .collect();
    by_outgoing.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.method_id.cmp(&b.method_id)));
    by_outgoing.truncate(TOP_METHOD_COUNT);

    let mut by_incoming: Vec<MethodCallCount> = details
        .iter()
        .filter(|d| d.incoming_calls > 0)
        .map(|d| MethodCallCount {
            method_id: d.method_id.clone(),
            count: d.incoming_calls,
        })
        .collect();
    by_incoming.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.method_id.cmp(&b.method_id)));
    by_incoming.truncate(TOP_METHOD_COUNT);

    CallGraphReport {
        total_methods: graph.method_count(),
        total_source_files: graph.files().count(),
        methods_with_most_calls: by_outgoing,
        most_called_methods: by_incoming,
        method_details: details,
    }
}

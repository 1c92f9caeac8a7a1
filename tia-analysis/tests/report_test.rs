//! Report serialization tests: camelCase JSON and text sections.

use std::path::PathBuf;

use tia_analysis::call_graph::{CallGraph, MethodInfo};
use tia_analysis::coverage::{CoverageAnalyzer, TestCoverageInfo};
use tia_analysis::diff::parse_diff;
use tia_analysis::report::{build_call_graph_report, json, text};

fn small_graph() -> CallGraph {
    let mut graph = CallGraph::new();
    let mk = |id: &str, test: bool| MethodInfo {
        id: id.to_string(),
        simple_name: id.rsplit('.').next().unwrap().trim_end_matches("()").to_string(),
        containing_type: "N.C".to_string(),
        file_path: PathBuf::from("src/C.cs"),
        line_number: 3,
        is_test_method: test,
    };
    graph.add_method(mk("N.C.Hub()", false));
    graph.add_method(mk("N.C.A()", false));
    graph.add_method(mk("N.C.B()", false));
    graph.add_edge("N.C.A()", "N.C.Hub()");
    graph.add_edge("N.C.B()", "N.C.Hub()");
    graph.add_edge("N.C.Hub()", "N.C.A()");
    graph
}

#[test]
fn call_graph_report_ranks_by_degree() {
    let graph = small_graph();
    let report = build_call_graph_report(&graph);

    assert_eq!(report.total_methods, 3);
    assert_eq!(report.total_source_files, 1);
    assert_eq!(report.most_called_methods[0].method_id, "N.C.Hub()");
    assert_eq!(report.most_called_methods[0].count, 2);
    assert_eq!(report.method_details.len(), 3);
}

#[test]
fn json_fields_are_camel_case() {
    let graph = small_graph();
    let report = build_call_graph_report(&graph);
    let json_text = json::call_graph_to_json(&report);

    assert!(json_text.contains("\"totalMethods\""));
    assert!(json_text.contains("\"mostCalledMethods\""));
    assert!(json_text.contains("\"methodDetails\""));
    assert!(!json_text.contains("\"total_methods\""));
}

#[test]
fn coverage_json_and_text_agree_on_percentage() {
    let analyzer = CoverageAnalyzer::with_strict_matching(false);
    let diff = "diff --git a/a.cs b/a.cs\n+++ b/a.cs\n@@\n+public void Changed()\n";
    let changes = parse_diff(diff);
    let tests = vec![TestCoverageInfo::from_identifier("N.T.ChangedTest")];

    let result = analyzer.analyze(&changes, &tests);
    assert_eq!(result.coverage_percentage, 100.0);

    let json_text = json::coverage_to_json(&result);
    assert!(json_text.contains("\"coveragePercentage\": 100.0"));

    let rendered = text::render_coverage(&result);
    assert!(rendered.contains("Coverage Report"));
    assert!(rendered.contains("- coverage: 100.0%"));
}

#[test]
fn call_graph_text_has_sections() {
    let graph = small_graph();
    let report = build_call_graph_report(&graph);
    let rendered = text::render_call_graph(&report);

    assert!(rendered.contains("Call Graph"));
    assert!(rendered.contains("Most Called"));
    assert!(rendered.contains("N.C.Hub() (2)"));
}

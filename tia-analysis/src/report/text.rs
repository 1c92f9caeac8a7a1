//! Human-readable text rendering: section headers and bullet lines.

use std::fmt::Write;

use crate::coverage::CoverageResult;
use crate::impact::ImpactResult;

use super::call_graph_report::CallGraphReport;

pub fn render_impact(result: &ImpactResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Impact Analysis");
    let _ = writeln!(out, "===============");
    let _ = writeln!(out, "- changes: {}", result.total_changes);
    let _ = writeln!(out, "- files: {}", result.total_files);
    let _ = writeln!(out, "- changed methods: {}", result.total_methods);
    let _ = writeln!(out, "- affected methods: {}", result.affected_methods.len());
    let _ = writeln!(out, "- impacted tests: {}", result.total_impacted_tests);
    let _ = writeln!(out);

    let _ = writeln!(out, "Impacted Tests");
    let _ = writeln!(out, "--------------");
    if result.impacted_tests.is_empty() {
        let _ = writeln!(out, "- none");
    }
    for test in &result.impacted_tests {
        let _ = writeln!(
            out,
            "- {} (confidence {:.2}): {}",
            test.id, test.confidence, test.impact_reasons
        );
    }
    out
}

pub fn render_coverage(result: &CoverageResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Coverage Report");
    let _ = writeln!(out, "===============");
    let _ = writeln!(out, "- coverage: {:.1}%", result.coverage_percentage);
    let _ = writeln!(
        out,
        "- changed methods: {} ({} covered, {} uncovered)",
        result.total_changed_methods,
        result.covered_changed_methods,
        result.uncovered_changed_methods
    );
    let _ = writeln!(
        out,
        "- confidence: {} high / {} medium / {} low, mean {:.2}",
        result.confidence_breakdown.high,
        result.confidence_breakdown.medium,
        result.confidence_breakdown.low,
        result.confidence_breakdown.mean_confidence
    );

    if !result.coverage_by_test_type.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Tests By Type");
        let _ = writeln!(out, "-------------");
        for (test_type, count) in &result.coverage_by_test_type {
            let _ = writeln!(out, "- {test_type}: {count}");
        }
    }

    if !result.uncovered_methods.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Uncovered Methods");
        let _ = writeln!(out, "-----------------");
        for method in &result.uncovered_methods {
            let _ = writeln!(out, "- {method}");
        }
    }

    if !result.uncovered_files.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Uncovered Files");
        let _ = writeln!(out, "---------------");
        for file in &result.uncovered_files {
            let _ = writeln!(out, "- {}", file.display());
        }
    }

    if !result.recommendations.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Recommendations");
        let _ = writeln!(out, "---------------");
        for rec in &result.recommendations {
            let _ = writeln!(
                out,
                "- [{:?}] {:?}: {}",
                rec.priority, rec.recommendation_type, rec.description
            );
        }
    }
    out
}

pub fn render_call_graph(report: &CallGraphReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Call Graph");
    let _ = writeln!(out, "==========");
    let _ = writeln!(out, "- methods: {}", report.total_methods);
    let _ = writeln!(out, "- source files: {}", report.total_source_files);

    if !report.methods_with_most_calls.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Most Outgoing Calls");
        let _ = writeln!(out, "-------------------");
        for entry in &report.methods_with_most_calls {
            let _ = writeln!(out, "- {} ({})", entry.method_id, entry.count);
        }
    }

    if !report.most_called_methods.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Most Called");
        let _ = writeln!(out, "-----------");
        for entry in &report.most_called_methods {
            let _ = writeln!(out, "- {} ({})", entry.method_id, entry.count);
        }
    }
    out
}

//! Canonical JSON serialization. Field names are lower-camel via the
//! serde attributes on each result type.

use serde::Serialize;

use crate::coverage::CoverageResult;
use crate::impact::ImpactResult;

use super::call_graph_report::CallGraphReport;

pub fn impact_to_json(result: &ImpactResult) -> String {
    to_json(result)
}

pub fn coverage_to_json(result: &CoverageResult) -> String {
    to_json(result)
}

pub fn call_graph_to_json(report: &CallGraphReport) -> String {
    to_json(report)
}

fn to_json<T: Serialize>(value: &T) -> String {
    // Plain data types; serialization cannot fail.
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

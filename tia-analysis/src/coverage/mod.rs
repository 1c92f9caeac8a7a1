//! Coverage analysis: changed methods against a caller-supplied test set.

pub mod analyzer;
pub mod types;

pub use analyzer::CoverageAnalyzer;
pub use types::{
    ConfidenceBreakdown, CoverageResult, Priority, Recommendation, RecommendationType,
    TestCoverageInfo, TestType,
};

//! The coverage analyzer.
//!
//! Pure computation over a change set and a caller-supplied test list; no
//! graph access. Matching is deliberately fuzzy at the last tier (`Save`
//! matches `SaveChanges`); `strict_matching` disables that tier.

use std::collections::BTreeMap;

use tia_core::config::TiaConfig;

use crate::diff::{ChangeType, CodeChangeSet};

use super::types::{
    ConfidenceBreakdown, CoverageResult, Priority, Recommendation, RecommendationType,
    TestCoverageInfo,
};

pub struct CoverageAnalyzer {
    strict_matching: bool,
}

impl CoverageAnalyzer {
    pub fn new(config: &TiaConfig) -> Self {
        Self {
            strict_matching: config.coverage.effective_strict_matching(),
        }
    }

    pub fn with_strict_matching(strict_matching: bool) -> Self {
        Self { strict_matching }
    }

    /// Compute coverage of `changes` by `tests`.
    pub fn analyze(&self, changes: &CodeChangeSet, tests: &[TestCoverageInfo]) -> CoverageResult {
        let changed_methods = changes.changed_methods();
        let total = changed_methods.len();

        let mut method_coverage: BTreeMap<String, Vec<TestCoverageInfo>> = BTreeMap::new();
        for method in &changed_methods {
            let covering: Vec<TestCoverageInfo> = tests
                .iter()
                .filter(|t| self.matches(method, t))
                .cloned()
                .collect();
            method_coverage.insert(method.clone(), covering);
        }

        let covered = method_coverage.values().filter(|v| !v.is_empty()).count();
        let uncovered = total - covered;

        let uncovered_methods: Vec<String> = method_coverage
            .iter()
            .filter(|(_, tests)| tests.is_empty())
            .map(|(method, _)| method.clone())
            .collect();

        // Files whose every changed method has an empty covering set.
        let uncovered_files = changes
            .changes
            .iter()
            .filter(|c| {
                c.change_type != ChangeType::Configuration
                    && !c.changed_methods.is_empty()
                    && c.changed_methods.iter().all(|m| {
                        method_coverage.get(m).map_or(true, |tests| tests.is_empty())
                    })
            })
            .map(|c| c.file_path.clone())
            .collect();

        let coverage_percentage = if total == 0 {
            100.0
        } else {
            covered as f64 / total as f64 * 100.0
        };

        let mut coverage_by_test_type: BTreeMap<String, usize> = BTreeMap::new();
        for test in tests {
            *coverage_by_test_type
                .entry(test.test_type.name().to_string())
                .or_insert(0) += 1;
        }

        let recommendations = build_recommendations(&uncovered_methods, tests);

        CoverageResult {
            coverage_percentage,
            total_changed_methods: total,
            covered_changed_methods: covered,
            uncovered_changed_methods: uncovered,
            uncovered_methods,
            uncovered_files,
            method_coverage,
            confidence_breakdown: confidence_breakdown(tests),
            coverage_by_test_type,
            recommendations,
        }
    }

    /// Match rules in priority order:
    /// 1. Full id equality, case-insensitive.
    /// 2. The tail after the last `.` equals the changed method's simple
    ///    name, parameters stripped.
    /// 3. Substring containment of the simple name in the full id or in
    ///    the recorded call path (skipped under strict matching).
    fn matches(&self, changed_method: &str, test: &TestCoverageInfo) -> bool {
        let test_id = &test.test_method_id;
        if test_id.eq_ignore_ascii_case(changed_method) {
            return true;
        }

        let simple = simple_name(changed_method);
        let test_tail = simple_name(test_id);
        if test_tail.eq_ignore_ascii_case(simple) {
            return true;
        }

        if self.strict_matching {
            return false;
        }
        test_id.to_lowercase().contains(&simple.to_lowercase())
            || test
                .call_path
                .iter()
                .any(|step| step.to_lowercase().contains(&simple.to_lowercase()))
    }
}

/// Tail after the last `.`, with any parameter list stripped.
fn simple_name(method_id: &str) -> &str {
    let head = method_id.split('(').next().unwrap_or(method_id);
    head.rsplit('.').next().unwrap_or(head)
}

fn confidence_breakdown(tests: &[TestCoverageInfo]) -> ConfidenceBreakdown {
    let mut breakdown = ConfidenceBreakdown::default();
    if tests.is_empty() {
        return breakdown;
    }

    let mut sum = 0.0;
    for test in tests {
        sum += test.confidence;
        if test.confidence >= 0.8 {
            breakdown.high += 1;
        } else if test.confidence >= 0.5 {
            breakdown.medium += 1;
        } else {
            breakdown.low += 1;
        }
    }
    breakdown.mean_confidence = sum / tests.len() as f64;
    breakdown
}

fn build_recommendations(
    uncovered_methods: &[String],
    tests: &[TestCoverageInfo],
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if !uncovered_methods.is_empty() {
        recommendations.push(Recommendation {
            recommendation_type: RecommendationType::MissingTests,
            description: format!(
                "{} changed method(s) have no covering tests; add tests before merging",
                uncovered_methods.len()
            ),
            priority: Priority::High,
            affected_items: uncovered_methods.to_vec(),
        });
    }

    let low_confidence: Vec<String> = tests
        .iter()
        .filter(|t| t.confidence < 0.6)
        .map(|t| t.test_method_id.clone())
        .collect();
    if !low_confidence.is_empty() {
        recommendations.push(Recommendation {
            recommendation_type: RecommendationType::LowConfidence,
            description: format!(
                "{} test(s) cover changes with low confidence; verify they assert the changed behavior",
                low_confidence.len()
            ),
            priority: Priority::Medium,
            affected_items: low_confidence,
        });
    }

    let indirect: Vec<String> = tests
        .iter()
        .filter(|t| t.call_depth > 3)
        .map(|t| t.test_method_id.clone())
        .collect();
    if !indirect.is_empty() {
        recommendations.push(Recommendation {
            recommendation_type: RecommendationType::IndirectCoverage,
            description: format!(
                "{} test(s) reach changes only through deep call chains; consider closer tests",
                indirect.len()
            ),
            priority: Priority::Low,
            affected_items: indirect,
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::CodeChange;
    use std::path::PathBuf;

    fn change(file: &str, methods: &[&str]) -> CodeChange {
        CodeChange {
            file_path: PathBuf::from(file),
            change_type: ChangeType::Modified,
            changed_methods: methods.iter().map(|s| s.to_string()).collect(),
            changed_types: Vec::new(),
        }
    }

    fn test_info(id: &str, confidence: f64, depth: u32) -> TestCoverageInfo {
        TestCoverageInfo {
            confidence,
            call_depth: depth,
            ..TestCoverageInfo::from_identifier(id)
        }
    }

    #[test]
    fn empty_change_set_is_fully_covered() {
        let analyzer = CoverageAnalyzer::with_strict_matching(false);
        let result = analyzer.analyze(&CodeChangeSet::default(), &[]);
        assert_eq!(result.coverage_percentage, 100.0);
        assert_eq!(result.total_changed_methods, 0);
    }

    #[test]
    fn conservation_invariant_holds() {
        let analyzer = CoverageAnalyzer::with_strict_matching(false);
        let changes = CodeChangeSet {
            changes: vec![change("a.cs", &["Covered", "Uncovered"])],
        };
        let tests = vec![test_info("Ns.Tests.CoveredTest", 0.9, 1)];
        let result = analyzer.analyze(&changes, &tests);

        assert_eq!(
            result.covered_changed_methods + result.uncovered_changed_methods,
            result.total_changed_methods
        );
        assert_eq!(result.covered_changed_methods, 1);
        assert_eq!(result.uncovered_methods, vec!["Uncovered"]);
    }

    #[test]
    fn fuzzy_substring_rule_can_be_disabled() {
        let changes = CodeChangeSet {
            changes: vec![change("a.cs", &["Save"])],
        };
        let tests = vec![test_info("Ns.Tests.SaveChangesTest", 0.9, 1)];

        let fuzzy = CoverageAnalyzer::with_strict_matching(false);
        assert_eq!(fuzzy.analyze(&changes, &tests).covered_changed_methods, 1);

        let strict = CoverageAnalyzer::with_strict_matching(true);
        assert_eq!(strict.analyze(&changes, &tests).covered_changed_methods, 0);
    }

    #[test]
    fn call_path_matches_only_in_fuzzy_mode() {
        let changes = CodeChangeSet {
            changes: vec![change("a.cs", &["DoWork"])],
        };
        let mut test = test_info("Ns.Tests.PipelineTest", 0.8, 2);
        test.call_path = vec![
            "Ns.Tests.PipelineTest()".to_string(),
            "Ns.Svc.DoWork()".to_string(),
        ];

        let fuzzy = CoverageAnalyzer::with_strict_matching(false);
        let result = fuzzy.analyze(&changes, std::slice::from_ref(&test));
        assert_eq!(result.covered_changed_methods, 1);

        // Strict matching honors only the full-id and simple-name rules;
        // the call path is part of the fuzzy tier.
        let strict = CoverageAnalyzer::with_strict_matching(true);
        let result = strict.analyze(&changes, &[test]);
        assert_eq!(result.covered_changed_methods, 0);
    }

    #[test]
    fn zero_tests_yields_missing_tests_recommendation() {
        let analyzer = CoverageAnalyzer::with_strict_matching(false);
        let changes = CodeChangeSet {
            changes: vec![change("a.cs", &["Orphan"])],
        };
        let result = analyzer.analyze(&changes, &[]);

        assert_eq!(result.coverage_percentage, 0.0);
        assert_eq!(result.uncovered_methods, vec!["Orphan"]);
        assert_eq!(result.uncovered_files, vec![PathBuf::from("a.cs")]);
        let rec = &result.recommendations[0];
        assert_eq!(rec.recommendation_type, RecommendationType::MissingTests);
        assert_eq!(rec.priority, Priority::High);
    }

    #[test]
    fn low_confidence_and_indirect_recommendations() {
        let analyzer = CoverageAnalyzer::with_strict_matching(false);
        let changes = CodeChangeSet {
            changes: vec![change("a.cs", &["Thing"])],
        };
        let tests = vec![
            test_info("Ns.Tests.ThingTest", 0.4, 5),
        ];
        let result = analyzer.analyze(&changes, &tests);

        let kinds: Vec<RecommendationType> = result
            .recommendations
            .iter()
            .map(|r| r.recommendation_type)
            .collect();
        assert!(kinds.contains(&RecommendationType::LowConfidence));
        assert!(kinds.contains(&RecommendationType::IndirectCoverage));
    }

    #[test]
    fn confidence_breakdown_bands() {
        let tests = vec![
            test_info("A.T.High", 0.9, 1),
            test_info("A.T.Mid", 0.6, 2),
            test_info("A.T.Low", 0.3, 4),
        ];
        let breakdown = confidence_breakdown(&tests);
        assert_eq!(breakdown.high, 1);
        assert_eq!(breakdown.medium, 1);
        assert_eq!(breakdown.low, 1);
        assert!((breakdown.mean_confidence - 0.6).abs() < 1e-9);
    }
}

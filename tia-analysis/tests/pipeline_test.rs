//! End-to-end pipeline: diff -> impact -> coverage report.

use std::path::Path;

use tia_analysis::coverage::{CoverageAnalyzer, RecommendationType, TestCoverageInfo};
use tia_analysis::diff::{parse_diff, DiffSource};
use tia_analysis::impact::ImpactAnalyzer;
use tia_analysis::report::{json, text};
use tia_core::config::TiaConfig;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn sln_line(name: &str, rel_path: &str) -> String {
    format!(
        "Project(\"{{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}}\") = \"{name}\", \"{rel_path}\", \"{{11111111-2222-3333-4444-555555555555}}\"\nEndProject\n"
    )
}

fn solution(dir: &Path) {
    write(
        dir,
        "Core/Core.csproj",
        "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <TargetFramework>net8.0</TargetFramework>\n  </PropertyGroup>\n</Project>\n",
    );
    write(
        dir,
        "Core/Ledger.cs",
        r#"
namespace Bank
{
    public class Ledger
    {
        public void Post(int amount)
        {
            Validate(amount);
        }

        public void Validate(int amount) {}

        public void Unreached() {}
    }
}
"#,
    );
    write(
        dir,
        "Tests/Tests.csproj",
        "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <TargetFramework>net8.0</TargetFramework>\n  </PropertyGroup>\n  <ItemGroup>\n    <ProjectReference Include=\"..\\Core\\Core.csproj\" />\n    <PackageReference Include=\"xunit\" Version=\"2.9.0\" />\n  </ItemGroup>\n</Project>\n",
    );
    write(
        dir,
        "Tests/LedgerTests.cs",
        r#"
using Bank;

namespace Bank.Tests
{
    public class LedgerTests
    {
        [Fact]
        public void TestPost()
        {
            var ledger = new Ledger();
            ledger.Post(10);
        }
    }
}
"#,
    );
    write(
        dir,
        "App.sln",
        &format!(
            "{}{}",
            sln_line("Core", "Core\\Core.csproj"),
            sln_line("Tests", "Tests\\Tests.csproj")
        ),
    );
}

const DIFF: &str = "diff --git a/Core/Ledger.cs b/Core/Ledger.cs\n\
    +++ b/Core/Ledger.cs\n\
    @@\n\
    +        public void Validate(int amount)\n\
    +        public void Unreached()\n";

#[test]
fn impact_feeds_coverage() {
    let dir = tempfile::TempDir::new().unwrap();
    solution(dir.path());

    let analyzer = ImpactAnalyzer::new(TiaConfig::default());
    let impact = analyzer
        .analyze_diff_impact(&DiffSource::Text(DIFF.to_string()), &dir.path().join("App.sln"))
        .unwrap();

    assert!(impact
        .impacted_tests
        .iter()
        .any(|t| t.id == "Bank.Tests.LedgerTests.TestPost()"));

    // Per-method coverage queries carry call paths; those become the
    // candidate tests for the coverage analyzer.
    let mut candidates: Vec<TestCoverageInfo> = Vec::new();
    for method_id in ["Bank.Ledger.Validate(int)", "Bank.Ledger.Unreached()"] {
        let results = analyzer
            .analyze_method_impact(method_id, &dir.path().join("App.sln"))
            .unwrap();
        candidates.extend(results.iter().map(TestCoverageInfo::from));
    }

    let changes = parse_diff(DIFF);
    let coverage = CoverageAnalyzer::with_strict_matching(false).analyze(&changes, &candidates);

    assert_eq!(coverage.total_changed_methods, 2);
    assert_eq!(
        coverage.covered_changed_methods + coverage.uncovered_changed_methods,
        coverage.total_changed_methods
    );
    // The fuzzy tier sees Validate in TestPost's recorded call path;
    // Unreached has no test at all.
    assert_eq!(coverage.covered_changed_methods, 1);
    assert!(coverage.uncovered_methods.contains(&"Unreached".to_string()));
    assert!(coverage
        .recommendations
        .iter()
        .any(|r| r.recommendation_type == RecommendationType::MissingTests));
}

#[test]
fn reports_render_both_forms() {
    let dir = tempfile::TempDir::new().unwrap();
    solution(dir.path());

    let analyzer = ImpactAnalyzer::new(TiaConfig::default());
    let impact = analyzer
        .analyze_diff_impact(&DiffSource::Text(DIFF.to_string()), &dir.path().join("App.sln"))
        .unwrap();

    let json_text = json::impact_to_json(&impact);
    assert!(json_text.contains("\"impactedTests\""));
    assert!(json_text.contains("\"affectedMethods\""));

    let rendered = text::render_impact(&impact);
    assert!(rendered.contains("Impact Analysis"));
    assert!(rendered.contains("Impacted Tests"));
    assert!(rendered.contains("Bank.Tests.LedgerTests.TestPost()"));
}

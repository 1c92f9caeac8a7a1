//! Workspace context tests: snapshot change detection and cache clearing.

use std::path::Path;

use tia_analysis::WorkspaceContext;
use tia_core::config::TiaConfig;

fn write(dir: &Path, rel: &str, content: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, content).unwrap();
}

fn solution(dir: &Path) {
    write(
        dir,
        "P/P.csproj",
        "<Project Sdk=\"Microsoft.NET.Sdk\">\n  <PropertyGroup>\n    <TargetFramework>net8.0</TargetFramework>\n  </PropertyGroup>\n</Project>\n",
    );
    write(
        dir,
        "P/Thing.cs",
        "namespace N { public class Thing { public void Go() {} } }",
    );
    write(
        dir,
        "App.sln",
        "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"P\", \"P\\P.csproj\", \"{11111111-2222-3333-4444-555555555555}\"\nEndProject\n",
    );
}

#[test]
fn first_snapshot_reports_everything_added() {
    let dir = tempfile::TempDir::new().unwrap();
    solution(dir.path());

    let ctx = WorkspaceContext::open(&dir.path().join("App.sln"), TiaConfig::default()).unwrap();
    let report = ctx.detect_and_snapshot().unwrap();

    assert!(report.has_changes);
    assert_eq!(report.reason, "no previous snapshot");
    assert_eq!(report.added.len(), 1);
}

#[test]
fn edit_between_snapshots_is_detected() {
    let dir = tempfile::TempDir::new().unwrap();
    solution(dir.path());

    let ctx = WorkspaceContext::open(&dir.path().join("App.sln"), TiaConfig::default()).unwrap();
    ctx.detect_and_snapshot().unwrap();

    // Unchanged tree: no changes.
    let quiet = ctx.detect_and_snapshot().unwrap();
    assert!(!quiet.has_changes);

    write(
        dir.path(),
        "P/Thing.cs",
        "namespace N { public class Thing { public void GoFaster() {} } }",
    );
    let report = ctx.detect_and_snapshot().unwrap();
    assert!(report.has_changes);
    assert_eq!(report.modified.len(), 1);
    assert!(report.modified[0].ends_with("Thing.cs"));
}

#[test]
fn index_builds_through_context() {
    let dir = tempfile::TempDir::new().unwrap();
    solution(dir.path());

    let mut ctx =
        WorkspaceContext::open(&dir.path().join("App.sln"), TiaConfig::default()).unwrap();
    ctx.build_index().unwrap();

    assert!(ctx.index().is_built());
    assert!(!ctx.index().find_files_containing_method("Go").is_empty());

    ctx.clear_caches().unwrap();
    assert!(ctx.index().is_built(), "clearing caches keeps the index");
}

#[test]
fn focused_test_query_through_context() {
    let dir = tempfile::TempDir::new().unwrap();
    solution(dir.path());
    write(
        dir.path(),
        "P/ThingTests.cs",
        r#"
namespace N.Tests
{
    public class ThingTests
    {
        [Fact]
        public void TestGo()
        {
            var thing = new Thing();
            thing.Go();
        }
    }
}
"#,
    );

    let mut ctx =
        WorkspaceContext::open(&dir.path().join("App.sln"), TiaConfig::default()).unwrap();
    ctx.build_index().unwrap();

    let results = ctx.tests_for_method("N.Thing.Go()").unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].test_method_id, "N.Tests.ThingTests.TestGo()");
    assert_eq!(results[0].call_depth, 1);
    assert!((results[0].confidence - 1.0).abs() < 1e-9);
}

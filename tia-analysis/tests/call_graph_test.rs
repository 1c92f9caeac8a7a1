//! Call graph tests: full build, reverse-index invariants, traversal,
//! test detection, coverage paths.

use std::path::{Path, PathBuf};

use tia_analysis::call_graph::{CallGraph, CallGraphBuilder, ConfidenceLadder, MethodInfo};
use tia_analysis::semantic::provider::ScopedCompilation;
use tia_core::traits::CancellationToken;

fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}

fn build(files: Vec<PathBuf>) -> CallGraph {
    let provider = ScopedCompilation::new(files);
    let builder = CallGraphBuilder::new(2);
    let (graph, _stats) = builder.build(&provider, &CancellationToken::new()).unwrap();
    graph
}

/// Two production methods and a test: T calls A, A calls B.
fn s1_fixture(dir: &Path) -> Vec<PathBuf> {
    let core = write(
        dir,
        "Core/Calculator.cs",
        r#"
namespace Foo.Bar
{
    public class Calculator
    {
        public int A(int x)
        {
            return B();
        }

        public int B()
        {
            return 42;
        }
    }
}
"#,
    );
    let tests = write(
        dir,
        "Tests/CalculatorTests.cs",
        r#"
using Foo.Bar;

namespace Foo.Tests
{
    public class T
    {
        [Fact]
        public void TestA()
        {
            var calc = new Calculator();
            calc.A(1);
        }
    }
}
"#,
    );
    vec![core, tests]
}

#[test]
fn s1_forward_and_reverse_edges() {
    let dir = tempfile::TempDir::new().unwrap();
    let graph = build(s1_fixture(dir.path()));

    let a = "Foo.Bar.Calculator.A(int)";
    let b = "Foo.Bar.Calculator.B()";
    let t = "Foo.Tests.T.TestA()";

    assert!(graph.contains_method(a));
    assert!(graph.contains_method(b));
    assert!(graph.contains_method(t));

    assert!(graph.get_method_calls(t).contains(a), "T -> A");
    assert!(graph.get_method_calls(a).contains(b), "A -> B");

    assert!(graph.get_method_dependents(b).contains(a), "reverse B -> A");
    assert!(graph.get_method_dependents(a).contains(t), "reverse A -> T");

    let info = graph.get_method_info(t).unwrap();
    assert!(info.is_test_method, "attribute-marked method is a test");
}

#[test]
fn s1_coverage_path_and_confidence() {
    let dir = tempfile::TempDir::new().unwrap();
    let graph = build(s1_fixture(dir.path()));

    let results =
        graph.get_test_coverage_for_method("Foo.Bar.Calculator.B()", ConfidenceLadder::Stepwise);
    assert_eq!(results.len(), 1);

    let coverage = &results[0];
    assert_eq!(coverage.test_method_id, "Foo.Tests.T.TestA()");
    assert_eq!(coverage.call_path.len(), 3, "path is T -> A -> B");
    assert_eq!(coverage.call_depth, 2);
    assert!((coverage.confidence - 0.8).abs() < 1e-9);
    assert_eq!(coverage.call_path[0], "Foo.Tests.T.TestA()");
    assert_eq!(coverage.call_path[2], "Foo.Bar.Calculator.B()");
}

#[test]
fn reverse_is_exact_transpose_of_forward() {
    let dir = tempfile::TempDir::new().unwrap();
    let graph = build(s1_fixture(dir.path()));
    assert!(graph.reverse_is_transpose());
}

#[test]
fn transitive_dependents_exclude_start() {
    let dir = tempfile::TempDir::new().unwrap();
    let graph = build(s1_fixture(dir.path()));

    let b = "Foo.Bar.Calculator.B()";
    let dependents = graph.get_transitive_dependents(b);
    assert!(!dependents.contains(b), "start excluded from its own closure");
    assert!(dependents.contains("Foo.Bar.Calculator.A(int)"));
    assert!(dependents.contains("Foo.Tests.T.TestA()"));
}

#[test]
fn cycles_terminate() {
    let mut graph = CallGraph::new();
    for id in ["N.C.A()", "N.C.B()", "N.C.C()"] {
        graph.add_method(MethodInfo {
            id: id.to_string(),
            simple_name: id.chars().nth(4).unwrap().to_string(),
            containing_type: "N.C".to_string(),
            file_path: PathBuf::from("cycle.cs"),
            line_number: 1,
            is_test_method: false,
        });
    }
    graph.add_edge("N.C.A()", "N.C.B()");
    graph.add_edge("N.C.B()", "N.C.C()");
    graph.add_edge("N.C.C()", "N.C.A()");

    let dependents = graph.get_transitive_dependents("N.C.A()");
    assert_eq!(dependents.len(), 2);
    assert!(graph.reverse_is_transpose());
}

#[test]
fn duplicate_edges_collapse() {
    let mut graph = CallGraph::new();
    graph.add_edge("X.Y.M()", "X.Y.N()");
    graph.add_edge("X.Y.M()", "X.Y.N()");
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_traversal_stops_at_test_nodes() {
    // outer_test -> inner_test -> prod: only inner_test is reported, the
    // traversal does not continue past it.
    let mut graph = CallGraph::new();
    let mk = |id: &str, test: bool| MethodInfo {
        id: id.to_string(),
        simple_name: "m".to_string(),
        containing_type: "T".to_string(),
        file_path: PathBuf::from("f.cs"),
        line_number: 1,
        is_test_method: test,
    };
    graph.add_method(mk("P.Prod()", false));
    graph.add_method(mk("T.Inner()", true));
    graph.add_method(mk("T.Outer()", true));
    graph.add_edge("T.Outer()", "T.Inner()");
    graph.add_edge("T.Inner()", "P.Prod()");

    let tests = graph.get_test_methods_exercising("P.Prod()");
    assert!(tests.contains("T.Inner()"));
    assert!(!tests.contains("T.Outer()"), "descent stops at a test node");
}

#[test]
fn interface_implementation_reaches_declaration_callers() {
    let dir = tempfile::TempDir::new().unwrap();
    let files = vec![
        write(
            dir.path(),
            "Core/Worker.cs",
            r#"
namespace N
{
    public interface IWorker
    {
        void M();
    }

    public class C : IWorker
    {
        public void M() {}
    }
}
"#,
        ),
        write(
            dir.path(),
            "Tests/WorkerTests.cs",
            r#"
using N;

namespace N.Tests
{
    public class WorkerTests
    {
        [Fact]
        public void TestM()
        {
            IWorker w = new C();
            w.M();
        }
    }
}
"#,
        ),
    ];
    let graph = build(files);

    // The declaration-to-implementation edge makes the test reachable
    // from the implementation in reverse direction.
    let tests = graph.get_test_methods_exercising("N.C.M()");
    assert!(
        tests.contains("N.Tests.WorkerTests.TestM()"),
        "test calling I.M() reaches C.M(), got: {tests:?}"
    );
}

#[test]
fn methods_in_file_lists_declarations() {
    let dir = tempfile::TempDir::new().unwrap();
    let files = s1_fixture(dir.path());
    let core_file = files[0].clone();
    let graph = build(files);

    let ids = graph.methods_in_file(&core_file);
    assert!(ids.contains(&"Foo.Bar.Calculator.A(int)".to_string()));
    assert!(ids.contains(&"Foo.Bar.Calculator.B()".to_string()));
}

#[test]
fn stats_count_tests_and_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let provider = ScopedCompilation::new(s1_fixture(dir.path()));
    let builder = CallGraphBuilder::new(2);
    let (graph, stats) = builder.build(&provider, &CancellationToken::new()).unwrap();

    assert_eq!(stats.total_files, 2);
    assert_eq!(stats.total_methods, graph.method_count());
    assert_eq!(stats.test_methods, 1);
    assert!(stats.resolved_call_sites > 0);
    assert!(stats.total_call_sites >= stats.resolved_call_sites);
}

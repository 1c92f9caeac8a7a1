//! Stress tests: generated sources at scale, traversal bounds, dedup.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tia_analysis::call_graph::{CallGraph, CallGraphBuilder, MethodInfo};
use tia_analysis::semantic::provider::ScopedCompilation;
use tia_core::traits::CancellationToken;

fn write(dir: &Path, rel: &str, content: &str) -> PathBuf {
    let path = dir.join(rel);
    std::fs::write(&path, content).unwrap();
    path
}

/// 100 files x 20 methods, each method calling the previous one in the
/// same class.
#[test]
fn large_generated_solution_builds_and_traverses() {
    let dir = tempfile::TempDir::new().unwrap();
    let mut files = Vec::new();

    for file_idx in 0..100 {
        let mut source = String::new();
        let _ = writeln!(source, "namespace Load");
        let _ = writeln!(source, "{{");
        let _ = writeln!(source, "    public class Worker{file_idx}");
        let _ = writeln!(source, "    {{");
        for method_idx in 0..20 {
            let _ = writeln!(source, "        public int M{method_idx}()");
            let _ = writeln!(source, "        {{");
            if method_idx > 0 {
                let _ = writeln!(source, "            return M{}();", method_idx - 1);
            } else {
                let _ = writeln!(source, "            return 0;");
            }
            let _ = writeln!(source, "        }}");
        }
        let _ = writeln!(source, "    }}");
        let _ = writeln!(source, "}}");
        files.push(write(dir.path(), &format!("Worker{file_idx}.cs"), &source));
    }

    let build_started = Instant::now();
    let provider = ScopedCompilation::new(files);
    let builder = CallGraphBuilder::new(4);
    let (graph, stats) = builder.build(&provider, &CancellationToken::new()).unwrap();
    let build_elapsed = build_started.elapsed();

    assert_eq!(stats.total_methods, 2000, "100 files x 20 methods");
    assert_eq!(stats.total_edges, 1900, "19 intra-class edges per file");
    assert!(
        build_elapsed.as_secs() < 30,
        "build took {build_elapsed:?}, expected well under 30s"
    );

    // Deepest chain: M0 is reached by M1..M19 of its class, nothing else.
    let bfs_started = Instant::now();
    let dependents = graph.get_transitive_dependents("Load.Worker0.M0()");
    let bfs_elapsed = bfs_started.elapsed();

    assert_eq!(dependents.len(), 19);
    assert!(
        bfs_elapsed.as_millis() < 100,
        "reverse BFS took {bfs_elapsed:?}, expected <100ms"
    );
    assert!(graph.reverse_is_transpose());
}

/// Wide fan-in: one callee, many callers; the reverse index must hold
/// every caller and the closure must terminate promptly.
#[test]
fn wide_fan_in_reverse_index() {
    let mut graph = CallGraph::new();
    let callee = "Hub.Core.Handle()";
    graph.add_method(MethodInfo {
        id: callee.to_string(),
        simple_name: "Handle".to_string(),
        containing_type: "Hub.Core".to_string(),
        file_path: PathBuf::from("hub.cs"),
        line_number: 1,
        is_test_method: false,
    });

    for i in 0..10_000 {
        let caller = format!("Hub.Caller{i}.Run()");
        graph.add_method(MethodInfo {
            id: caller.clone(),
            simple_name: "Run".to_string(),
            containing_type: format!("Hub.Caller{i}"),
            file_path: PathBuf::from(format!("caller{i}.cs")),
            line_number: 1,
            is_test_method: i % 100 == 0,
        });
        graph.add_edge(&caller, callee);
    }

    let started = Instant::now();
    let dependents = graph.get_transitive_dependents(callee);
    let tests = graph.get_test_methods_exercising(callee);
    let elapsed = started.elapsed();

    assert_eq!(dependents.len(), 10_000);
    assert_eq!(tests.len(), 100);
    assert!(
        elapsed.as_millis() < 500,
        "fan-in traversal took {elapsed:?}, expected <500ms"
    );
}

/// Duplicate edges across repeated builds of the same accumulation never
/// inflate counts.
#[test]
fn repeated_edge_insertion_is_idempotent() {
    let mut graph = CallGraph::new();
    for _ in 0..1000 {
        graph.add_edge("A.B.C()", "A.B.D()");
    }
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.get_method_dependents("A.B.D()").len(), 1);
}

//! Whole-solution call graph construction.
//!
//! Files are processed in parallel under a bounded pool; each yields its
//! declarations and resolved edges, merged single-threaded into the graph.
//! A file whose model cannot be built contributes nothing; a file whose
//! table cannot be built degrades to declarations with no outgoing edges.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use tia_core::errors::GraphError;
use tia_core::traits::CancellationToken;
use tracing::{debug, info};

use crate::semantic::model::CallSite;
use crate::semantic::provider::CompilationProvider;
use crate::semantic::resolver::{
    accessor_id, method_id, polymorphic_edges, MethodScope, Resolver, TypeTable,
};

use super::graph::CallGraph;
use super::test_detect::is_test_method;
use super::types::{GraphStats, MethodCallEdge, MethodInfo};

/// Per-file build output, merged after the parallel phase.
#[derive(Default)]
struct FileBuild {
    methods: Vec<MethodInfo>,
    edges: Vec<MethodCallEdge>,
    resolved_sites: usize,
    total_sites: usize,
}

/// Builds the full call graph for a compilation.
pub struct CallGraphBuilder {
    parallelism: usize,
}

impl CallGraphBuilder {
    pub fn new(parallelism: usize) -> Self {
        Self {
            parallelism: parallelism.max(1),
        }
    }

    /// Build the graph over every file the provider knows.
    pub fn build(
        &self,
        provider: &dyn CompilationProvider,
        token: &CancellationToken,
    ) -> Result<(CallGraph, GraphStats), GraphError> {
        let started = std::time::Instant::now();
        let files = provider.files();

        let build_all = || {
            files
                .par_iter()
                .map(|file| {
                    if token.is_cancelled() {
                        return FileBuild::default();
                    }
                    build_file(provider, file, token)
                })
                .collect::<Vec<_>>()
        };

        let results = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.parallelism)
            .build()
        {
            Ok(pool) => pool.install(build_all),
            Err(_) => build_all(),
        };

        let mut graph = CallGraph::new();
        let mut stats = GraphStats {
            total_files: files.len(),
            ..Default::default()
        };

        for result in results {
            stats.resolved_call_sites += result.resolved_sites;
            stats.total_call_sites += result.total_sites;
            for method in result.methods {
                graph.add_method(method);
            }
            for edge in result.edges {
                graph.add_edge(&edge.caller, &edge.callee);
            }
        }

        // Declaration-to-implementation edges so reverse traversal from an
        // implementation reaches callers of the interface or base member.
        for table in unique_tables(provider, &files) {
            for (declaring, implementation, _kind) in polymorphic_edges(&table) {
                graph.add_edge(&declaring, &implementation);
            }
        }

        stats.total_methods = graph.method_count();
        stats.total_edges = graph.edge_count();
        stats.test_methods = graph.methods().filter(|m| m.is_test_method).count();

        info!(
            methods = stats.total_methods,
            edges = stats.total_edges,
            tests = stats.test_methods,
            files = stats.total_files,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "call graph built"
        );
        Ok((graph, stats))
    }
}

fn build_file(provider: &dyn CompilationProvider, file: &Path, token: &CancellationToken) -> FileBuild {
    let mut out = FileBuild::default();

    let Some(model) = provider.get_semantic_model(file) else {
        debug!(file = %file.display(), "no semantic model; file contributes nothing");
        return out;
    };
    let table = provider.type_table(file);
    if table.is_none() {
        debug!(file = %file.display(), "no type table; declarations only");
    }
    let resolver = table.as_deref().map(Resolver::new);

    for decl in &model.types {
        for method in &decl.methods {
            if token.is_cancelled() {
                return out;
            }
            let id = method_id(decl, method);
            out.methods.push(MethodInfo {
                id: id.clone(),
                simple_name: method.name.clone(),
                containing_type: decl.qualified_name(),
                file_path: model.file.clone(),
                line_number: method.line,
                is_test_method: is_test_method(&model.file, decl, method),
            });

            if let Some(ref resolver) = resolver {
                let scope = MethodScope {
                    model: &model,
                    type_decl: decl,
                    method: Some(method),
                };
                resolve_sites(&mut out, resolver, &scope, &id, &method.calls);
            }
        }

        for property in &decl.properties {
            if property.has_getter {
                let id = accessor_id(decl, property, false);
                out.methods.push(accessor_info(&id, &format!("get_{}", property.name), decl, &model.file, property.line));
                if let Some(ref resolver) = resolver {
                    let scope = MethodScope {
                        model: &model,
                        type_decl: decl,
                        method: None,
                    };
                    resolve_sites(&mut out, resolver, &scope, &id, &property.getter_calls);
                }
            }
            if property.has_setter {
                let id = accessor_id(decl, property, true);
                out.methods.push(accessor_info(&id, &format!("set_{}", property.name), decl, &model.file, property.line));
                if let Some(ref resolver) = resolver {
                    let scope = MethodScope {
                        model: &model,
                        type_decl: decl,
                        method: None,
                    };
                    resolve_sites(&mut out, resolver, &scope, &id, &property.setter_calls);
                }
            }
        }
    }

    out
}

fn resolve_sites(
    out: &mut FileBuild,
    resolver: &Resolver<'_>,
    scope: &MethodScope<'_>,
    caller_id: &str,
    sites: &[CallSite],
) {
    for site in sites {
        out.total_sites += 1;
        match resolver.resolve_site(site, scope) {
            Some(target) => {
                out.resolved_sites += 1;
                out.edges.push(MethodCallEdge {
                    caller: caller_id.to_string(),
                    callee: target.method_id,
                    kind: target.kind,
                    line_number: site.line(),
                });
            }
            None => {
                debug!(caller = caller_id, line = site.line(), "unresolved call site dropped");
            }
        }
    }
}

fn accessor_info(
    id: &str,
    simple_name: &str,
    decl: &crate::semantic::model::TypeDecl,
    file: &Path,
    line: u32,
) -> MethodInfo {
    MethodInfo {
        id: id.to_string(),
        simple_name: simple_name.to_string(),
        containing_type: decl.qualified_name(),
        file_path: file.to_path_buf(),
        line_number: line,
        is_test_method: false,
    }
}

/// Distinct type tables across the file set (one per project for the
/// workspace provider, one total for scoped builds).
fn unique_tables(
    provider: &dyn CompilationProvider,
    files: &[std::path::PathBuf],
) -> Vec<Arc<TypeTable>> {
    let mut seen: Vec<*const TypeTable> = Vec::new();
    let mut tables = Vec::new();
    for file in files {
        if let Some(table) = provider.type_table(file) {
            let ptr = Arc::as_ptr(&table);
            if !seen.contains(&ptr) {
                seen.push(ptr);
                tables.push(table);
            }
        }
    }
    tables
}

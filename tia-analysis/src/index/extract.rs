//! Lightweight symbol extraction for the index.
//!
//! Namespaces and type names come from regexes; method declarations come
//! from the tree-sitter model, with a regex signature extractor as the
//! fallback when parsing fails.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use crate::semantic::model::build_model;
use crate::semantic::syntax::SyntaxTree;

/// Symbols extracted from one file.
#[derive(Debug, Default, Clone)]
pub struct FileSymbols {
    pub namespaces: Vec<String>,
    pub types: Vec<String>,
    /// `(simple_name, approximate_id)` pairs. Approximate id format:
    /// `ns.type.name(N params)`.
    pub methods: Vec<(String, String)>,
    /// Identifiers this file uses in call position. Over-approximate by
    /// design: used to find files that may reference a symbol.
    pub references: Vec<String>,
}

/// Regex-based extractor, shared across worker threads.
pub struct SymbolExtractor {
    namespace_re: Regex,
    type_re: Regex,
    method_re: Regex,
    reference_re: Regex,
}

impl SymbolExtractor {
    pub fn new() -> Self {
        Self {
            namespace_re: Regex::new(r"(?m)^\s*namespace\s+([A-Za-z_][\w.]*)").unwrap(),
            type_re: Regex::new(
                r"(?m)\b(?:class|interface|struct|enum|record)\s+([A-Za-z_]\w*)",
            )
            .unwrap(),
            // Fallback signature pattern: modifiers, return type, name, paren.
            method_re: Regex::new(
                r"(?m)^\s*(?:(?:public|private|protected|internal|static|virtual|override|sealed|async|partial|new|extern|unsafe)\s+)+[\w<>\[\],\s\.\?]+?\s+([A-Za-z_]\w*)\s*(?:<[^>]*>)?\s*\(",
            )
            .unwrap(),
            reference_re: Regex::new(r"\b([A-Za-z_]\w*)\s*\(").unwrap(),
        }
    }

    /// Extract symbols from a file, preferring the syntactic parser and
    /// degrading to regex extraction when it fails.
    pub fn extract(&self, file: &Path) -> FileSymbols {
        let Ok(source) = std::fs::read_to_string(file) else {
            debug!(file = %file.display(), "unreadable file skipped by index");
            return FileSymbols::default();
        };
        self.extract_from_source(file, &source)
    }

    pub fn extract_from_source(&self, file: &Path, source: &str) -> FileSymbols {
        let mut symbols = FileSymbols {
            namespaces: self.extract_namespaces(source),
            types: self.extract_types(source),
            methods: Vec::new(),
            references: self.extract_references(source),
        };

        match SyntaxTree::parse(file, source.to_string()) {
            Ok(tree) => {
                let model = build_model(&tree);
                for decl in &model.types {
                    for method in &decl.methods {
                        let approx = approximate_id(
                            &decl.namespace,
                            &decl.name,
                            &method.name,
                            method.params.len(),
                        );
                        symbols.methods.push((method.name.clone(), approx));
                    }
                    for prop in &decl.properties {
                        if prop.has_getter {
                            let name = format!("get_{}", prop.name);
                            let approx =
                                approximate_id(&decl.namespace, &decl.name, &name, 0);
                            symbols.methods.push((name, approx));
                        }
                        if prop.has_setter {
                            let name = format!("set_{}", prop.name);
                            let approx =
                                approximate_id(&decl.namespace, &decl.name, &name, 1);
                            symbols.methods.push((name, approx));
                        }
                    }
                }
            }
            Err(e) => {
                debug!(file = %file.display(), "index parse fallback to regex: {e}");
                self.extract_methods_regex(source, &mut symbols);
            }
        }

        symbols
    }

    fn extract_namespaces(&self, source: &str) -> Vec<String> {
        let mut namespaces: Vec<String> = self
            .namespace_re
            .captures_iter(source)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect();
        namespaces.dedup();
        namespaces
    }

    fn extract_types(&self, source: &str) -> Vec<String> {
        let mut types: Vec<String> = self
            .type_re
            .captures_iter(source)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect();
        types.dedup();
        types
    }

    fn extract_references(&self, source: &str) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut references = Vec::new();
        for capture in self.reference_re.captures_iter(source) {
            if let Some(name) = capture.get(1) {
                let name = name.as_str();
                if crate::lang::is_keyword(name) || name.len() < 2 {
                    continue;
                }
                if seen.insert(name.to_string()) {
                    references.push(name.to_string());
                }
            }
        }
        references
    }

    /// Regex fallback: approximate ids use the first namespace and first
    /// type found in the file, with an unknown parameter count of zero.
    fn extract_methods_regex(&self, source: &str, symbols: &mut FileSymbols) {
        let namespace = symbols.namespaces.first().cloned().unwrap_or_default();
        let type_name = symbols.types.first().cloned().unwrap_or_default();

        for capture in self.method_re.captures_iter(source) {
            if let Some(name) = capture.get(1) {
                let name = name.as_str().to_string();
                let approx = approximate_id(&namespace, &type_name, &name, 0);
                symbols.methods.push((name, approx));
            }
        }
    }
}

impl Default for SymbolExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Approximate method id: `ns.type.name(N params)`.
pub fn approximate_id(namespace: &str, type_name: &str, method: &str, params: usize) -> String {
    if namespace.is_empty() {
        format!("{type_name}.{method}({params} params)")
    } else {
        format!("{namespace}.{type_name}.{method}({params} params)")
    }
}

/// Decompose a full or approximate method id into
/// `(prefix, simple_name, param_count)`. The prefix is everything before
/// the simple name; param count is `None` when the id has no list.
pub fn parse_method_id(method_id: &str) -> (String, String, Option<usize>) {
    let (head, params) = match method_id.find('(') {
        Some(idx) => {
            let args = &method_id[idx + 1..method_id.rfind(')').unwrap_or(method_id.len())];
            let count = if args.trim().is_empty() {
                0
            } else if let Some(n) = args.strip_suffix(" params").and_then(|n| n.trim().parse().ok())
            {
                n
            } else {
                split_top_level_commas(args).len()
            };
            (&method_id[..idx], Some(count))
        }
        None => (method_id, None),
    };

    match head.rfind('.') {
        Some(idx) => (head[..idx].to_string(), head[idx + 1..].to_string(), params),
        None => (String::new(), head.to_string(), params),
    }
}

fn split_top_level_commas(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in args.char_indices() {
        match ch {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&args[start..]);
    parts
}

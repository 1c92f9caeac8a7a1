//! Method and type name extraction from changed diff lines.
//!
//! Two layered patterns: a signature pattern anchored on access modifiers
//! and return types, then a simpler `Identifier(...)` pattern that catches
//! call-site edits and declarations with leading whitespace stripped by
//! the diff.

use regex::Regex;

use crate::lang;

pub struct ChangeExtractor {
    signature_re: Regex,
    call_re: Regex,
    type_re: Regex,
}

impl ChangeExtractor {
    pub fn new() -> Self {
        Self {
            signature_re: Regex::new(
                r"(?:public|private|protected|internal|static|virtual|override|sealed|async|partial)\s+[\w<>\[\],\s\.\?]+?\s+([A-Za-z_]\w*)\s*\(",
            )
            .unwrap(),
            call_re: Regex::new(r"\b([A-Za-z_]\w*)\s*\(").unwrap(),
            type_re: Regex::new(
                r"(?:public|private|protected|internal|sealed|abstract|static|partial)\s+(?:class|interface|struct|enum|record)\s+([A-Za-z_]\w*)",
            )
            .unwrap(),
        }
    }

    /// Extract candidate method names from the changed lines of one file.
    pub fn extract_methods(&self, changed_lines: &[String]) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut methods = Vec::new();

        for line in changed_lines {
            for re in [&self.signature_re, &self.call_re] {
                for capture in re.captures_iter(line) {
                    if let Some(name) = capture.get(1) {
                        let name = name.as_str();
                        if is_valid_method_name(name) && seen.insert(name.to_string()) {
                            methods.push(name.to_string());
                        }
                    }
                }
            }
        }
        methods
    }

    /// Extract candidate type names from the changed lines of one file.
    pub fn extract_types(&self, changed_lines: &[String]) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut types = Vec::new();

        for line in changed_lines {
            for capture in self.type_re.captures_iter(line) {
                if let Some(name) = capture.get(1) {
                    let name = name.as_str().to_string();
                    if seen.insert(name.clone()) {
                        types.push(name);
                    }
                }
            }
        }
        types
    }
}

impl Default for ChangeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifier validation for extracted method names.
///
/// The `Variable_` prefix and `Regex` substring exclusions are preserved
/// from the original heuristics; they have no stated rationale and are
/// flagged for review in DESIGN.md.
pub fn is_valid_method_name(name: &str) -> bool {
    if name.len() < 2 {
        return false;
    }
    if lang::is_keyword(name) {
        return false;
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    if name.starts_with("Variable_") || name.contains("Regex") {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_pattern_catches_declarations() {
        let extractor = ChangeExtractor::new();
        let lines = vec!["    public async Task<int> LoadOrders(string region)".to_string()];
        assert_eq!(extractor.extract_methods(&lines), vec!["LoadOrders"]);
    }

    #[test]
    fn call_pattern_catches_edited_call_sites() {
        let extractor = ChangeExtractor::new();
        let lines = vec!["        var y = DoWork();".to_string()];
        assert_eq!(extractor.extract_methods(&lines), vec!["DoWork"]);
    }

    #[test]
    fn type_pattern_catches_declarations() {
        let extractor = ChangeExtractor::new();
        let lines = vec!["public sealed class OrderService : IOrderService".to_string()];
        assert_eq!(extractor.extract_types(&lines), vec!["OrderService"]);
    }

    #[test]
    fn names_are_deduplicated() {
        let extractor = ChangeExtractor::new();
        let lines = vec![
            "DoWork();".to_string(),
            "DoWork(1);".to_string(),
        ];
        assert_eq!(extractor.extract_methods(&lines), vec!["DoWork"]);
    }

    #[test]
    fn invalid_names_rejected() {
        assert!(!is_valid_method_name("if"));
        assert!(!is_valid_method_name("42"));
        assert!(!is_valid_method_name("x"));
        assert!(!is_valid_method_name("9lives"));
        assert!(!is_valid_method_name("Variable_foo"));
        assert!(!is_valid_method_name("MyRegexHelper"));
        assert!(is_valid_method_name("DoWork"));
        assert!(is_valid_method_name("_private"));
    }
}

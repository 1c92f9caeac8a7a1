//! Tree-sitter parsing for C# source.

use std::path::{Path, PathBuf};

use tia_core::errors::SemanticError;

/// A parsed syntax tree paired with its source text.
pub struct SyntaxTree {
    pub file: PathBuf,
    pub source: String,
    pub tree: tree_sitter::Tree,
}

impl SyntaxTree {
    /// Parse `source` as C#.
    pub fn parse(file: &Path, source: String) -> Result<Self, SemanticError> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_c_sharp::LANGUAGE.into())
            .map_err(|e| SemanticError::Parse {
                path: file.display().to_string(),
                message: e.to_string(),
            })?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| SemanticError::Parse {
                path: file.display().to_string(),
                message: "parser returned no tree".to_string(),
            })?;

        Ok(Self {
            file: file.to_path_buf(),
            source,
            tree,
        })
    }

    /// Parse the file at `path` from disk.
    pub fn parse_file(path: &Path) -> Result<Self, SemanticError> {
        let source = std::fs::read_to_string(path).map_err(|source| SemanticError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(path, source)
    }

    pub fn root(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Text of a node, whitespace-normalized to a single-line form.
    pub fn text_of(&self, node: tree_sitter::Node<'_>) -> String {
        let raw = node
            .utf8_text(self.source.as_bytes())
            .unwrap_or_default();
        normalize_ws(raw)
    }

    /// 1-based line of a node's start.
    pub fn line_of(&self, node: tree_sitter::Node<'_>) -> u32 {
        node.start_position().row as u32 + 1
    }
}

/// Strip whitespace so multi-line type spellings compare equal to their
/// single-line form. Whitespace inside a type spelling only ever separates
/// tokens around punctuation, so dropping it keeps `List<int , bool>` and
/// `List<int,bool>` identical.
fn normalize_ws(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_class() {
        let tree = SyntaxTree::parse(
            Path::new("a.cs"),
            "namespace N { class C { void M() {} } }".to_string(),
        )
        .unwrap();
        assert_eq!(tree.root().kind(), "compilation_unit");
    }

    #[test]
    fn normalizes_whitespace() {
        assert_eq!(normalize_ws("List< int ,  bool >"), "List<int,bool>");
    }
}

//! Code change types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How a file changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
    /// Non-source change (project files, configs).
    Configuration,
}

impl Default for ChangeType {
    fn default() -> Self {
        ChangeType::Modified
    }
}

/// One changed file with the symbols the diff text named.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChange {
    pub file_path: PathBuf,
    pub change_type: ChangeType,
    /// Simple method names seen in changed lines. Extraction is lossy by
    /// design; an empty list never means "no methods changed".
    pub changed_methods: Vec<String>,
    /// Simple type names seen in changed lines.
    pub changed_types: Vec<String>,
}

/// Unordered collection of changes from one diff.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodeChangeSet {
    pub changes: Vec<CodeChange>,
}

impl CodeChangeSet {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// All changed method names, deduplicated, insertion order.
    pub fn changed_methods(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for change in &self.changes {
            for method in &change.changed_methods {
                if seen.insert(method.clone()) {
                    out.push(method.clone());
                }
            }
        }
        out
    }

    /// All changed type names, deduplicated, insertion order.
    pub fn changed_types(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut out = Vec::new();
        for change in &self.changes {
            for ty in &change.changed_types {
                if seen.insert(ty.clone()) {
                    out.push(ty.clone());
                }
            }
        }
        out
    }

    /// All changed file paths.
    pub fn changed_files(&self) -> Vec<&Path> {
        self.changes.iter().map(|c| c.file_path.as_path()).collect()
    }
}

//! Unified diff scanner.
//!
//! Line-oriented state machine; no hunk line-number tracking. Binary
//! diffs contribute nothing. A `CodeChange` is emitted for every source
//! file with a non-empty accumulator, even when no symbol matched, so
//! file-level change is never lost.

use std::path::PathBuf;

use tracing::debug;

use super::extract::ChangeExtractor;
use super::types::{ChangeType, CodeChange, CodeChangeSet};

/// File extensions treated as source for symbol extraction.
const SOURCE_EXTENSIONS: &[&str] = &["cs"];
/// File extensions treated as configuration changes.
const CONFIG_EXTENSIONS: &[&str] = &["csproj", "sln", "props", "targets", "json", "config"];

#[derive(Default)]
struct FileAccumulator {
    path: Option<PathBuf>,
    change_type: ChangeType,
    changed_lines: Vec<String>,
}

/// Parse a unified diff into a change set.
pub fn parse_diff(diff: &str) -> CodeChangeSet {
    let extractor = ChangeExtractor::new();
    let mut set = CodeChangeSet::default();
    let mut current = FileAccumulator::default();

    for raw_line in diff.lines() {
        let line = raw_line.trim_end_matches('\r');

        if let Some(rest) = line.strip_prefix("diff --git ") {
            flush(&mut current, &extractor, &mut set);
            current = FileAccumulator {
                path: new_side_path(rest),
                change_type: ChangeType::Modified,
                changed_lines: Vec::new(),
            };
        } else if line.starts_with("new file mode") {
            current.change_type = ChangeType::Added;
        } else if line.starts_with("deleted file mode") {
            current.change_type = ChangeType::Deleted;
        } else if let Some(renamed_to) = line.strip_prefix("rename to ") {
            // Renames track the post-image path; content edits, if any,
            // follow in the hunks.
            current.path = Some(PathBuf::from(renamed_to.trim()));
        } else if line.starts_with("rename from ") || line.starts_with("similarity index") {
            // Pre-image half of a rename header.
        } else if line.starts_with("Binary files") || line.starts_with("GIT binary patch") {
            current.changed_lines.clear();
            current.path = None;
        } else if line == "--- /dev/null" {
            current.change_type = ChangeType::Added;
        } else if line == "+++ /dev/null" {
            current.change_type = ChangeType::Deleted;
        } else if let Some(rest) = line.strip_prefix("+++ b/") {
            // Prefer the post-image path when the header carried one.
            if current.path.is_none() {
                current.path = Some(PathBuf::from(rest));
            }
        } else if line.starts_with("@@") || line.starts_with("index ")
            || line.starts_with("--- ") || line.starts_with("+++ ")
        {
            // Hunk headers and remaining metadata carry no symbols.
        } else if let Some(added) = line.strip_prefix('+') {
            current.changed_lines.push(added.to_string());
        } else if let Some(removed) = line.strip_prefix('-') {
            current.changed_lines.push(removed.to_string());
        }
    }

    flush(&mut current, &extractor, &mut set);
    set
}

/// Extract `b/<new>` from a `diff --git a/<old> b/<new>` remainder.
fn new_side_path(rest: &str) -> Option<PathBuf> {
    let b_side = rest.split(" b/").nth(1)?;
    let path = b_side.trim();
    if path.is_empty() {
        None
    } else {
        Some(PathBuf::from(path))
    }
}

fn flush(current: &mut FileAccumulator, extractor: &ChangeExtractor, set: &mut CodeChangeSet) {
    let Some(path) = current.path.take() else {
        return;
    };

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    let is_source = SOURCE_EXTENSIONS.contains(&extension.as_str());
    let is_config = CONFIG_EXTENSIONS.contains(&extension.as_str());

    if !is_source && !is_config {
        debug!(file = %path.display(), "diff file skipped: not a tracked extension");
        current.changed_lines.clear();
        return;
    }

    // Deleted files legitimately have no `+` lines; keep them.
    if current.changed_lines.is_empty() && current.change_type != ChangeType::Deleted {
        current.changed_lines.clear();
        return;
    }

    let (changed_methods, changed_types) = if is_source {
        (
            extractor.extract_methods(&current.changed_lines),
            extractor.extract_types(&current.changed_lines),
        )
    } else {
        (Vec::new(), Vec::new())
    };

    set.changes.push(CodeChange {
        file_path: path,
        change_type: if is_config && !is_source {
            ChangeType::Configuration
        } else {
            current.change_type
        },
        changed_methods,
        changed_types,
    });
    current.changed_lines.clear();
}

//! Solution manifest parser.
//!
//! `.sln` files are line-oriented; only `Project(...)` entries matter here.
//! Malformed lines are skipped with a warning and never abort the parse.

use std::path::Path;

use tia_core::errors::SolutionError;
use tracing::warn;

use super::project;
use super::types::SolutionInfo;

/// Parse a solution manifest and every project it references.
///
/// Fails with `NotFound` when the solution file does not exist. Projects
/// whose manifest is missing or unreadable are skipped with a warning.
pub fn parse_solution(path: &Path) -> Result<SolutionInfo, SolutionError> {
    let content = read_solution(path)?;
    let sln_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut solution = SolutionInfo {
        path: path.to_path_buf(),
        projects: Vec::new(),
    };

    for project_path in project_entries(&content) {
        let resolved = sln_dir.join(normalize_separators(&project_path));
        match project::parse_project(&resolved) {
            Ok(info) => solution.projects.push(info),
            Err(e) => {
                warn!(project = %resolved.display(), "skipping unreadable project: {e}");
            }
        }
    }

    Ok(solution)
}

/// Read the raw solution text, mapping a missing file to `NotFound`.
pub fn read_solution(path: &Path) -> Result<String, SolutionError> {
    if !path.exists() {
        return Err(SolutionError::NotFound {
            path: path.display().to_string(),
        });
    }
    std::fs::read_to_string(path).map_err(|source| SolutionError::Io {
        path: path.display().to_string(),
        source,
    })
}

/// Extract project file paths from `Project("{guid}") = "Name", "path", "{guid}"` lines.
///
/// Line endings may be `\n` or `\r\n`. Solution folders (entries whose path
/// has no extension) are ignored.
pub fn project_entries(content: &str) -> Vec<String> {
    let mut entries = Vec::new();

    for line in content.lines() {
        let line = line.trim_end_matches('\r').trim();
        if !line.starts_with("Project(") {
            continue;
        }

        match parse_project_line(line) {
            Some(path) if looks_like_project_file(&path) => entries.push(path),
            Some(_) => {} // solution folder entry
            None => warn!("skipping malformed solution line: {line}"),
        }
    }

    entries
}

/// Parse one `Project(...)` line, returning the relative project path.
fn parse_project_line(line: &str) -> Option<String> {
    // Project("{guid}") = "Name", "relative\path.csproj", "{guid}"
    let eq = line.find('=')?;
    let rhs = &line[eq + 1..];
    // Odd split segments are the quoted strings: name, path, project guid.
    let mut quoted = rhs.split('"').skip(1).step_by(2);
    let _name = quoted.next()?;
    let path = quoted.next()?;
    Some(path.to_string())
}

fn looks_like_project_file(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.ends_with("proj"))
}

/// Solution manifests use backslash separators regardless of platform.
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

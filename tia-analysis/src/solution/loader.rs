//! Solution loading with wall-clock watchdogs.
//!
//! Project loading can block on slow filesystems. Budgets are checked
//! between project loads; exceeding one degrades the remaining projects to
//! directory scanning instead of failing the request.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tia_core::config::TiaConfig;
use tia_core::errors::SolutionError;
use tracing::{info, warn};

use super::project;
use super::sln;
use super::types::{ProjectInfo, SolutionInfo};

/// Loads solutions under the configured time budgets.
pub struct SolutionLoader {
    project_budget: Duration,
    solution_budget: Duration,
}

impl SolutionLoader {
    pub fn new(config: &TiaConfig) -> Self {
        Self {
            project_budget: Duration::from_secs(config.load.effective_project_timeout_secs()),
            solution_budget: Duration::from_secs(config.load.effective_solution_timeout_secs()),
        }
    }

    /// Load a solution manifest and its projects.
    ///
    /// When the per-solution budget runs out, remaining projects fall back
    /// to a minimal directory-scanned `ProjectInfo` so analysis can proceed
    /// over every source file.
    pub fn load(&self, solution_path: &Path) -> Result<SolutionInfo, SolutionError> {
        let started = Instant::now();
        let content = sln::read_solution(solution_path)?;
        let sln_dir = solution_path.parent().unwrap_or_else(|| Path::new("."));

        let mut solution = SolutionInfo {
            path: solution_path.to_path_buf(),
            projects: Vec::new(),
        };

        for entry in sln::project_entries(&content) {
            let project_path = sln_dir.join(sln::normalize_separators(&entry));

            if started.elapsed() > self.solution_budget {
                warn!(
                    solution = %solution_path.display(),
                    "solution load budget exceeded; falling back to directory scan"
                );
                solution.projects.push(fallback_project(&project_path));
                continue;
            }

            let project_started = Instant::now();
            match project::parse_project(&project_path) {
                Ok(info) => {
                    if project_started.elapsed() > self.project_budget {
                        warn!(
                            project = %project_path.display(),
                            "project load exceeded budget; subsequent loads may degrade"
                        );
                    }
                    solution.projects.push(info);
                }
                Err(e) => {
                    warn!(project = %project_path.display(), "skipping unreadable project: {e}");
                }
            }
        }

        info!(
            solution = %solution_path.display(),
            projects = solution.projects.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "solution loaded"
        );
        Ok(solution)
    }
}

/// Minimal project info built without reading the manifest: name from the
/// file stem, sources from a directory scan.
fn fallback_project(project_path: &Path) -> ProjectInfo {
    let directory = project_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let name = project_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string();
    let is_test = project::is_test_project(project_path);

    ProjectInfo {
        name,
        path: project_path.to_path_buf(),
        directory: directory.clone(),
        target_frameworks: Vec::new(),
        project_references: Vec::new(),
        package_references: Vec::new(),
        source_files: scan_sources(&directory),
        is_test_project: is_test,
    }
}

fn scan_sources(directory: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    let walker = ignore::WalkBuilder::new(directory)
        .standard_filters(false)
        .hidden(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !matches!(
                name.to_ascii_lowercase().as_str(),
                "bin" | "obj" | ".git" | ".vs" | ".svn" | ".hg" | "node_modules"
            )
        })
        .build();

    for entry in walker.flatten() {
        if entry.file_type().is_some_and(|t| t.is_file())
            && entry.path().extension().and_then(|e| e.to_str()) == Some("cs")
        {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    files
}

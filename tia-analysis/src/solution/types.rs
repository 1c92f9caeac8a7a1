//! Solution model types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A parsed project manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// Project name (assembly name when declared, else the file stem).
    pub name: String,
    /// Path to the project file.
    pub path: PathBuf,
    /// Directory containing the project file.
    pub directory: PathBuf,
    /// Declared target frameworks. The first entry is the effective one.
    pub target_frameworks: Vec<String>,
    /// Paths of referenced project files, resolved relative to `directory`.
    pub project_references: Vec<PathBuf>,
    /// Package references as `(name, version)`; version may be empty.
    pub package_references: Vec<(String, String)>,
    /// Source files belonging to this project.
    pub source_files: Vec<PathBuf>,
    /// Whether this project hosts tests.
    pub is_test_project: bool,
}

impl ProjectInfo {
    /// The effective target framework: first declared, or the default.
    pub fn target_framework(&self) -> &str {
        self.target_frameworks
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_TARGET_FRAMEWORK)
    }
}

/// Fallback when a project declares no target framework.
pub const DEFAULT_TARGET_FRAMEWORK: &str = "net8.0";

/// A parsed solution manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolutionInfo {
    /// Path to the solution file.
    pub path: PathBuf,
    /// Projects in declaration order.
    pub projects: Vec<ProjectInfo>,
}

impl SolutionInfo {
    /// All source files across all projects.
    pub fn source_files(&self) -> impl Iterator<Item = &Path> {
        self.projects
            .iter()
            .flat_map(|p| p.source_files.iter().map(PathBuf::as_path))
    }

    /// Find the project owning a source file.
    pub fn project_for_file(&self, file: &Path) -> Option<&ProjectInfo> {
        self.projects
            .iter()
            .find(|p| p.source_files.iter().any(|f| f == file))
    }
}

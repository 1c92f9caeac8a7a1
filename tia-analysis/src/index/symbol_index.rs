//! The symbol index proper: multi-map tables and queries.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tia_core::errors::IndexError;
use tia_core::traits::CancellationToken;
use tia_core::types::collections::{FxHashMap, FxHashSet};
use tracing::{debug, info, warn};

use crate::solution::{ProjectInfo, SolutionInfo};

use super::extract::{parse_method_id, FileSymbols, SymbolExtractor};

/// Multi-map symbol index over a set of source files.
#[derive(Default)]
pub struct SymbolIndex {
    method_names: FxHashMap<String, FxHashSet<PathBuf>>,
    approximate_ids: FxHashMap<String, FxHashSet<PathBuf>>,
    type_names: FxHashMap<String, FxHashSet<PathBuf>>,
    namespaces: FxHashMap<String, FxHashSet<PathBuf>>,
    reference_names: FxHashMap<String, FxHashSet<PathBuf>>,
    file_projects: FxHashMap<PathBuf, ProjectInfo>,
    indexed_files: FxHashSet<PathBuf>,
    is_built: bool,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_built(&self) -> bool {
        self.is_built
    }

    pub fn indexed_file_count(&self) -> usize {
        self.indexed_files.len()
    }

    /// Full build over a parsed solution.
    pub fn build_from_solution(
        &mut self,
        solution: &SolutionInfo,
        parallelism: usize,
        token: &CancellationToken,
    ) -> Result<(), IndexError> {
        let mut files: Vec<(PathBuf, Option<ProjectInfo>)> = Vec::new();
        for project in &solution.projects {
            for file in &project.source_files {
                files.push((file.clone(), Some(project.clone())));
            }
        }
        self.build_files(files, parallelism, token)
    }

    /// Full build over a directory tree, excluding build-output dirs.
    pub fn build_from_directory(
        &mut self,
        directory: &Path,
        parallelism: usize,
        token: &CancellationToken,
    ) -> Result<(), IndexError> {
        let files = discover_directory(directory)
            .into_iter()
            .map(|f| (f, None))
            .collect();
        self.build_files(files, parallelism, token)
    }

    /// Scoped build: index only the given files and projects. Falls back
    /// to a full solution build when both scopes are empty.
    pub fn build_scoped(
        &mut self,
        solution: &SolutionInfo,
        changed_files: &[PathBuf],
        relevant_projects: &[String],
        parallelism: usize,
        token: &CancellationToken,
    ) -> Result<(), IndexError> {
        if changed_files.is_empty() && relevant_projects.is_empty() {
            return self.build_from_solution(solution, parallelism, token);
        }

        let changed: FxHashSet<&Path> = changed_files.iter().map(PathBuf::as_path).collect();
        let mut files: Vec<(PathBuf, Option<ProjectInfo>)> = Vec::new();
        for project in &solution.projects {
            let project_selected = relevant_projects.iter().any(|name| name == &project.name);
            for file in &project.source_files {
                if project_selected || changed.contains(file.as_path()) {
                    files.push((file.clone(), Some(project.clone())));
                }
            }
        }
        // Changed files outside any project still get indexed.
        for file in changed_files {
            if !files.iter().any(|(f, _)| f == file) && file.exists() {
                files.push((file.clone(), None));
            }
        }

        self.build_files(files, parallelism, token)
    }

    /// Remove a file from every table, then re-index it.
    pub fn refresh_file(&mut self, file: &Path) {
        self.remove_file(file);
        let extractor = SymbolExtractor::new();
        let symbols = extractor.extract(file);
        let project = self.file_projects.get(file).cloned();
        self.commit_file(file.to_path_buf(), symbols, project);
    }

    fn build_files(
        &mut self,
        files: Vec<(PathBuf, Option<ProjectInfo>)>,
        parallelism: usize,
        token: &CancellationToken,
    ) -> Result<(), IndexError> {
        if files.is_empty() {
            return Err(IndexError::NoInput);
        }

        let started = std::time::Instant::now();
        let extractor = SymbolExtractor::new();
        let extract_all = || {
            files
                .par_iter()
                .map(|(file, project)| {
                    if token.is_cancelled() {
                        return None;
                    }
                    Some((file.clone(), extractor.extract(file), project.clone()))
                })
                .collect::<Vec<_>>()
        };

        let extracted = match rayon::ThreadPoolBuilder::new()
            .num_threads(parallelism.max(1))
            .build()
        {
            Ok(pool) => pool.install(extract_all),
            Err(e) => {
                warn!("bounded pool unavailable, using the global pool: {e}");
                extract_all()
            }
        };

        // Cancellation discards partial results before commit.
        if token.is_cancelled() {
            return Ok(());
        }

        for entry in extracted.into_iter().flatten() {
            let (file, symbols, project) = entry;
            self.commit_file(file, symbols, project);
        }

        self.is_built = true;
        info!(
            files = self.indexed_files.len(),
            methods = self.method_names.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "symbol index built"
        );
        Ok(())
    }

    fn commit_file(&mut self, file: PathBuf, symbols: FileSymbols, project: Option<ProjectInfo>) {
        for namespace in symbols.namespaces {
            self.namespaces
                .entry(namespace)
                .or_default()
                .insert(file.clone());
        }
        for type_name in symbols.types {
            self.type_names
                .entry(type_name)
                .or_default()
                .insert(file.clone());
        }
        for (simple, approx) in symbols.methods {
            self.method_names
                .entry(simple)
                .or_default()
                .insert(file.clone());
            self.approximate_ids
                .entry(approx)
                .or_default()
                .insert(file.clone());
        }
        for reference in symbols.references {
            self.reference_names
                .entry(reference)
                .or_default()
                .insert(file.clone());
        }
        if let Some(project) = project {
            self.file_projects.insert(file.clone(), project);
        }
        self.indexed_files.insert(file);
    }

    fn remove_file(&mut self, file: &Path) {
        for table in [
            &mut self.method_names,
            &mut self.approximate_ids,
            &mut self.type_names,
            &mut self.namespaces,
            &mut self.reference_names,
        ] {
            table.retain(|_, files| {
                files.remove(file);
                !files.is_empty()
            });
        }
        self.indexed_files.remove(file);
    }

    /// Files that may declare the given method.
    ///
    /// Tries the exact approximate-id form first, then falls back to a
    /// fuzzy substring match on the simple name.
    pub fn find_files_containing_method(&self, method_id: &str) -> Vec<PathBuf> {
        if !self.warn_if_unbuilt() {
            return Vec::new();
        }

        let (prefix, simple, param_count) = parse_method_id(method_id);
        if let Some(count) = param_count {
            let approx = if prefix.is_empty() {
                format!("{simple}({count} params)")
            } else {
                format!("{prefix}.{simple}({count} params)")
            };
            if let Some(files) = self.approximate_ids.get(&approx) {
                return sorted(files);
            }
        }

        if let Some(files) = self.method_names.get(&simple) {
            return sorted(files);
        }

        // Fuzzy: any indexed simple name containing (or contained in) the
        // queried one.
        let mut out: FxHashSet<&PathBuf> = FxHashSet::default();
        for (name, files) in &self.method_names {
            if name.contains(&simple) || simple.contains(name.as_str()) {
                out.extend(files.iter());
            }
        }
        let mut result: Vec<PathBuf> = out.into_iter().cloned().collect();
        result.sort();
        result
    }

    /// Files that may declare the given type; exact match first, then
    /// bidirectional substring.
    pub fn find_files_containing_type(&self, type_name: &str) -> Vec<PathBuf> {
        if !self.warn_if_unbuilt() {
            return Vec::new();
        }

        if let Some(files) = self.type_names.get(type_name) {
            return sorted(files);
        }

        let mut out: FxHashSet<&PathBuf> = FxHashSet::default();
        for (name, files) in &self.type_names {
            if name.contains(type_name) || type_name.contains(name.as_str()) {
                out.extend(files.iter());
            }
        }
        let mut result: Vec<PathBuf> = out.into_iter().cloned().collect();
        result.sort();
        result
    }

    /// Files whose source text uses the given simple name in call
    /// position. Over-approximate: a hit means "may reference".
    pub fn find_files_referencing(&self, simple_name: &str) -> Vec<PathBuf> {
        if !self.warn_if_unbuilt() {
            return Vec::new();
        }
        self.reference_names
            .get(simple_name)
            .map(sorted)
            .unwrap_or_default()
    }

    /// Files declaring anything in the given namespace.
    pub fn find_files_in_namespace(&self, namespace: &str) -> Vec<PathBuf> {
        if !self.warn_if_unbuilt() {
            return Vec::new();
        }
        self.namespaces
            .get(namespace)
            .map(sorted)
            .unwrap_or_default()
    }

    /// The project owning a file, when known.
    pub fn project_for_file(&self, file: &Path) -> Option<&ProjectInfo> {
        self.file_projects.get(file)
    }

    pub fn indexed_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.indexed_files.iter()
    }

    fn warn_if_unbuilt(&self) -> bool {
        if !self.is_built {
            warn!("symbol index queried before build; returning empty results");
            return false;
        }
        true
    }
}

fn sorted(files: &FxHashSet<PathBuf>) -> Vec<PathBuf> {
    let mut v: Vec<PathBuf> = files.iter().cloned().collect();
    v.sort();
    v
}

/// Recursively discover source files under a directory, excluding build
/// output and VCS metadata.
pub fn discover_directory(directory: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let walker = ignore::WalkBuilder::new(directory)
        .standard_filters(false)
        .hidden(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy().to_ascii_lowercase();
            !matches!(
                name.as_str(),
                "bin" | "obj" | ".git" | ".vs" | ".svn" | ".hg" | "node_modules"
            )
        })
        .build();

    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.file_type().is_some_and(|t| t.is_file())
                    && entry.path().extension().and_then(|e| e.to_str()) == Some("cs")
                {
                    files.push(entry.path().to_path_buf());
                }
            }
            Err(e) => debug!("skipping unreadable dir entry: {e}"),
        }
    }
    files.sort();
    files
}

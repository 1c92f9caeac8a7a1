//! Compilation providers: workspace-backed and scoped.
//!
//! Both hand out cached syntax trees, cached semantic models, and a
//! declaration table covering the files a given file can see. Caches allow
//! benign compute-twice races; compute is idempotent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use moka::sync::Cache;
use tia_core::types::collections::FxHashMap;
use tracing::debug;

use crate::solution::SolutionInfo;

use super::model::{build_model, SemanticModel};
use super::resolver::TypeTable;
use super::syntax::SyntaxTree;

const TREE_CACHE_CAPACITY: u64 = 4096;
const MODEL_CACHE_CAPACITY: u64 = 4096;

/// On-demand semantic models over some set of files.
pub trait CompilationProvider: Send + Sync {
    /// Every file this provider can model.
    fn files(&self) -> Vec<PathBuf>;

    /// Parsed syntax tree for a file, cached.
    fn get_syntax_tree(&self, file: &Path) -> Option<Arc<SyntaxTree>>;

    /// Semantic model for a file, cached. Consistent with
    /// `get_syntax_tree`: built from the same parser output.
    fn get_semantic_model(&self, file: &Path) -> Option<Arc<SemanticModel>>;

    /// Declaration table covering everything visible from `file`.
    fn type_table(&self, file: &Path) -> Option<Arc<TypeTable>>;

    /// Drop cached semantic models. Reparsing may reuse cached trees.
    fn clear_semantic_model_cache(&self);
}

/// Shared tree/model caching used by both providers.
struct ModelCaches {
    trees: Cache<PathBuf, Arc<SyntaxTree>>,
    models: Cache<PathBuf, Arc<SemanticModel>>,
}

impl ModelCaches {
    fn new() -> Self {
        Self {
            trees: Cache::new(TREE_CACHE_CAPACITY),
            models: Cache::new(MODEL_CACHE_CAPACITY),
        }
    }

    fn tree(&self, file: &Path) -> Option<Arc<SyntaxTree>> {
        self.trees
            .optionally_get_with(file.to_path_buf(), || match SyntaxTree::parse_file(file) {
                Ok(tree) => Some(Arc::new(tree)),
                Err(e) => {
                    debug!(file = %file.display(), "parse failed: {e}");
                    None
                }
            })
    }

    fn model(&self, file: &Path) -> Option<Arc<SemanticModel>> {
        self.models
            .optionally_get_with(file.to_path_buf(), || {
                self.tree(file).map(|tree| Arc::new(build_model(&tree)))
            })
    }
}

/// Project-graph aware provider: the table for a file covers its project
/// plus the transitive closure of referenced projects.
pub struct WorkspaceCompilation {
    solution: SolutionInfo,
    file_to_project: FxHashMap<PathBuf, usize>,
    /// Project index -> all source files visible to it.
    visible_files: Vec<Vec<PathBuf>>,
    caches: ModelCaches,
    tables: Cache<usize, Arc<TypeTable>>,
}

impl WorkspaceCompilation {
    pub fn new(solution: SolutionInfo) -> Self {
        let mut file_to_project = FxHashMap::default();
        for (idx, project) in solution.projects.iter().enumerate() {
            for file in &project.source_files {
                file_to_project.insert(file.clone(), idx);
            }
        }

        let visible_files = compute_visible_files(&solution);

        Self {
            solution,
            file_to_project,
            visible_files,
            caches: ModelCaches::new(),
            tables: Cache::new(256),
        }
    }

    pub fn solution(&self) -> &SolutionInfo {
        &self.solution
    }

    fn project_of(&self, file: &Path) -> Option<usize> {
        self.file_to_project.get(file).copied()
    }
}

impl CompilationProvider for WorkspaceCompilation {
    fn files(&self) -> Vec<PathBuf> {
        self.solution
            .source_files()
            .map(Path::to_path_buf)
            .collect()
    }

    fn get_syntax_tree(&self, file: &Path) -> Option<Arc<SyntaxTree>> {
        self.caches.tree(file)
    }

    fn get_semantic_model(&self, file: &Path) -> Option<Arc<SemanticModel>> {
        self.caches.model(file)
    }

    fn type_table(&self, file: &Path) -> Option<Arc<TypeTable>> {
        let project = self.project_of(file)?;
        self.tables.optionally_get_with(project, || {
            let files = self.visible_files.get(project)?;
            let models: Vec<Arc<SemanticModel>> = files
                .iter()
                .filter_map(|f| self.caches.model(f))
                .collect();
            Some(Arc::new(TypeTable::build(&models)))
        })
    }

    fn clear_semantic_model_cache(&self) {
        self.caches.models.invalidate_all();
        self.tables.invalidate_all();
    }
}

/// Fixed-file-set provider, used for scoped/incremental builds and as the
/// fallback when workspace loading times out.
pub struct ScopedCompilation {
    files: Vec<PathBuf>,
    caches: ModelCaches,
    table: Cache<(), Arc<TypeTable>>,
}

impl ScopedCompilation {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            caches: ModelCaches::new(),
            table: Cache::new(1),
        }
    }

    /// Extend the file set, invalidating the table.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = PathBuf>) {
        for file in files {
            if !self.files.contains(&file) {
                self.files.push(file);
            }
        }
        self.table.invalidate_all();
    }
}

impl CompilationProvider for ScopedCompilation {
    fn files(&self) -> Vec<PathBuf> {
        self.files.clone()
    }

    fn get_syntax_tree(&self, file: &Path) -> Option<Arc<SyntaxTree>> {
        self.caches.tree(file)
    }

    fn get_semantic_model(&self, file: &Path) -> Option<Arc<SemanticModel>> {
        self.caches.model(file)
    }

    fn type_table(&self, _file: &Path) -> Option<Arc<TypeTable>> {
        self.table.optionally_get_with((), || {
            let models: Vec<Arc<SemanticModel>> = self
                .files
                .iter()
                .filter_map(|f| self.caches.model(f))
                .collect();
            Some(Arc::new(TypeTable::build(&models)))
        })
    }

    fn clear_semantic_model_cache(&self) {
        self.caches.models.invalidate_all();
        self.table.invalidate_all();
    }
}

/// For each project, the source files of the project plus its transitive
/// project references that live in the solution.
fn compute_visible_files(solution: &SolutionInfo) -> Vec<Vec<PathBuf>> {
    let path_to_idx: FxHashMap<PathBuf, usize> = solution
        .projects
        .iter()
        .enumerate()
        .map(|(i, p)| (crate::solution::graph::canonical_key(&p.path), i))
        .collect();

    let mut visible = Vec::with_capacity(solution.projects.len());
    for (idx, _) in solution.projects.iter().enumerate() {
        let mut seen = vec![false; solution.projects.len()];
        let mut stack = vec![idx];
        let mut files = Vec::new();
        while let Some(current) = stack.pop() {
            if seen[current] {
                continue;
            }
            seen[current] = true;
            let project = &solution.projects[current];
            files.extend(project.source_files.iter().cloned());
            for reference in &project.project_references {
                if let Some(&dep) =
                    path_to_idx.get(&crate::solution::graph::canonical_key(reference))
                {
                    stack.push(dep);
                }
            }
        }
        visible.push(files);
    }
    visible
}

//! Stable error codes.
//!
//! Every error carries a short machine-readable code that survives message
//! rewording. Codes are namespaced by subsystem: `SLN-*`, `IDX-*`,
//! `SEM-*`, `GRAPH-*`, `DIFF-*`, `CACHE-*`, `CFG-*`.

use super::{
    AnalysisError, CacheError, ConfigError, DiffError, GraphError, IndexError, SemanticError,
    SolutionError,
};

pub const SLN_NOT_FOUND: &str = "SLN-001";
pub const SLN_MANIFEST: &str = "SLN-002";
pub const SLN_CYCLE: &str = "SLN-003";
pub const SLN_IO: &str = "SLN-004";

pub const IDX_NO_INPUT: &str = "IDX-001";
pub const IDX_IO: &str = "IDX-002";

pub const SEM_PARSE: &str = "SEM-001";
pub const SEM_FILE_NOT_FOUND: &str = "SEM-002";
pub const SEM_IO: &str = "SEM-003";

pub const GRAPH_BUILD: &str = "GRAPH-001";
pub const GRAPH_UNKNOWN_METHOD: &str = "GRAPH-002";

pub const DIFF_NOT_FOUND: &str = "DIFF-001";
pub const DIFF_IO: &str = "DIFF-002";
pub const DIFF_COMMAND: &str = "DIFF-003";

pub const CACHE_SNAPSHOT: &str = "CACHE-001";
pub const CACHE_IO: &str = "CACHE-002";

pub const CFG_NOT_FOUND: &str = "CFG-001";
pub const CFG_PARSE: &str = "CFG-002";
pub const CFG_VALIDATION: &str = "CFG-003";

pub const CANCELLED: &str = "CANCELLED";

/// Maps an error to its stable code.
pub trait TiaErrorCode {
    fn error_code(&self) -> &'static str;
}

impl TiaErrorCode for SolutionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => SLN_NOT_FOUND,
            Self::Manifest { .. } => SLN_MANIFEST,
            Self::CircularDependency { .. } => SLN_CYCLE,
            Self::Io { .. } => SLN_IO,
        }
    }
}

impl TiaErrorCode for IndexError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoInput => IDX_NO_INPUT,
            Self::Io { .. } => IDX_IO,
        }
    }
}

impl TiaErrorCode for SemanticError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => SEM_PARSE,
            Self::FileNotFound { .. } => SEM_FILE_NOT_FOUND,
            Self::Io { .. } => SEM_IO,
        }
    }
}

impl TiaErrorCode for GraphError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Build { .. } => GRAPH_BUILD,
            Self::UnknownMethod { .. } => GRAPH_UNKNOWN_METHOD,
        }
    }
}

impl TiaErrorCode for DiffError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => DIFF_NOT_FOUND,
            Self::Io(_) => DIFF_IO,
            Self::Command { .. } => DIFF_COMMAND,
        }
    }
}

impl TiaErrorCode for CacheError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => CACHE_SNAPSHOT,
            Self::Io(_) => CACHE_IO,
        }
    }
}

impl TiaErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => CFG_NOT_FOUND,
            Self::Parse { .. } => CFG_PARSE,
            Self::Validation { .. } => CFG_VALIDATION,
        }
    }
}

impl TiaErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Solution(e) => e.error_code(),
            Self::Index(e) => e.error_code(),
            Self::Semantic(e) => e.error_code(),
            Self::Graph(e) => e.error_code(),
            Self::Diff(e) => e.error_code(),
            Self::Cache(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Cancelled => CANCELLED,
        }
    }
}

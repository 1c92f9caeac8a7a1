//! Top-level TIA configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{CoverageConfig, GraphConfig, IndexConfig, LoadConfig};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sections.
///
/// Resolution order (highest priority first):
/// 1. Caller overrides (applied via `apply_overrides`)
/// 2. Environment variables (`TIA_*`)
/// 3. Project config (`tia.toml` in the analysis root)
/// 4. User config (`~/.tia/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TiaConfig {
    pub index: IndexConfig,
    pub graph: GraphConfig,
    pub coverage: CoverageConfig,
    pub load: LoadConfig,
}

/// Caller-supplied overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub parallelism: Option<usize>,
    pub default_depth: Option<u32>,
    pub confidence_ladder: Option<String>,
    pub strict_matching: Option<bool>,
}

impl TiaConfig {
    /// Load configuration with layered resolution rooted at `root`.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = user_config_path() {
            if user_config_path.exists() {
                // A broken user config must not poison every analysis run.
                if let Err(e) = Self::merge_toml_file(&mut config, &user_config_path) {
                    tracing::warn!("ignoring unreadable user config: {e}");
                }
            }
        }

        let project_config_path = root.join("tia.toml");
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(ov) = overrides {
            Self::apply_overrides(&mut config, ov);
        }

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the resolved configuration values.
    pub fn validate(config: &TiaConfig) -> Result<(), ConfigError> {
        if let Some(parallelism) = config.index.parallelism {
            if parallelism == 0 {
                return Err(ConfigError::Validation {
                    field: "index.parallelism".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(depth) = config.graph.default_depth {
            if depth == 0 {
                return Err(ConfigError::Validation {
                    field: "graph.default_depth".to_string(),
                    message: "must be greater than 0".to_string(),
                });
            }
        }
        if let Some(ref ladder) = config.graph.confidence_ladder {
            if ladder != "stepwise" && ladder != "linear" {
                return Err(ConfigError::Validation {
                    field: "graph.confidence_ladder".to_string(),
                    message: "must be `stepwise` or `linear`".to_string(),
                });
            }
        }
        Ok(())
    }

    fn merge_toml_file(config: &mut TiaConfig, path: &Path) -> Result<(), ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
                path: path.display().to_string(),
            })?;

        let file_config: TiaConfig =
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; `other` wins only where it has a value.
    fn merge(base: &mut TiaConfig, other: &TiaConfig) {
        if other.index.parallelism.is_some() {
            base.index.parallelism = other.index.parallelism;
        }
        if other.index.source_extension.is_some() {
            base.index.source_extension = other.index.source_extension.clone();
        }
        if other.graph.default_depth.is_some() {
            base.graph.default_depth = other.graph.default_depth;
        }
        if other.graph.confidence_ladder.is_some() {
            base.graph.confidence_ladder = other.graph.confidence_ladder.clone();
        }
        if other.coverage.strict_matching.is_some() {
            base.coverage.strict_matching = other.coverage.strict_matching;
        }
        if other.load.project_timeout_secs.is_some() {
            base.load.project_timeout_secs = other.load.project_timeout_secs;
        }
        if other.load.solution_timeout_secs.is_some() {
            base.load.solution_timeout_secs = other.load.solution_timeout_secs;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `TIA_INDEX_PARALLELISM`, `TIA_GRAPH_DEFAULT_DEPTH`, etc.
    fn apply_env_overrides(config: &mut TiaConfig) {
        if let Ok(val) = std::env::var("TIA_INDEX_PARALLELISM") {
            if let Ok(v) = val.parse::<usize>() {
                config.index.parallelism = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TIA_GRAPH_DEFAULT_DEPTH") {
            if let Ok(v) = val.parse::<u32>() {
                config.graph.default_depth = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TIA_GRAPH_CONFIDENCE_LADDER") {
            config.graph.confidence_ladder = Some(val);
        }
        if let Ok(val) = std::env::var("TIA_COVERAGE_STRICT_MATCHING") {
            if let Ok(v) = val.parse::<bool>() {
                config.coverage.strict_matching = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TIA_LOAD_PROJECT_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.load.project_timeout_secs = Some(v);
            }
        }
        if let Ok(val) = std::env::var("TIA_LOAD_SOLUTION_TIMEOUT_SECS") {
            if let Ok(v) = val.parse::<u64>() {
                config.load.solution_timeout_secs = Some(v);
            }
        }
    }

    /// Apply caller overrides (highest priority).
    fn apply_overrides(config: &mut TiaConfig, ov: &ConfigOverrides) {
        if let Some(v) = ov.parallelism {
            config.index.parallelism = Some(v);
        }
        if let Some(v) = ov.default_depth {
            config.graph.default_depth = Some(v);
        }
        if let Some(ref v) = ov.confidence_ladder {
            config.graph.confidence_ladder = Some(v.clone());
        }
        if let Some(v) = ov.strict_matching {
            config.coverage.strict_matching = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

/// Returns the user config path: `~/.tia/config.toml`.
fn user_config_path() -> Option<std::path::PathBuf> {
    home_dir().map(|h| h.join(".tia").join("config.toml"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(std::path::PathBuf::from)
}

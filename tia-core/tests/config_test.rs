//! Tests for the TIA configuration system.

use std::sync::Mutex;

use tia_core::config::{ConfigOverrides, TiaConfig};
use tia_core::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all TIA_ env vars to prevent cross-test contamination.
fn clear_tia_env_vars() {
    for key in [
        "TIA_INDEX_PARALLELISM",
        "TIA_GRAPH_DEFAULT_DEPTH",
        "TIA_GRAPH_CONFIDENCE_LADDER",
        "TIA_COVERAGE_STRICT_MATCHING",
        "TIA_LOAD_PROJECT_TIMEOUT_SECS",
        "TIA_LOAD_SOLUTION_TIMEOUT_SECS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn layered_resolution_overrides_beat_env_beat_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_tia_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("tia.toml"),
        r#"
[index]
parallelism = 4

[graph]
default_depth = 3
"#,
    )
    .unwrap();

    std::env::set_var("TIA_INDEX_PARALLELISM", "8");

    let overrides = ConfigOverrides {
        default_depth: Some(7),
        ..Default::default()
    };

    let config = TiaConfig::load(dir.path(), Some(&overrides)).unwrap();

    // Caller overrides beat env and file for default_depth
    assert_eq!(config.graph.default_depth, Some(7));
    // Env beats file for parallelism
    assert_eq!(config.index.parallelism, Some(8));

    clear_tia_env_vars();
}

#[test]
fn missing_files_fall_back_to_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_tia_env_vars();

    let dir = tempdir();
    let config = TiaConfig::load(dir.path(), None).unwrap();

    assert_eq!(config.graph.effective_default_depth(), 5);
    assert_eq!(config.graph.effective_confidence_ladder(), "stepwise");
    assert!(!config.coverage.effective_strict_matching());
    assert_eq!(config.load.effective_project_timeout_secs(), 15);
    assert_eq!(config.load.effective_solution_timeout_secs(), 30);
    assert_eq!(config.index.effective_source_extension(), "cs");
    assert!(config.index.effective_parallelism() >= 1);
    assert!(config.index.effective_parallelism() <= 64);
}

#[test]
fn invalid_ladder_rejected() {
    let config = TiaConfig::from_toml(
        r#"
[graph]
confidence_ladder = "quadratic"
"#,
    )
    .unwrap();

    let err = TiaConfig::validate(&config).unwrap_err();
    assert!(matches!(err, ConfigError::Validation { .. }));
}

#[test]
fn zero_parallelism_rejected() {
    let config = TiaConfig::from_toml(
        r#"
[index]
parallelism = 0
"#,
    )
    .unwrap();

    assert!(TiaConfig::validate(&config).is_err());
}

#[test]
fn roundtrip_toml() {
    let config = TiaConfig::from_toml(
        r#"
[coverage]
strict_matching = true
"#,
    )
    .unwrap();
    assert_eq!(config.coverage.strict_matching, Some(true));

    let serialized = config.to_toml().unwrap();
    let reparsed = TiaConfig::from_toml(&serialized).unwrap();
    assert_eq!(reparsed.coverage.strict_matching, Some(true));
}

//! Layered configuration for the TIA engine.

pub mod sections;
pub mod tia_config;

pub use sections::{CoverageConfig, GraphConfig, IndexConfig, LoadConfig};
pub use tia_config::{ConfigOverrides, TiaConfig};

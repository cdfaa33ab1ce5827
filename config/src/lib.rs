//! # Configuration System
//!
//! Centralized configuration management for the Lucid explanation pipeline.
//!
//! This crate provides:
//! - Configuration structures for the oracle, synthesis and logging
//! - Environment variable loading (12-factor app principles)
//! - Configuration file loading (TOML/YAML)
//! - Per-source layers holding only the fields a source sets
//! - Configuration precedence (CLI > env > file > defaults)
//! - Configuration validation

pub mod config;
pub mod file_loader;
pub mod layer;
pub mod loader;
pub mod precedence;
pub mod validation;

pub use config::{Config, ObservabilityConfig, OracleConfig, SynthesisConfig};
pub use file_loader::{ConfigFileError, load_from_file, load_from_toml, load_from_yaml};
pub use loader::{ConfigEnvError, load_from_env};
pub use layer::{ConfigLayer, ObservabilityLayer, OracleLayer, SynthesisLayer};
pub use precedence::{apply_layer, merge_configs};
pub use validation::validate;

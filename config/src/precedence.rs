//! # Configuration Precedence
//!
//! Merges configuration from multiple sources with precedence rules.
//!
//! # Precedence Order
//! 1. CLI arguments (highest priority)
//! 2. Environment variables
//! 3. Configuration file
//! 4. Default values (lowest priority)
//!
//! Each source is a [`ConfigLayer`]; a field it sets wins over lower
//! sources even when the value equals the built-in default.

use crate::config::{Config, ObservabilityConfig, OracleConfig, SynthesisConfig};
use crate::layer::{ConfigLayer, ObservabilityLayer, OracleLayer, SynthesisLayer};

/// Merge configuration sources, highest precedence last.
///
/// ## Usage
/// ```rust,no_run
/// use config::{Config, load_from_env, load_from_file, merge_configs};
/// use std::path::Path;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let from_file = load_from_file(Path::new("lucid.toml"))?;
///     let from_env = load_from_env()?;
///     let _config = merge_configs(Config::default(), from_file, "file", from_env, "env", None, "cli");
///     Ok(())
/// }
/// ```
pub fn merge_configs(
    defaults: Config,
    file_layer: ConfigLayer,
    file_source_name: &str,
    env_layer: ConfigLayer,
    env_source_name: &str,
    cli_layer: Option<ConfigLayer>,
    cli_source_name: &str
) -> Config {
    let mut config = defaults;

    apply_layer(&mut config, file_layer, file_source_name);
    apply_layer(&mut config, env_layer, env_source_name);

    if let Some(cli) = cli_layer {
        apply_layer(&mut config, cli, cli_source_name);
    }

    config
}

/// Apply every field `layer` sets onto `config`, logging what changed.
pub fn apply_layer(config: &mut Config, layer: ConfigLayer, source_name: &str) {
    let mut changes = Vec::new();

    merge_oracle(&mut config.oracle, layer.oracle, &mut changes);
    merge_synthesis(&mut config.synthesis, layer.synthesis, &mut changes);
    merge_observability(&mut config.observability, layer.observability, &mut changes);

    if !changes.is_empty() {
        tracing::info!("Configuration from {}: {:?}", source_name, changes);
    }
}

fn set<T: PartialEq + std::fmt::Debug>(
    field: &mut T,
    value: Option<T>,
    name: &str,
    changes: &mut Vec<String>
) {
    if let Some(value) = value {
        if *field != value {
            changes.push(format!("{name} = {value:?}"));
            *field = value;
        }
    }
}

fn merge_oracle(base: &mut OracleConfig, layer: OracleLayer, changes: &mut Vec<String>) {
    set(&mut base.base_url, layer.base_url, "oracle.base_url", changes);
    set(&mut base.model, layer.model, "oracle.model", changes);
    if let Some(key) = layer.api_key {
        if base.api_key.as_deref() != Some(key.as_str()) {
            changes.push("oracle.api_key = ***".to_string());
            base.api_key = Some(key);
        }
    }
    set(&mut base.timeout_seconds, layer.timeout_seconds, "oracle.timeout_seconds", changes);
    set(&mut base.cache_capacity, layer.cache_capacity, "oracle.cache_capacity", changes);
    if layer.temperature.is_some() {
        set(&mut base.temperature, Some(layer.temperature), "oracle.temperature", changes);
    }
}

fn merge_synthesis(base: &mut SynthesisConfig, layer: SynthesisLayer, changes: &mut Vec<String>) {
    set(&mut base.strategy, layer.strategy, "synthesis.strategy", changes);
    set(&mut base.leveled, layer.leveled, "synthesis.leveled", changes);
    set(&mut base.reading_level, layer.reading_level, "synthesis.reading_level", changes);
    set(&mut base.max_concurrency, layer.max_concurrency, "synthesis.max_concurrency", changes);
    set(
        &mut base.empty_topic_policy,
        layer.empty_topic_policy,
        "synthesis.empty_topic_policy",
        changes
    );
}

fn merge_observability(
    base: &mut ObservabilityConfig,
    layer: ObservabilityLayer,
    changes: &mut Vec<String>
) {
    set(&mut base.log_level, layer.log_level, "observability.log_level", changes);
}

//! # Environment Variable Loader
//!
//! Loads configuration from environment variables following 12-factor app
//! principles.
//!
//! # Naming Convention
//! - `LUCID_ORACLE_*`: oracle connection settings
//! - `LUCID_*`: synthesis defaults and logging
//! - `OPENAI_API_KEY`: fallback for the oracle key

use crate::layer::{ConfigLayer, ObservabilityLayer, OracleLayer, SynthesisLayer};
use lucid_core::{EmptyTopicPolicy, ReadingLevel, StrategyKind};
use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigEnvError {
    #[error("Invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String
    }
}

/// Load configuration from environment variables.
///
/// Unset variables stay unset in the returned layer, so they never override
/// a file or default value.
///
/// ## Environment Variables
/// ### Oracle (`LUCID_ORACLE_*`)
/// - `LUCID_ORACLE_BASE_URL`: API root (default: "https://api.openai.com/v1")
/// - `LUCID_ORACLE_MODEL`: model identifier (default: "gpt-4o")
/// - `LUCID_ORACLE_API_KEY`: bearer token, falls back to `OPENAI_API_KEY`
/// - `LUCID_ORACLE_TIMEOUT_SECONDS`: per-call timeout (default: 60)
/// - `LUCID_ORACLE_CACHE_CAPACITY`: response cache entries (default: 0)
/// - `LUCID_ORACLE_TEMPERATURE`: sampling temperature (optional)
///
/// ### Synthesis
/// - `LUCID_STRATEGY`: chained/structured (default: structured)
/// - `LUCID_LEVELED`: true/false (default: false)
/// - `LUCID_READING_LEVEL`: Basic..Graduate or K3..K12 (default: College)
/// - `LUCID_MAX_CONCURRENCY`: oracle calls in flight (default: 1)
/// - `LUCID_EMPTY_TOPIC_POLICY`: drop/fail (default: drop)
///
/// ### Observability
/// - `LUCID_LOG_LEVEL`: trace/debug/info/warn/error (default: "info")
pub fn load_from_env() -> Result<ConfigLayer, ConfigEnvError> {
    Ok(ConfigLayer {
        oracle: load_oracle_from_env()?,
        synthesis: load_synthesis_from_env()?,
        observability: load_observability_from_env()
    })
}

fn load_oracle_from_env() -> Result<OracleLayer, ConfigEnvError> {
    Ok(OracleLayer {
        base_url: env::var("LUCID_ORACLE_BASE_URL").ok(),
        model: env::var("LUCID_ORACLE_MODEL").ok(),
        api_key: env::var("LUCID_ORACLE_API_KEY")
            .or_else(|_| env::var("OPENAI_API_KEY"))
            .ok()
            .filter(|key| !key.trim().is_empty()),
        timeout_seconds: parse_env("LUCID_ORACLE_TIMEOUT_SECONDS")?,
        cache_capacity: parse_env("LUCID_ORACLE_CACHE_CAPACITY")?,
        temperature: parse_env("LUCID_ORACLE_TEMPERATURE")?
    })
}

fn load_synthesis_from_env() -> Result<SynthesisLayer, ConfigEnvError> {
    let reading_level = match env::var("LUCID_READING_LEVEL") {
        Ok(value) => Some(ReadingLevel::parse(&value).map_err(|e| {
            ConfigEnvError::Invalid {
                key: "LUCID_READING_LEVEL".to_string(),
                value: value.clone(),
                reason: e.to_string()
            }
        })?),
        Err(_) => None
    };

    Ok(SynthesisLayer {
        strategy: parse_env::<StrategyKind>("LUCID_STRATEGY")?,
        leveled: parse_env("LUCID_LEVELED")?,
        reading_level,
        max_concurrency: parse_env("LUCID_MAX_CONCURRENCY")?,
        empty_topic_policy: parse_env::<EmptyTopicPolicy>("LUCID_EMPTY_TOPIC_POLICY")?
    })
}

fn load_observability_from_env() -> ObservabilityLayer {
    ObservabilityLayer {
        log_level: env::var("LUCID_LOG_LEVEL")
            .ok()
            .map(|level| level.to_lowercase())
    }
}

/// `Ok(None)` when unset, an error when set but unparsable.
fn parse_env<T>(key: &str) -> Result<Option<T>, ConfigEnvError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigEnvError::Invalid {
                key: key.to_string(),
                value: raw.clone(),
                reason: e.to_string()
            }),
        Err(_) => Ok(None)
    }
}

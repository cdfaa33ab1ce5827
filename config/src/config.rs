//! # Configuration Structures
//!
//! All configuration structures:
//! - Use `serde` for serialization/deserialization with per-field defaults
//! - Use `validator` for input validation

use lucid_core::{EmptyTopicPolicy, ExplanationMode, ReadingLevel, StrategyKind};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Top-level configuration for the explanation pipeline.
///
/// ## Usage
/// ```rust,no_run
/// use config::Config;
///
/// let config = Config::default();
/// println!("Oracle model: {}", config.oracle.model);
/// ```
///
/// ## Fields
/// - `oracle`: text-generation service connection settings
/// - `synthesis`: strategy selection and reading-level defaults
/// - `observability`: logging settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    #[validate(nested)]
    pub oracle: OracleConfig,

    #[serde(default)]
    #[validate(nested)]
    pub synthesis: SynthesisConfig,

    #[serde(default)]
    #[validate(nested)]
    pub observability: ObservabilityConfig
}

/// Oracle (OpenAI-compatible chat completions) connection settings.
///
/// ## Fields
/// - `base_url`: API root, `/chat/completions` is appended (default: OpenAI)
/// - `model`: model identifier (default: "gpt-4o")
/// - `api_key`: bearer token; never serialized
/// - `timeout_seconds`: per-call timeout, expiry counts as unavailability
/// - `cache_capacity`: response cache entries, 0 disables the cache
/// - `temperature`: sampling temperature, provider default when unset
#[derive(Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_base_url")]
    #[validate(length(min = 1, max = 255), custom(function = "validate_base_url"))]
    pub base_url: String,

    #[serde(default = "default_oracle_model")]
    #[validate(length(min = 1, max = 128))]
    pub model: String,

    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_oracle_timeout_seconds")]
    #[validate(range(min = 1, max = 600))]
    pub timeout_seconds: u64,

    #[serde(default)]
    #[validate(range(max = 10_000))]
    pub cache_capacity: usize,

    #[serde(default)]
    #[validate(range(min = 0.0, max = 2.0))]
    pub temperature: Option<f32>
}

fn default_oracle_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_oracle_model() -> String {
    "gpt-4o".to_string()
}

fn default_oracle_timeout_seconds() -> u64 {
    60
}

fn validate_base_url(value: &str) -> Result<(), validator::ValidationError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(validator::ValidationError::new("base_url must be an http(s) URL"))
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: default_oracle_base_url(),
            model: default_oracle_model(),
            api_key: None,
            timeout_seconds: default_oracle_timeout_seconds(),
            cache_capacity: 0,
            temperature: None
        }
    }
}

impl std::fmt::Debug for OracleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("cache_capacity", &self.cache_capacity)
            .field("temperature", &self.temperature)
            .finish()
    }
}

/// Synthesis defaults applied when a request does not say otherwise.
///
/// ## Fields
/// - `strategy`: `chained` or `structured` (default: structured)
/// - `leveled`: one reading-level layer instead of three depth layers
/// - `reading_level`: audience band for leveled output (default: College)
/// - `max_concurrency`: simultaneous oracle calls, 1 is strictly sequential
/// - `empty_topic_policy`: `drop` or `fail` a topic with no concepts
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct SynthesisConfig {
    #[serde(default)]
    pub strategy: StrategyKind,

    #[serde(default)]
    pub leveled: bool,

    #[serde(default)]
    pub reading_level: ReadingLevel,

    #[serde(default = "default_max_concurrency")]
    #[validate(range(min = 1, max = 32))]
    pub max_concurrency: usize,

    #[serde(default)]
    pub empty_topic_policy: EmptyTopicPolicy
}

fn default_max_concurrency() -> usize {
    1
}

impl SynthesisConfig {
    pub fn mode(&self) -> ExplanationMode {
        ExplanationMode::from_flags(self.leveled, self.reading_level)
    }
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            leveled: false,
            reading_level: ReadingLevel::default(),
            max_concurrency: default_max_concurrency(),
            empty_topic_policy: EmptyTopicPolicy::default()
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ObservabilityConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    #[validate(custom(function = "validate_logging_level"))]
    pub log_level: String
}

fn default_log_level() -> String {
    "info".to_string()
}

fn validate_logging_level(value: &str) -> Result<(), validator::ValidationError> {
    match value {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(validator::ValidationError::new("Invalid logging level"))
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level()
        }
    }
}

//! # Configuration Validation
//!
//! Provides validation for all configuration structures using the `validator` crate.

use crate::config::Config;
use validator::Validate;

/// Validate configuration structure.
///
/// ## Validation Rules
/// ### Oracle
/// - `base_url`: 1-255 characters, http(s) scheme
/// - `model`: 1-128 characters
/// - `timeout_seconds`: 1-600
/// - `cache_capacity`: 0-10000
/// - `temperature`: 0.0-2.0 when set
///
/// ### Synthesis
/// - `max_concurrency`: 1-32
///
/// ### Observability
/// - `log_level`: must be "trace", "debug", "info", "warn", or "error"
pub fn validate(config: &Config) -> Result<(), validator::ValidationErrors> {
    config.validate()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_invalid_base_url() {
        let mut config = Config::default();
        config.oracle.base_url = "api.openai.com".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_invalid_timeout() {
        let mut config = Config::default();
        config.oracle.timeout_seconds = 0;
        assert!(validate(&config).is_err());

        config.oracle.timeout_seconds = 601;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_invalid_temperature() {
        let mut config = Config::default();
        config.oracle.temperature = Some(3.5);
        assert!(validate(&config).is_err());

        config.oracle.temperature = Some(0.2);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_invalid_concurrency() {
        let mut config = Config::default();
        config.synthesis.max_concurrency = 0;
        assert!(validate(&config).is_err());

        config.synthesis.max_concurrency = 64;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.observability.log_level = "verbose".to_string();
        assert!(validate(&config).is_err());
    }
}

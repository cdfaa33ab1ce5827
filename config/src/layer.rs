//! # Configuration Layers
//!
//! A layer holds only the settings one source actually provided. Files,
//! environment variables and command flags each produce a layer, and
//! [`merge_configs`](crate::merge_configs) applies them over the defaults
//! by presence, so a source can set a field back to its default value.

use lucid_core::{EmptyTopicPolicy, ReadingLevel, StrategyKind};
use serde::Deserialize;

/// Settings supplied by one configuration source.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ConfigLayer {
    pub oracle: OracleLayer,
    pub synthesis: SynthesisLayer,
    pub observability: ObservabilityLayer
}

#[derive(Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct OracleLayer {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub cache_capacity: Option<usize>,
    pub temperature: Option<f32>
}

impl std::fmt::Debug for OracleLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleLayer")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("timeout_seconds", &self.timeout_seconds)
            .field("cache_capacity", &self.cache_capacity)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SynthesisLayer {
    pub strategy: Option<StrategyKind>,
    pub leveled: Option<bool>,
    pub reading_level: Option<ReadingLevel>,
    pub max_concurrency: Option<usize>,
    pub empty_topic_policy: Option<EmptyTopicPolicy>
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityLayer {
    pub log_level: Option<String>
}

impl ConfigLayer {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_stay_unset() {
        let layer: ConfigLayer = toml::from_str("[synthesis]\nleveled = false\n").unwrap();
        assert_eq!(layer.synthesis.leveled, Some(false));
        assert_eq!(layer.synthesis.strategy, None);
        assert_eq!(layer.oracle, OracleLayer::default());
        assert!(!layer.is_empty());
        assert!(ConfigLayer::default().is_empty());
    }

    #[test]
    fn test_api_key_is_redacted() {
        let layer = OracleLayer {
            api_key: Some("sk-secret".to_string()),
            ..OracleLayer::default()
        };
        assert!(!format!("{layer:?}").contains("sk-secret"));
    }
}

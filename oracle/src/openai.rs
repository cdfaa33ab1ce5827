use std::num::NonZeroUsize;
use std::time::Duration;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequest, CreateChatCompletionRequestArgs
};
use async_openai::types::responses::{ResponseFormat, ResponseFormatJsonSchema};
use async_trait::async_trait;
use config::OracleConfig;
use errors::OracleError;
use lucid_core::{Oracle, OutputSchema};
use tokio::sync::Mutex;
use tracing::debug;

/// Oracle backed by an OpenAI-compatible chat completions API.
pub struct OpenAiOracle {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: Option<f32>,
    timeout: Duration,
    cache: Option<Mutex<lru::LruCache<String, String>>>
}

impl OpenAiOracle {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration
    ) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.into())
            .with_api_base(base_url.trim_end_matches('/'));

        Self {
            client: Client::with_config(config),
            model: model.into(),
            temperature: None,
            timeout,
            cache: None
        }
    }

    /// Builds a client from configuration. A missing API key is reported
    /// as unavailability since no call could ever succeed.
    pub fn from_config(config: &OracleConfig) -> Result<Self, OracleError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| OracleError::unavailable("Oracle API key is not configured"))?;

        let oracle = Self::new(
            &config.base_url,
            api_key,
            config.model.clone(),
            Duration::from_secs(config.timeout_seconds)
        )
        .with_cache_capacity(config.cache_capacity);

        Ok(match config.temperature {
            Some(t) => oracle.with_temperature(t),
            None => oracle
        })
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Caches responses by prompt; zero disables caching.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache = NonZeroUsize::new(capacity).map(|cap| Mutex::new(lru::LruCache::new(cap)));
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn cached(&self, key: &str) -> Option<String> {
        let cache = self.cache.as_ref()?;
        cache.lock().await.get(key).cloned()
    }

    async fn remember(&self, key: String, content: &str) {
        if let Some(cache) = &self.cache {
            cache.lock().await.put(key, content.to_string());
        }
    }

    fn build_request(
        &self,
        system: &str,
        user: &str,
        response_format: Option<ResponseFormat>
    ) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&self.model).messages([
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system)
                .build()?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user)
                .build()?
                .into()
        ]);
        if let Some(temperature) = self.temperature {
            args.temperature(temperature);
        }
        if let Some(format) = response_format {
            args.response_format(format);
        }
        args.build()
    }

    async fn send(
        &self,
        system: &str,
        user: &str,
        response_format: Option<ResponseFormat>
    ) -> Result<String, OracleError> {
        let structured = response_format.is_some();
        let request = self
            .build_request(system, user, response_format)
            .map_err(|e| OracleError::unavailable(format!("Invalid completion request: {e}")))?;

        debug!(
            model = %self.model,
            system_len = system.len(),
            user_len = user.len(),
            structured,
            "Sending chat completion request"
        );

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| OracleError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64
            })?
            .map_err(into_oracle_error)?;

        let message = response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| OracleError::malformed("Completion has no choices"))?;

        if let Some(refusal) = message.refusal.filter(|r| !r.trim().is_empty()) {
            return Err(OracleError::malformed(format!("Model refused: {refusal}")));
        }

        message
            .content
            .ok_or_else(|| OracleError::malformed("Completion has no content"))
    }
}

/// Unreadable replies are malformed; every other failure means the service
/// could not answer.
fn into_oracle_error(error: OpenAIError) -> OracleError {
    match error {
        OpenAIError::JSONDeserialize(..) => {
            OracleError::malformed(format!("Unreadable completion body: {error}"))
        }
        OpenAIError::ApiError(api) => OracleError::unavailable(format!("API error: {api}")),
        other => OracleError::unavailable(format!("Request failed: {other}"))
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete_chat(&self, system: &str, user: &str) -> Result<String, OracleError> {
        let key = cache_key("chat", system, user, "");
        if let Some(hit) = self.cached(&key).await {
            return Ok(hit);
        }

        let content = self.send(system, user, None).await?;
        self.remember(key, &content).await;
        Ok(content)
    }

    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
        schema: &OutputSchema
    ) -> Result<serde_json::Value, OracleError> {
        let key = cache_key("structured", system, user, &schema.name);
        let content = match self.cached(&key).await {
            Some(hit) => hit,
            None => {
                self.send(system, user, Some(json_schema_format(schema)))
                    .await?
            }
        };

        let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            OracleError::malformed(format!("Structured completion is not JSON: {e}"))
        })?;

        self.remember(key, &content).await;
        Ok(value)
    }
}

fn json_schema_format(schema: &OutputSchema) -> ResponseFormat {
    ResponseFormat::JsonSchema {
        json_schema: ResponseFormatJsonSchema {
            name: schema.name.clone(),
            description: Some(schema.description.clone()),
            schema: Some(schema.schema.clone()),
            strict: Some(schema.strict)
        }
    }
}

fn cache_key(kind: &str, system: &str, user: &str, schema_name: &str) -> String {
    format!("{kind}\u{1f}{schema_name}\u{1f}{system}\u{1f}{user}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_requires_api_key() {
        let config = OracleConfig::default();
        let err = OpenAiOracle::from_config(&config).err().unwrap();
        assert!(err.is_unavailable());
    }

    #[test]
    fn test_from_config_applies_settings() {
        let config = OracleConfig {
            api_key: Some("sk-test".to_string()),
            model: "gpt-4o-mini".to_string(),
            temperature: Some(0.3),
            cache_capacity: 4,
            ..OracleConfig::default()
        };
        let oracle = OpenAiOracle::from_config(&config).unwrap();
        assert_eq!(oracle.model(), "gpt-4o-mini");
        assert_eq!(oracle.temperature, Some(0.3));
        assert!(oracle.cache.is_some());
        assert_eq!(oracle.timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_request_carries_schema_and_temperature() {
        let oracle = OpenAiOracle::new(
            "http://localhost:9000/v1/",
            "sk-test",
            "gpt-4o",
            Duration::from_secs(5)
        )
        .with_temperature(0.5);
        let schema = OutputSchema {
            name: "explanation_tree".to_string(),
            description: "tree".to_string(),
            schema: serde_json::json!({ "type": "object" }),
            strict: true
        };

        let request = oracle
            .build_request("system", "user", Some(json_schema_format(&schema)))
            .unwrap();
        let value = serde_json::to_value(&request).unwrap();

        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["temperature"], 0.5);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "user");
        assert_eq!(value["response_format"]["type"], "json_schema");
        assert_eq!(value["response_format"]["json_schema"]["name"], "explanation_tree");
        assert_eq!(value["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn test_cache_key_separates_kinds() {
        assert_ne!(
            cache_key("chat", "s", "u", ""),
            cache_key("structured", "s", "u", "")
        );
    }
}

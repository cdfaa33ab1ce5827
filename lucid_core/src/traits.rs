//! Seams between the synthesis core and the services it drives.

use async_trait::async_trait;
use errors::OracleError;
use serde::{Deserialize, Serialize};

/// JSON schema a structured completion must conform to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSchema {
    pub name: String,
    pub description: String,
    pub schema: serde_json::Value,
    pub strict: bool
}

/// External text-generation service.
///
/// Implementations are handed to the orchestrator explicitly; there is no
/// process-wide client. Implementations must not retry on their own.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Free-text completion for a system/user prompt pair.
    async fn complete_chat(&self, system: &str, user: &str) -> Result<String, OracleError>;

    /// Completion constrained to `schema`, returned as parsed JSON.
    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
        schema: &OutputSchema
    ) -> Result<serde_json::Value, OracleError>;
}

#[async_trait]
impl<T: Oracle + ?Sized> Oracle for std::sync::Arc<T> {
    async fn complete_chat(&self, system: &str, user: &str) -> Result<String, OracleError> {
        (**self).complete_chat(system, user).await
    }

    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
        schema: &OutputSchema
    ) -> Result<serde_json::Value, OracleError> {
        (**self).complete_structured(system, user, schema).await
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use errors::OracleError;
use lucid_core::{Oracle, OutputSchema};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::prompts::Prompt;
use crate::telemetry::ExplainTelemetry;

/// Every oracle call a strategy makes goes through here: it waits for a
/// permit, bounds the call with a timeout and counts it.
pub struct CallGuard {
    oracle: Arc<dyn Oracle>,
    permits: Arc<Semaphore>,
    timeout: Duration,
    calls: AtomicUsize,
    telemetry: ExplainTelemetry
}

impl CallGuard {
    pub fn new(oracle: Arc<dyn Oracle>, permits: Arc<Semaphore>, timeout: Duration) -> Self {
        Self {
            oracle,
            permits,
            timeout,
            calls: AtomicUsize::new(0),
            telemetry: ExplainTelemetry
        }
    }

    /// Guard with its own limiter of `max_concurrency` permits.
    pub fn standalone(oracle: Arc<dyn Oracle>, max_concurrency: usize, timeout: Duration) -> Self {
        Self::new(
            oracle,
            Arc::new(Semaphore::new(max_concurrency.max(1))),
            timeout
        )
    }

    /// Oracle calls issued so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn chat(&self, prompt: &Prompt) -> Result<String, OracleError> {
        let _permit = self.acquire().await?;
        self.count("chat", prompt);
        self.bounded(self.oracle.complete_chat(&prompt.system, &prompt.user))
            .await
    }

    pub async fn structured(
        &self,
        prompt: &Prompt,
        schema: &OutputSchema
    ) -> Result<serde_json::Value, OracleError> {
        let _permit = self.acquire().await?;
        self.count("structured", prompt);
        self.bounded(
            self.oracle
                .complete_structured(&prompt.system, &prompt.user, schema)
        )
        .await
    }

    async fn acquire(&self) -> Result<tokio::sync::SemaphorePermit<'_>, OracleError> {
        self.permits
            .acquire()
            .await
            .map_err(|_| OracleError::unavailable("oracle call limiter closed"))
    }

    fn count(&self, kind: &'static str, prompt: &Prompt) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.telemetry.record_oracle_call(kind);
        debug!(
            kind,
            system_len = prompt.system.len(),
            user_len = prompt.user.len(),
            "Issuing oracle call"
        );
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, OracleError>>
    ) -> Result<T, OracleError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| OracleError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testing::ScriptedOracle;

    fn prompt(user: &str) -> Prompt {
        Prompt {
            system: "system".to_string(),
            user: user.to_string()
        }
    }

    #[tokio::test]
    async fn test_counts_every_call() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_default_text("ok")
                .fail_on("boom", OracleError::unavailable("down"))
        );
        let guard = CallGuard::standalone(oracle, 1, Duration::from_secs(1));

        assert_eq!(guard.chat(&prompt("a")).await.unwrap(), "ok");
        assert!(guard.chat(&prompt("boom")).await.is_err());
        assert_eq!(guard.calls(), 2);
    }

    #[tokio::test]
    async fn test_slow_call_times_out() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_default_text("late")
                .with_delay(Duration::from_millis(500))
        );
        let guard = CallGuard::standalone(oracle, 1, Duration::from_millis(20));

        let err = guard.chat(&prompt("a")).await.unwrap_err();
        assert_eq!(err, OracleError::Timeout { timeout_ms: 20 });
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_permits_cap_in_flight_calls() {
        let oracle = Arc::new(
            ScriptedOracle::new()
                .with_default_text("ok")
                .with_delay(Duration::from_millis(20))
        );
        let guard = CallGuard::standalone(oracle.clone(), 2, Duration::from_secs(1));

        let prompts: Vec<Prompt> = (0..6).map(|i| prompt(&format!("p{i}"))).collect();
        let results =
            futures_util::future::join_all(prompts.iter().map(|p| guard.chat(p))).await;

        assert!(results.iter().all(Result::is_ok));
        assert_eq!(oracle.peak_in_flight(), 2);
        assert_eq!(guard.calls(), 6);
    }
}

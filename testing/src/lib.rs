//! Shared test doubles for the Lucid workspace.
//!
//! [`ScriptedOracle`] stands in for the text-generation service: it answers
//! by prompt-substring rules, records every call it receives, and can inject
//! failures and latency. Canned documents and trees live in [`fixtures`].

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use errors::OracleError;
use lucid_core::{Oracle, OutputSchema};
use parking_lot::Mutex;

pub use fixtures::*;

/// Which oracle operation was invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Chat,
    Structured
}

/// One call observed by a [`ScriptedOracle`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub kind: CallKind,
    pub system: String,
    pub user: String,
    pub schema_name: Option<String>
}

impl RecordedCall {
    pub fn mentions(&self, needle: &str) -> bool {
        self.system.contains(needle) || self.user.contains(needle)
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Json(serde_json::Value),
    Fail(OracleError)
}

#[derive(Debug, Clone)]
struct Rule {
    kind: Option<CallKind>,
    needle: String,
    reply: Reply,
    delay: Option<Duration>
}

impl Rule {
    fn matches(&self, kind: CallKind, system: &str, user: &str) -> bool {
        self.kind.is_none_or(|k| k == kind)
            && (system.contains(&self.needle) || user.contains(&self.needle))
    }
}

/// Deterministic fake oracle.
///
/// Rules are checked in insertion order against the system and user prompt;
/// the first match answers. Unmatched chat calls get the default text,
/// unmatched structured calls the default JSON, and otherwise fail as
/// malformed.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    rules: Vec<Rule>,
    default_text: Option<String>,
    default_json: Option<serde_json::Value>,
    delay: Option<Duration>,
    calls: Mutex<Vec<RecordedCall>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers chat calls whose prompts contain `needle`.
    pub fn on_chat(mut self, needle: &str, text: &str) -> Self {
        self.rules.push(Rule {
            kind: Some(CallKind::Chat),
            needle: needle.to_string(),
            reply: Reply::Text(text.to_string()),
            delay: None
        });
        self
    }

    /// Like [`Self::on_chat`] but sleeps before answering.
    pub fn on_chat_after(mut self, needle: &str, text: &str, delay: Duration) -> Self {
        self.rules.push(Rule {
            kind: Some(CallKind::Chat),
            needle: needle.to_string(),
            reply: Reply::Text(text.to_string()),
            delay: Some(delay)
        });
        self
    }

    pub fn on_structured(mut self, needle: &str, value: serde_json::Value) -> Self {
        self.rules.push(Rule {
            kind: Some(CallKind::Structured),
            needle: needle.to_string(),
            reply: Reply::Json(value),
            delay: None
        });
        self
    }

    /// Fails any call whose prompts contain `needle`.
    pub fn fail_on(mut self, needle: &str, error: OracleError) -> Self {
        self.rules.push(Rule {
            kind: None,
            needle: needle.to_string(),
            reply: Reply::Fail(error),
            delay: None
        });
        self
    }

    pub fn with_default_text(mut self, text: &str) -> Self {
        self.default_text = Some(text.to_string());
        self
    }

    pub fn with_default_json(mut self, value: serde_json::Value) -> Self {
        self.default_json = Some(value);
        self
    }

    /// Latency applied to every call without its own delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn count_of(&self, kind: CallKind) -> usize {
        self.calls.lock().iter().filter(|c| c.kind == kind).count()
    }

    /// Highest number of calls that were awaiting a reply at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    async fn answer(
        &self,
        kind: CallKind,
        system: &str,
        user: &str,
        schema_name: Option<&str>
    ) -> Reply {
        self.calls.lock().push(RecordedCall {
            kind,
            system: system.to_string(),
            user: user.to_string(),
            schema_name: schema_name.map(str::to_string)
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        let rule = self.rules.iter().find(|r| r.matches(kind, system, user));
        if let Some(delay) = rule.and_then(|r| r.delay).or(self.delay) {
            tokio::time::sleep(delay).await;
        }

        let reply = match (rule, kind) {
            (Some(rule), _) => rule.reply.clone(),
            (None, CallKind::Chat) => self
                .default_text
                .clone()
                .map(Reply::Text)
                .unwrap_or_else(|| Reply::Fail(OracleError::malformed("no scripted chat reply"))),
            (None, CallKind::Structured) => self
                .default_json
                .clone()
                .map(Reply::Json)
                .unwrap_or_else(|| {
                    Reply::Fail(OracleError::malformed("no scripted structured reply"))
                })
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(?kind, "scripted oracle answered");
        reply
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete_chat(&self, system: &str, user: &str) -> Result<String, OracleError> {
        match self.answer(CallKind::Chat, system, user, None).await {
            Reply::Text(text) => Ok(text),
            Reply::Json(value) => Ok(value.to_string()),
            Reply::Fail(err) => Err(err)
        }
    }

    async fn complete_structured(
        &self,
        system: &str,
        user: &str,
        schema: &OutputSchema
    ) -> Result<serde_json::Value, OracleError> {
        match self
            .answer(CallKind::Structured, system, user, Some(&schema.name))
            .await
        {
            Reply::Json(value) => Ok(value),
            Reply::Text(text) => serde_json::from_str(&text)
                .map_err(|e| OracleError::malformed(format!("scripted text is not JSON: {e}"))),
            Reply::Fail(err) => Err(err)
        }
    }
}

//! JSON request/response boundary around the orchestrator.
//!
//! Request: `{"text": "...", "level": "High School", "leveled": true,
//! "strategy": "chained"}`; only `text` is required and unknown fields
//! (such as `generate_images`) are ignored.
//! Response: `{"explanations": <tree>}` with status 200, or
//! `{"error": "...", "kind": "..."}` with 400/500.

use lucid_core::{ReadingLevel, StrategyKind};
use serde::Deserialize;
use serde_json::{Value, json};
use synthesis::{ExplainOptions, Orchestrator};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct HandlerResponse {
    pub status: u16,
    pub body: Value
}

impl HandlerResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: 400,
            body: json!({ "error": message.into(), "kind": "invalid_input" })
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

#[derive(Debug, Deserialize)]
struct ExplainRequest {
    text: Option<String>,
    level: Option<String>,
    leveled: Option<bool>,
    strategy: Option<String>
}

/// Parses `body`, runs the explanation and maps the outcome to a status
/// and JSON body. `defaults` fills in whatever the request leaves out.
pub async fn handle_request(
    orchestrator: &Orchestrator,
    defaults: &ExplainOptions,
    body: &str
) -> HandlerResponse {
    let request: ExplainRequest = match serde_json::from_str(body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Rejecting unparsable request body");
            return HandlerResponse::bad_request(format!("Invalid request body: {e}"));
        }
    };

    let Some(text) = request.text.filter(|t| !t.trim().is_empty()) else {
        return HandlerResponse::bad_request("Text field is required");
    };

    let options = match resolve_options(defaults, request.level, request.leveled, request.strategy)
    {
        Ok(options) => options,
        Err(message) => return HandlerResponse::bad_request(message)
    };

    info!(
        strategy = %options.strategy,
        leveled = options.leveled,
        reading_level = %options.reading_level,
        "Handling explain request"
    );

    match orchestrator.explain(&text, &options).await {
        Ok(tree) => HandlerResponse::ok(json!({ "explanations": tree })),
        Err(err) => {
            let kind = err.kind();
            HandlerResponse {
                status: kind.status_code(),
                body: json!({ "error": err.to_string(), "kind": kind.as_str() })
            }
        }
    }
}

// A level on its own asks for a leveled explanation.
fn resolve_options(
    defaults: &ExplainOptions,
    level: Option<String>,
    leveled: Option<bool>,
    strategy: Option<String>
) -> Result<ExplainOptions, String> {
    let mut options = *defaults;

    if let Some(level) = level {
        options.reading_level = ReadingLevel::parse(&level).map_err(|e| e.to_string())?;
        options.leveled = true;
    }
    if let Some(leveled) = leveled {
        options.leveled = leveled;
    }
    if let Some(strategy) = strategy {
        options.strategy = strategy
            .trim()
            .parse::<StrategyKind>()
            .map_err(|_| format!("Unknown strategy: '{strategy}'"))?;
    }

    Ok(options)
}

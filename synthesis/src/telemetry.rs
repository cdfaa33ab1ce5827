use std::time::Duration;

use errors::ErrorKind;
use lucid_core::StrategyKind;
use metrics::{counter, histogram};

/// Metrics sink for explanation runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExplainTelemetry;

impl ExplainTelemetry {
    pub fn record_explain(
        &self,
        strategy: StrategyKind,
        outcome: Result<(), ErrorKind>,
        elapsed: Duration
    ) {
        let status = match outcome {
            Ok(()) => "success",
            Err(kind) => kind.as_str()
        };
        counter!(
            "lucid_explain_total",
            "strategy" => strategy.to_string(),
            "status" => status
        )
        .increment(1);
        histogram!("lucid_explain_latency_ms", "strategy" => strategy.to_string())
            .record(elapsed.as_secs_f64() * 1000.0);
    }

    pub fn record_oracle_call(&self, kind: &'static str) {
        counter!("lucid_oracle_calls_total", "kind" => kind).increment(1);
    }

    pub fn record_topic_dropped(&self) {
        counter!("lucid_topics_dropped_total").increment(1);
    }
}

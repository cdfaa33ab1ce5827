use std::sync::Arc;
use std::time::{Duration, Instant};

use config::{OracleConfig, SynthesisConfig};
use errors::ExplainError;
use lucid_core::{
    EmptyTopicPolicy, ExplanationMode, ExplanationTree, Oracle, ReadingLevel, StrategyKind
};
use tokio::sync::Semaphore;
use tracing::{Instrument, info, info_span, warn};

use crate::guard::CallGuard;
use crate::strategy::{ChainedStrategy, StructuredStrategy, SynthesisOptions, SynthesisStrategy};
use crate::telemetry::ExplainTelemetry;

pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// What to build for one `explain` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExplainOptions {
    pub strategy: StrategyKind,
    pub leveled: bool,
    pub reading_level: ReadingLevel
}

impl ExplainOptions {
    pub fn mode(&self) -> ExplanationMode {
        ExplanationMode::from_flags(self.leveled, self.reading_level)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub max_concurrency: usize,
    pub call_timeout: Duration,
    pub empty_topic_policy: EmptyTopicPolicy
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            empty_topic_policy: EmptyTopicPolicy::Drop
        }
    }
}

/// Side-channel facts about a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplainReport {
    pub strategy: StrategyKind,
    pub oracle_calls: usize,
    pub elapsed: Duration
}

/// Entry point of the core: validates input, runs the selected strategy
/// and tags any failure with it.
pub struct Orchestrator {
    oracle: Arc<dyn Oracle>,
    permits: Arc<Semaphore>,
    settings: OrchestratorSettings,
    chained: ChainedStrategy,
    structured: StructuredStrategy,
    telemetry: ExplainTelemetry
}

impl Orchestrator {
    pub fn new(oracle: Arc<dyn Oracle>, settings: OrchestratorSettings) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_concurrency.max(1)));
        Self {
            oracle,
            permits,
            settings,
            chained: ChainedStrategy::new(),
            structured: StructuredStrategy::new(),
            telemetry: ExplainTelemetry
        }
    }

    pub fn from_config(
        oracle: Arc<dyn Oracle>,
        synthesis: &SynthesisConfig,
        oracle_config: &OracleConfig
    ) -> Self {
        Self::new(
            oracle,
            OrchestratorSettings {
                max_concurrency: synthesis.max_concurrency,
                call_timeout: Duration::from_secs(oracle_config.timeout_seconds),
                empty_topic_policy: synthesis.empty_topic_policy
            }
        )
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub async fn explain(
        &self,
        text: &str,
        options: &ExplainOptions
    ) -> Result<ExplanationTree, ExplainError> {
        self.explain_with_report(text, options)
            .await
            .map(|(tree, _)| tree)
    }

    pub async fn explain_with_report(
        &self,
        text: &str,
        options: &ExplainOptions
    ) -> Result<(ExplanationTree, ExplainReport), ExplainError> {
        let span = info_span!(
            "explain",
            strategy = %options.strategy,
            leveled = options.leveled,
            reading_level = %options.reading_level,
            text_length = text.len()
        );

        async move {
            let started = Instant::now();
            let result = self.run(text, options).await;
            let elapsed = started.elapsed();

            self.telemetry.record_explain(
                options.strategy,
                result.as_ref().map(|_| ()).map_err(ExplainError::kind),
                elapsed
            );

            match result {
                Ok((tree, oracle_calls)) => {
                    info!(
                        topics = tree.topics.len(),
                        concepts = tree.concept_count(),
                        oracle_calls,
                        elapsed_ms = elapsed.as_millis() as u64,
                        "Explanation complete"
                    );
                    let report = ExplainReport {
                        strategy: options.strategy,
                        oracle_calls,
                        elapsed
                    };
                    Ok((tree, report))
                }
                Err(err) => {
                    warn!(kind = %err.kind(), error = %err, "Explanation failed");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        text: &str,
        options: &ExplainOptions
    ) -> Result<(ExplanationTree, usize), ExplainError> {
        if text.trim().is_empty() {
            return Err(ExplainError::invalid_input("Text must not be empty"));
        }

        let strategy = self.strategy(options.strategy);
        let guard = CallGuard::new(
            self.oracle.clone(),
            self.permits.clone(),
            self.settings.call_timeout
        );
        let synthesis_options = SynthesisOptions {
            mode: options.mode(),
            empty_topic_policy: self.settings.empty_topic_policy,
            max_concurrency: self.settings.max_concurrency
        };

        let tree = strategy
            .synthesize(text, &guard, &synthesis_options)
            .await
            .map_err(|e| ExplainError::from_synthesis(strategy.kind().to_string(), e))?;

        Ok((tree, guard.calls()))
    }

    fn strategy(&self, kind: StrategyKind) -> &dyn SynthesisStrategy {
        match kind {
            StrategyKind::Chained => &self.chained,
            StrategyKind::Structured => &self.structured
        }
    }
}

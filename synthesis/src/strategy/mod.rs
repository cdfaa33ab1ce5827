//! The two interchangeable ways of building an explanation tree.

mod chained;
mod structured;

pub use chained::{ChainedStrategy, parse_layer_reply};
pub use structured::StructuredStrategy;

use async_trait::async_trait;
use errors::SynthesisError;
use lucid_core::{EmptyTopicPolicy, ExplanationMode, ExplanationTree, StrategyKind};

use crate::guard::CallGuard;

/// Per-run knobs a strategy needs beyond the text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisOptions {
    pub mode: ExplanationMode,
    pub empty_topic_policy: EmptyTopicPolicy,
    /// Sibling topics or concepts processed at once. The guard's permits
    /// still bound the oracle calls actually in flight.
    pub max_concurrency: usize
}

impl SynthesisOptions {
    pub fn new(mode: ExplanationMode) -> Self {
        Self {
            mode,
            empty_topic_policy: EmptyTopicPolicy::default(),
            max_concurrency: 1
        }
    }
}

#[async_trait]
pub trait SynthesisStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Builds a complete tree for `text`, issuing every oracle call
    /// through `guard`.
    async fn synthesize(
        &self,
        text: &str,
        guard: &CallGuard,
        options: &SynthesisOptions
    ) -> Result<ExplanationTree, SynthesisError>;
}

//! # Synthesis
//!
//! Turns a block of text into an [`ExplanationTree`](lucid_core::ExplanationTree).
//!
//! Two strategies sit behind [`SynthesisStrategy`]:
//! - [`ChainedStrategy`]: topics, then concepts, then layers, one oracle
//!   call per item
//! - [`StructuredStrategy`]: one schema-constrained call for the whole tree
//!
//! [`Orchestrator`] validates input, picks the strategy and tags failures.
//! Every oracle call passes through a [`CallGuard`] that applies the
//! concurrency cap and per-call timeout.

pub mod guard;
pub mod normalize;
pub mod orchestrator;
pub mod prompts;
pub mod schema;
pub mod strategy;
pub mod telemetry;

pub use guard::CallGuard;
pub use normalize::split_names;
pub use orchestrator::{
    DEFAULT_CALL_TIMEOUT, ExplainOptions, ExplainReport, Orchestrator, OrchestratorSettings
};
pub use prompts::{LayerDepth, Prompt, PromptBuilder};
pub use schema::{TREE_SCHEMA_NAME, tree_schema};
pub use strategy::{ChainedStrategy, StructuredStrategy, SynthesisOptions, SynthesisStrategy};
pub use telemetry::ExplainTelemetry;

//! # Lucid Core
//!
//! Shared types and traits for the Lucid explanation pipeline.
//!
//! This crate provides:
//! - The explanation tree (topics, concepts, What/Why/How layers)
//! - The reading-level catalogue injected into prompts
//! - Structural validation of finished trees
//! - The [`Oracle`] trait every text-generation backend implements

pub mod traits;
pub mod types;
mod wire;

pub use traits::{Oracle, OutputSchema};
pub use types::{
    Concept, EmptyTopicPolicy, ExplanationLayer, ExplanationMode, ExplanationTree,
    ParseReadingLevelError, ReadingLevel, StrategyKind, Topic, TreeRules, TreeViolation
};

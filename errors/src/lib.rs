//! # Lucid Errors
//!
//! Error taxonomy for the explanation pipeline.
//!
//! Three levels, innermost first:
//! - [`OracleError`]: what the text-generation service boundary reports
//! - [`SynthesisError`]: what a synthesis strategy reports
//! - [`ExplainError`]: the tagged failure the orchestrator hands to callers
//!
//! Only the entrypoint layer collapses these into a flat message; every
//! library crate keeps them distinct so callers can tell "nothing to
//! explain" from "service failure" from "bad output".

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures at the oracle (text-generation service) boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OracleError {
    #[error("Oracle unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Oracle call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Oracle returned a malformed response: {reason}")]
    MalformedResponse { reason: String }
}

impl OracleError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into()
        }
    }

    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            reason: reason.into()
        }
    }

    /// Timeouts count as unavailability.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout { .. })
    }
}

/// Decomposition stage that produced no usable items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecompositionStage {
    Topics,
    Concepts
}

impl std::fmt::Display for DecompositionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Topics => write!(f, "topics"),
            Self::Concepts => write!(f, "concepts")
        }
    }
}

/// Errors raised inside a synthesis strategy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SynthesisError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("No {stage} could be extracted from {scope}")]
    EmptyDecomposition {
        stage: DecompositionStage,
        scope: String
    }
}

impl SynthesisError {
    pub fn empty(stage: DecompositionStage, scope: impl Into<String>) -> Self {
        Self::EmptyDecomposition {
            stage,
            scope: scope.into()
        }
    }

    pub fn is_empty_decomposition(&self) -> bool {
        matches!(self, Self::EmptyDecomposition { .. })
    }
}

/// Coarse classification of an [`ExplainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    EmptyDecomposition,
    OracleUnavailable,
    OracleMalformedResponse
}

impl ErrorKind {
    /// Status code used by the request/response entrypoint.
    pub fn status_code(self) -> u16 {
        match self {
            Self::InvalidInput => 400,
            Self::EmptyDecomposition | Self::OracleUnavailable | Self::OracleMalformedResponse => {
                500
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::EmptyDecomposition => "empty_decomposition",
            Self::OracleUnavailable => "oracle_unavailable",
            Self::OracleMalformedResponse => "oracle_malformed_response"
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure returned by the orchestrator. Each variant names the strategy
/// that was running and keeps the original cause.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExplainError {
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("{strategy} strategy produced no {stage}: nothing usable in {scope}")]
    EmptyDecomposition {
        strategy: String,
        stage: DecompositionStage,
        scope: String
    },

    #[error("{strategy} strategy failed: {source}")]
    OracleUnavailable {
        strategy: String,
        #[source]
        source: OracleError
    },

    #[error("{strategy} strategy failed: {source}")]
    OracleMalformedResponse {
        strategy: String,
        #[source]
        source: OracleError
    }
}

impl ExplainError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into()
        }
    }

    /// Tags a strategy failure with the strategy that produced it.
    pub fn from_synthesis(strategy: impl Into<String>, error: SynthesisError) -> Self {
        let strategy = strategy.into();
        match error {
            SynthesisError::EmptyDecomposition { stage, scope } => Self::EmptyDecomposition {
                strategy,
                stage,
                scope
            },
            SynthesisError::Oracle(source) if source.is_unavailable() => {
                Self::OracleUnavailable { strategy, source }
            }
            SynthesisError::Oracle(source) => Self::OracleMalformedResponse { strategy, source }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::EmptyDecomposition { .. } => ErrorKind::EmptyDecomposition,
            Self::OracleUnavailable { .. } => ErrorKind::OracleUnavailable,
            Self::OracleMalformedResponse { .. } => ErrorKind::OracleMalformedResponse
        }
    }

    pub fn oracle_cause(&self) -> Option<&OracleError> {
        match self {
            Self::OracleUnavailable { source, .. } | Self::OracleMalformedResponse { source, .. } => {
                Some(source)
            }
            _ => None
        }
    }
}

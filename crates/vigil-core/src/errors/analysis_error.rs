//! Aggregation and derivation errors.

use super::error_code::{self, VigilErrorCode};

/// Errors raised by the aggregation engine.
///
/// `InvariantViolated` marks a programmer error: two aggregates that must share
/// an identity key were merged anyway. It is never recovered from.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("invariant violated in {context}: expected key {expected:?}, got {actual:?}")]
    InvariantViolated {
        context: &'static str,
        expected: String,
        actual: String,
    },

    #[error("invalid matcher {name:?}: {reason}")]
    InvalidMatcher { name: String, reason: String },

    #[error("matcher {name:?} is already registered")]
    DuplicateMatcher { name: String },

    #[error("no pathological event matcher registered with name {name:?}")]
    UnknownMatcher { name: String },
}

impl VigilErrorCode for AnalysisError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvariantViolated { .. } => error_code::INVARIANT_VIOLATED,
            _ => error_code::ANALYSIS_ERROR,
        }
    }
}

//! Interval model errors.

use super::error_code::{self, VigilErrorCode};

/// Errors produced while building or decoding intervals and locators.
#[derive(Debug, thiserror::Error)]
pub enum IntervalError {
    #[error("malformed locator token {token:?} in {locator:?}")]
    MalformedLocator { locator: String, token: String },

    #[error("duplicate locator key {key:?} in {locator:?}")]
    DuplicateLocatorKey { locator: String, key: String },

    #[error("unknown interval id {id}")]
    UnknownIntervalId { id: usize },
}

impl VigilErrorCode for IntervalError {
    fn error_code(&self) -> &'static str {
        error_code::INTERVAL_ERROR
    }
}

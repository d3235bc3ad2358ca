//! Errors returned from monitor-test lifecycle stages.

use super::error_code::{self, VigilErrorCode};
use super::{AnalysisError, IntervalError, StorageError};

/// Errors a monitor test may return from any lifecycle stage.
///
/// `NotSupported` is a sentinel rather than a failure: the plugin's
/// preconditions are not met and it contributes nothing to the run.
#[derive(Debug, thiserror::Error)]
pub enum MonitorTestError {
    #[error("not supported: {reason}")]
    NotSupported { reason: String },

    #[error("collection failed: {reason}")]
    Collection { reason: String },

    #[error("Interval error: {0}")]
    Interval(#[from] IntervalError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("cancelled")]
    Cancelled,
}

impl MonitorTestError {
    pub fn not_supported(reason: impl Into<String>) -> Self {
        Self::NotSupported {
            reason: reason.into(),
        }
    }

    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }
}

impl VigilErrorCode for MonitorTestError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotSupported { .. } => error_code::NOT_SUPPORTED,
            Self::Collection { .. } => error_code::COLLECTION_ERROR,
            Self::Interval(e) => e.error_code(),
            Self::Analysis(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

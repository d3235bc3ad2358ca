//! Framework errors and non-fatal error collection.

use super::error_code::{self, VigilErrorCode};
use super::{AnalysisError, ConfigError, IntervalError, MonitorTestError, StorageError};

/// Errors that can occur while composing or running the monitor framework.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("monitor test {name:?} is already registered")]
    DuplicateMonitorTest { name: String },

    #[error("monitor test {name} failed during {stage}: {source}")]
    Stage {
        name: String,
        stage: &'static str,
        #[source]
        source: MonitorTestError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Interval error: {0}")]
    Interval(#[from] IntervalError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Run cancelled")]
    Cancelled,
}

impl VigilErrorCode for FrameworkError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateMonitorTest { .. } => error_code::DUPLICATE_MONITOR_TEST,
            Self::Stage { source, .. } => source.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Interval(e) => e.error_code(),
            Self::Analysis(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Cancelled => error_code::CANCELLED,
        }
    }
}

/// Result of a run that accumulates non-fatal errors.
/// One failing monitor test never hides the results of the others.
#[derive(Debug, Default)]
pub struct RunReport<T: Default = ()> {
    /// The successful result data.
    pub data: T,
    /// Non-fatal errors collected during the run.
    pub errors: Vec<FrameworkError>,
}

impl<T: Default> RunReport<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            errors: Vec::new(),
        }
    }

    /// Add a non-fatal error to the report.
    pub fn add_error(&mut self, error: FrameworkError) {
        self.errors.push(error);
    }

    /// Returns true if there are no non-fatal errors.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }
}

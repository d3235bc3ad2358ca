//! Error handling for Vigil.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod analysis_error;
pub mod config_error;
pub mod error_code;
pub mod framework_error;
pub mod interval_error;
pub mod monitor_test_error;
pub mod storage_error;

pub use analysis_error::AnalysisError;
pub use config_error::ConfigError;
pub use error_code::VigilErrorCode;
pub use framework_error::{FrameworkError, RunReport};
pub use interval_error::IntervalError;
pub use monitor_test_error::MonitorTestError;
pub use storage_error::StorageError;

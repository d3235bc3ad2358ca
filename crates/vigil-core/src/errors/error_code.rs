//! Stable error codes surfaced in JUnit output and structured logs.

/// Every subsystem error maps to a stable, machine-readable code.
pub trait VigilErrorCode {
    fn error_code(&self) -> &'static str;
}

pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const INTERVAL_ERROR: &str = "INTERVAL_ERROR";
pub const INVARIANT_VIOLATED: &str = "INVARIANT_VIOLATED";
pub const ANALYSIS_ERROR: &str = "ANALYSIS_ERROR";
pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
pub const UPLOAD_ERROR: &str = "UPLOAD_ERROR";
pub const NOT_SUPPORTED: &str = "NOT_SUPPORTED";
pub const COLLECTION_ERROR: &str = "COLLECTION_ERROR";
pub const MONITOR_TEST_ERROR: &str = "MONITOR_TEST_ERROR";
pub const DUPLICATE_MONITOR_TEST: &str = "DUPLICATE_MONITOR_TEST";
pub const CANCELLED: &str = "CANCELLED";

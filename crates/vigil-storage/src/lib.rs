//! # vigil-storage
//!
//! Everything a run leaves behind: JSON interval and summary artifacts, the
//! JUnit XML report, and the best-effort push of intervals to a Loki-compatible
//! log store.
//!
//! Artifact file names carry the run's time suffix so several runs can share
//! one storage directory.

pub mod artifacts;
pub mod junit;
pub mod loki;

pub use artifacts::{
    read_event_intervals, write_audit_summaries, write_backend_disruption,
    write_event_intervals, EventIntervalList,
};
pub use junit::{render_junit, write_junit};
pub use loki::{HttpTransport, LokiTransport, LokiUploader, UploadReport, UploadSettings};

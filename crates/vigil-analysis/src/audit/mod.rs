//! Audit log request-count summaries.

pub mod event;
pub mod reader;
pub mod summary;

pub use event::AuditEvent;
pub use reader::{audit_log_files, summarize_audit_log_file};
pub use summary::{
    AuditLogSummary, PerResourceRequestCount, PerUserRequestCount, RequestCounts,
    ResourceTotals, UserTotals,
};

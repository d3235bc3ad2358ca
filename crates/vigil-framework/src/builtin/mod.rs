//! Monitor tests shipped with the framework.

mod audit_log;
mod disruption_summary;
mod graceful_restart;
mod interval_serializer;
mod loki;
mod pathological;

pub use audit_log::AuditLogMonitorTest;
pub use disruption_summary::DisruptionSummaryMonitorTest;
pub use graceful_restart::{GracefulRestartMonitorTest, GRACEFUL_TERMINATION_TEST};
pub use interval_serializer::IntervalSerializerMonitorTest;
pub use loki::LokiMonitorTest;
pub use pathological::{
    PathologicalMonitorTest, E2E_NAMESPACE_REPEATED_EVENTS_TEST, REPEATED_EVENTS_TEST,
};

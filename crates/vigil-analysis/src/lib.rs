//! # vigil-analysis
//!
//! Pure in-memory transforms over a frozen, sorted interval snapshot:
//! graceful-shutdown window pairing, per-backend disruption aggregation,
//! pathological-event backfill and evaluation, and audit log summaries.
//!
//! Nothing here blocks on the network. Every operation returns new values
//! and leaves its input untouched.

pub mod audit;
pub mod disruption;
pub mod graceful_shutdown;
pub mod pathological;

pub use disruption::{compute_disruption_data, BackendDisruption, BackendDisruptionList};
pub use graceful_shutdown::construct_graceful_shutdown_windows;
pub use pathological::{
    apply_pathological_backfill, backfill_pathological, evaluate_repeated_events,
    AllowedPathologicalEventRegistry, EventMatcher, PathologicalEventKey,
};

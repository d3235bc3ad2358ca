//! Per-backend disruption aggregation.

pub mod duration_nanos;
pub mod summary;

pub use summary::{compute_disruption_data, BackendDisruption, BackendDisruptionList};

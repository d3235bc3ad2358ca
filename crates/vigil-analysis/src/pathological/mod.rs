//! Pathological (too-frequently repeated) events.

pub mod backfill;
pub mod matchers;
pub mod registry;
pub mod repeated;

pub use backfill::{apply_pathological_backfill, backfill_pathological, PathologicalEventKey};
pub use matchers::{EventMatcher, OverlapOtherIntervalsMatcher, SimplePathologicalEventMatcher};
pub use registry::AllowedPathologicalEventRegistry;
pub use repeated::{evaluate_repeated_events, RepeatedEventEvaluation};

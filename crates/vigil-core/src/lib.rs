//! # vigil-core
//!
//! Foundation crate for the Vigil monitor framework.
//! Defines the interval model, locator and message encodings, the shared
//! recorder, the JUnit result model, errors, config, and tracing setup.
//! Every other crate in the workspace depends on this.

pub mod cluster;
pub mod config;
pub mod constants;
pub mod errors;
pub mod interval;
pub mod junit;
pub mod recorder;
pub mod tracing_setup;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use cluster::{ClusterStability, TopologyMode};
pub use config::{ConfigOverrides, VigilConfig};
pub use errors::{FrameworkError, VigilErrorCode};
pub use interval::{
    Interval, IntervalBuilder, IntervalReason, IntervalSource, Intervals, Level, Locator,
    LocatorBuilder, LocatorType, Message, MessageBuilder,
};
pub use junit::{FailureOutput, JUnitTestCase, JUnitTestSuite};
pub use recorder::{IntervalId, Recorder};
pub use traits::cancellation::{Cancellable, CancellationToken};

//! # vigil-framework
//!
//! Hosts monitor tests: pluggable observers that collect intervals during a
//! run, derive computed intervals, evaluate them into JUnit results, and write
//! artifacts. The [`MonitorTestRunner`] drives every registered test through
//! the same stages in order.

pub mod builtin;
pub mod monitor_test;
pub mod profiles;
pub mod registry;
pub mod runner;

pub use monitor_test::{CollectedData, MonitorContext, MonitorTest, PluginState, Stage};
pub use profiles::{default_monitor_tests, MonitorTestInitializationInfo};
pub use registry::{MonitorTestRegistry, RegisteredMonitorTest};
pub use runner::{MonitorTestRunner, RunOutcome};

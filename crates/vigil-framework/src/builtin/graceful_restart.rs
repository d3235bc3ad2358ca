use chrono::{DateTime, Utc};

use vigil_analysis::construct_graceful_shutdown_windows;
use vigil_core::errors::MonitorTestError;
use vigil_core::interval::{IntervalReason, Intervals};
use vigil_core::junit::JUnitTestCase;

use crate::monitor_test::{MonitorContext, MonitorTest};

pub const GRACEFUL_TERMINATION_TEST: &str =
    "[sig-api-machinery] kube-apiserver should terminate within its graceful termination period";

/// Pairs apiserver shutdown events into windows and fails when a server
/// reported running out of its termination grace period.
#[derive(Debug, Default)]
pub struct GracefulRestartMonitorTest;

impl GracefulRestartMonitorTest {
    pub fn new() -> Self {
        Self
    }
}

impl MonitorTest for GracefulRestartMonitorTest {
    fn construct_computed_intervals(
        &mut self,
        _ctx: &MonitorContext,
        starting: &Intervals,
        beginning: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Intervals, MonitorTestError> {
        Ok(construct_graceful_shutdown_windows(beginning, starting))
    }

    fn evaluate_tests_from_constructed_intervals(
        &mut self,
        _ctx: &MonitorContext,
        final_intervals: &Intervals,
    ) -> Result<Vec<JUnitTestCase>, MonitorTestError> {
        let timeouts: Vec<String> = final_intervals
            .iter()
            .filter(|i| i.message.reason == IntervalReason::GRACEFUL_TERMINATION_TIMEOUT)
            .map(|i| i.legacy_string())
            .collect();
        let incomplete = final_intervals
            .iter()
            .filter(|i| i.message.reason == IntervalReason::INCOMPLETE_GRACEFUL_SHUTDOWN_WINDOW)
            .count();

        let case = if timeouts.is_empty() {
            JUnitTestCase::pass(GRACEFUL_TERMINATION_TEST)
        } else {
            JUnitTestCase::fail(
                GRACEFUL_TERMINATION_TEST,
                format!(
                    "{} kube-apiserver termination timeouts observed:\n\n{}",
                    timeouts.len(),
                    timeouts.join("\n")
                ),
            )
        };
        if incomplete > 0 {
            return Ok(vec![case.with_system_out(format!(
                "{incomplete} graceful shutdown windows did not finish before the end of collection"
            ))]);
        }
        Ok(vec![case])
    }
}

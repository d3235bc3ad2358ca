use std::path::Path;

use vigil_core::errors::MonitorTestError;
use vigil_core::interval::Intervals;
use vigil_core::junit::JUnitTestCase;
use vigil_storage::write_event_intervals;

use crate::monitor_test::{MonitorContext, MonitorTest};

/// Writes the final interval set as `e2e-events<suffix>.json`.
#[derive(Debug, Default)]
pub struct IntervalSerializerMonitorTest;

impl IntervalSerializerMonitorTest {
    pub fn new() -> Self {
        Self
    }
}

impl MonitorTest for IntervalSerializerMonitorTest {
    fn write_content_to_storage(
        &mut self,
        _ctx: &MonitorContext,
        storage_dir: &Path,
        time_suffix: &str,
        final_intervals: &Intervals,
        _junits: &[JUnitTestCase],
    ) -> Result<(), MonitorTestError> {
        write_event_intervals(storage_dir, time_suffix, final_intervals)?;
        Ok(())
    }
}

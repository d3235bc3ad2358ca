use std::path::Path;

use vigil_analysis::{compute_disruption_data, BackendDisruption, BackendDisruptionList};
use vigil_core::config::DisruptionConfig;
use vigil_core::errors::MonitorTestError;
use vigil_core::interval::Intervals;
use vigil_core::junit::JUnitTestCase;
use vigil_storage::write_backend_disruption;

use crate::monitor_test::{MonitorContext, MonitorTest};

/// Aggregates per-backend disruption and writes `backend-disruption<suffix>.json`.
///
/// On a stable cluster every backend is held to its allowed disruption. The
/// record-only variant, used while the cluster is deliberately disrupted,
/// writes the artifact without judging it.
#[derive(Debug)]
pub struct DisruptionSummaryMonitorTest {
    config: DisruptionConfig,
    record_only: bool,
    summary: Option<BackendDisruptionList>,
}

impl DisruptionSummaryMonitorTest {
    pub fn new(config: DisruptionConfig) -> Self {
        Self {
            config,
            record_only: false,
            summary: None,
        }
    }

    pub fn record_only(config: DisruptionConfig) -> Self {
        Self {
            record_only: true,
            ..Self::new(config)
        }
    }

    pub fn is_record_only(&self) -> bool {
        self.record_only
    }

    fn judge(&self, backend: &BackendDisruption) -> JUnitTestCase {
        let name = format!(
            "[sig-network] disruption/{} connection/{} should be available throughout the test",
            backend.backend_name, backend.connection_type
        );
        let allowed = self.config.allowed_for(&backend.name);
        if backend.disrupted_duration <= allowed {
            return JUnitTestCase::pass(name);
        }
        JUnitTestCase::fail(
            name,
            format!(
                "{} was unreachable for {:?}, more than the allowed {:?}:\n\n{}",
                backend.name,
                backend.disrupted_duration,
                allowed,
                backend.disruption_messages.join("\n")
            ),
        )
    }
}

impl MonitorTest for DisruptionSummaryMonitorTest {
    fn evaluate_tests_from_constructed_intervals(
        &mut self,
        _ctx: &MonitorContext,
        final_intervals: &Intervals,
    ) -> Result<Vec<JUnitTestCase>, MonitorTestError> {
        let summary = compute_disruption_data(final_intervals)?;
        let cases = if self.record_only {
            Vec::new()
        } else {
            summary.iter().map(|backend| self.judge(backend)).collect()
        };
        self.summary = Some(summary);
        Ok(cases)
    }

    fn write_content_to_storage(
        &mut self,
        _ctx: &MonitorContext,
        storage_dir: &Path,
        time_suffix: &str,
        _final_intervals: &Intervals,
        _junits: &[JUnitTestCase],
    ) -> Result<(), MonitorTestError> {
        // Nothing to write when evaluation failed.
        if let Some(summary) = &self.summary {
            write_backend_disruption(storage_dir, time_suffix, summary)?;
        }
        Ok(())
    }
}

use std::path::Path;
use std::time::Duration;

use vigil_core::config::LokiConfig;
use vigil_core::errors::MonitorTestError;
use vigil_core::interval::Intervals;
use vigil_core::junit::JUnitTestCase;
use vigil_storage::{HttpTransport, LokiTransport, LokiUploader, UploadSettings};

use crate::monitor_test::{MonitorContext, MonitorTest};

const PUSH_TIMEOUT: Duration = Duration::from_secs(30);

/// Pushes the final interval set to a Loki-compatible store.
///
/// Best effort: upload problems are logged and never fail the run.
pub struct LokiMonitorTest {
    config: LokiConfig,
    transport: Option<Box<dyn LokiTransport>>,
    uploader: Option<LokiUploader<Box<dyn LokiTransport>>>,
}

impl LokiMonitorTest {
    pub fn new(config: LokiConfig) -> Self {
        Self {
            config,
            transport: None,
            uploader: None,
        }
    }

    /// Use `transport` instead of the HTTP client.
    pub fn with_transport(mut self, transport: Box<dyn LokiTransport>) -> Self {
        self.transport = Some(transport);
        self
    }
}

impl std::fmt::Debug for LokiMonitorTest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LokiMonitorTest")
            .field("enabled", &self.config.effective_enabled())
            .field("push_url", &self.config.push_url)
            .field("ready", &self.uploader.is_some())
            .finish()
    }
}

impl MonitorTest for LokiMonitorTest {
    fn prepare_collection(&mut self, _ctx: &MonitorContext) -> Result<(), MonitorTestError> {
        if !self.config.effective_enabled() {
            return Err(MonitorTestError::not_supported("log store upload is disabled"));
        }
        let settings = UploadSettings::from_config(&self.config)
            .ok_or_else(|| MonitorTestError::not_supported("no log store push URL configured"))?;
        let transport = match self.transport.take() {
            Some(transport) => transport,
            None => Box::new(HttpTransport::new(PUSH_TIMEOUT)?),
        };
        self.uploader = Some(LokiUploader::new(transport, settings));
        Ok(())
    }

    fn write_content_to_storage(
        &mut self,
        ctx: &MonitorContext,
        _storage_dir: &Path,
        _time_suffix: &str,
        final_intervals: &Intervals,
        _junits: &[JUnitTestCase],
    ) -> Result<(), MonitorTestError> {
        let Some(uploader) = &self.uploader else {
            return Ok(());
        };
        match uploader.upload(final_intervals, &ctx.cancellation) {
            Ok(report) if !report.is_complete() => tracing::warn!(
                event = "loki_upload_incomplete",
                batches_sent = report.batches_sent,
                batches_failed = report.batches_failed,
            ),
            Ok(_) => {}
            Err(e) => tracing::warn!(event = "loki_upload_failed", error = %e),
        }
        Ok(())
    }
}

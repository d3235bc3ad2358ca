use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use vigil_analysis::audit::{audit_log_files, summarize_audit_log_file, AuditLogSummary};
use vigil_core::config::AuditConfig;
use vigil_core::errors::MonitorTestError;
use vigil_core::interval::{
    Interval, IntervalReason, IntervalSource, Intervals, Level, Locator, LocatorType, Message,
};
use vigil_core::junit::JUnitTestCase;
use vigil_storage::write_audit_summaries;

use crate::monitor_test::{CollectedData, MonitorContext, MonitorTest};

/// Summarizes apiserver audit logs gathered from the cluster into per-user and
/// per-resource request counts.
#[derive(Debug)]
pub struct AuditLogMonitorTest {
    log_dir: Option<PathBuf>,
    summary: Option<AuditLogSummary>,
}

impl AuditLogMonitorTest {
    pub fn new(config: &AuditConfig) -> Self {
        Self {
            log_dir: config.log_dir.clone(),
            summary: None,
        }
    }

    pub fn summary(&self) -> Option<&AuditLogSummary> {
        self.summary.as_ref()
    }

    fn unreadable_lines_interval(
        dir: &Path,
        failures: u64,
        beginning: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Interval {
        Interval::builder(IntervalSource::AUDIT_LOG, Level::Warning)
            .locator(
                Locator::builder(LocatorType::Other)
                    .with_key("audit-log-dir", dir.display().to_string())
                    .build(),
            )
            .message(
                Message::builder()
                    .reason(IntervalReason::new("UnreadableAuditLogLines"))
                    .human(format!("{failures} audit log lines could not be decoded"))
                    .build(),
            )
            .build(beginning, Some(end))
    }
}

impl MonitorTest for AuditLogMonitorTest {
    fn prepare_collection(&mut self, _ctx: &MonitorContext) -> Result<(), MonitorTestError> {
        match &self.log_dir {
            None => Err(MonitorTestError::not_supported(
                "no audit log directory configured",
            )),
            Some(dir) if !dir.is_dir() => Err(MonitorTestError::not_supported(format!(
                "audit log directory {} does not exist",
                dir.display()
            ))),
            Some(_) => Ok(()),
        }
    }

    fn collect_data(
        &mut self,
        ctx: &MonitorContext,
        _storage_dir: &Path,
        beginning: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<CollectedData, MonitorTestError> {
        let Some(dir) = &self.log_dir else {
            return Err(MonitorTestError::not_supported(
                "no audit log directory configured",
            ));
        };

        let mut summary = AuditLogSummary::new();
        let files = audit_log_files(dir)?;
        for path in &files {
            if ctx.is_cancelled() {
                return Err(MonitorTestError::Cancelled);
            }
            summary.add_summary(&summarize_audit_log_file(path)?)?;
        }
        tracing::info!(
            event = "audit_logs_summarized",
            files = files.len(),
            requests = summary.request_counts.request_count,
            users = summary.per_user.len(),
            unreadable_lines = summary.line_read_failure_count,
        );

        let mut data = CollectedData::default();
        if summary.line_read_failure_count > 0 {
            data.intervals.push(Self::unreadable_lines_interval(
                dir,
                summary.line_read_failure_count,
                beginning,
                end,
            ));
        }
        self.summary = Some(summary);
        Ok(data)
    }

    fn write_content_to_storage(
        &mut self,
        _ctx: &MonitorContext,
        storage_dir: &Path,
        time_suffix: &str,
        _final_intervals: &Intervals,
        _junits: &[JUnitTestCase],
    ) -> Result<(), MonitorTestError> {
        if let Some(summary) = &self.summary {
            write_audit_summaries(storage_dir, time_suffix, summary)?;
        }
        Ok(())
    }
}

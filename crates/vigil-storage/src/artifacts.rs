//! JSON artifacts written once per run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use vigil_analysis::audit::AuditLogSummary;
use vigil_analysis::BackendDisruptionList;
use vigil_core::errors::StorageError;
use vigil_core::interval::Intervals;

/// On-disk envelope of `e2e-events<suffix>.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventIntervalList {
    pub items: Intervals,
}

pub fn event_intervals_file_name(time_suffix: &str) -> String {
    format!("e2e-events{time_suffix}.json")
}

pub fn backend_disruption_file_name(time_suffix: &str) -> String {
    format!("backend-disruption{time_suffix}.json")
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn write_json<T: Serialize>(
    dir: &Path,
    file_name: &str,
    value: &T,
) -> Result<PathBuf, StorageError> {
    fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    let path = dir.join(file_name);
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serialization {
        artifact: file_name.to_string(),
        message: e.to_string(),
    })?;
    fs::write(&path, bytes).map_err(|e| io_error(&path, e))?;
    tracing::debug!(event = "artifact_written", path = %path.display());
    Ok(path)
}

/// Write the full interval set. Intervals are written in the order given;
/// callers pass the sorted final set.
pub fn write_event_intervals(
    dir: &Path,
    time_suffix: &str,
    intervals: &Intervals,
) -> Result<PathBuf, StorageError> {
    let list = EventIntervalList {
        items: intervals.clone(),
    };
    let path = write_json(dir, &event_intervals_file_name(time_suffix), &list)?;
    tracing::info!(
        event = "event_intervals_written",
        count = intervals.len(),
        path = %path.display(),
    );
    Ok(path)
}

pub fn read_event_intervals(path: &Path) -> Result<Intervals, StorageError> {
    let bytes = fs::read(path).map_err(|e| io_error(path, e))?;
    let list: EventIntervalList =
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Serialization {
            artifact: path.display().to_string(),
            message: e.to_string(),
        })?;
    Ok(list.items)
}

pub fn write_backend_disruption(
    dir: &Path,
    time_suffix: &str,
    disruption: &BackendDisruptionList,
) -> Result<PathBuf, StorageError> {
    write_json(dir, &backend_disruption_file_name(time_suffix), disruption)
}

/// Write the full summary plus the users-only and resources-only views.
/// Returns the paths in that order.
pub fn write_audit_summaries(
    dir: &Path,
    time_suffix: &str,
    summary: &AuditLogSummary,
) -> Result<Vec<PathBuf>, StorageError> {
    let paths = vec![
        write_json(
            dir,
            &format!("audit-log-summary_{time_suffix}.json"),
            summary,
        )?,
        write_json(
            dir,
            &format!("just-users-audit-log-summary_{time_suffix}.json"),
            &summary.user_totals(),
        )?,
        write_json(
            dir,
            &format!("just-resources-audit-log-summary_{time_suffix}.json"),
            &summary.resource_totals(),
        )?,
    ];
    tracing::info!(
        event = "audit_summaries_written",
        requests = summary.request_counts.request_count,
        users = summary.per_user.len(),
        resources = summary.per_resource.len(),
    );
    Ok(paths)
}

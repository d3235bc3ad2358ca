//! JSON-lines audit log reading.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use vigil_core::errors::StorageError;

use super::event::AuditEvent;
use super::summary::AuditLogSummary;

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// `*.log` files directly inside `dir`, sorted by name.
pub fn audit_log_files(dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_error(dir, e))? {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "log") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Summarize one audit log. Blank lines are skipped; undecodable lines are
/// counted in `line_read_failure_count` rather than failing the file.
pub fn summarize_audit_log_file(path: &Path) -> Result<AuditLogSummary, StorageError> {
    let reader = BufReader::new(File::open(path).map_err(|e| io_error(path, e))?);
    let mut summary = AuditLogSummary::new();

    for line in reader.lines() {
        let line = line.map_err(|e| io_error(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<AuditEvent>(&line) {
            Ok(event) => summary.observe(&event),
            Err(e) => {
                tracing::debug!(
                    event = "audit_line_unreadable",
                    path = %path.display(),
                    error = %e,
                );
                summary.record_line_failure();
            }
        }
    }

    tracing::debug!(
        event = "audit_log_summarized",
        path = %path.display(),
        requests = summary.request_counts.request_count,
        failures = summary.line_read_failure_count,
    );
    Ok(summary)
}

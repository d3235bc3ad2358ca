//! Audit log configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuditConfig {
    /// Directory of gathered JSON-lines audit logs. The audit analyzer is
    /// not supported without it.
    pub log_dir: Option<PathBuf>,
}

//! Run-level configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cluster::{ClusterStability, TopologyMode};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RunConfig {
    /// Directory receiving every artifact of the run.
    pub storage_dir: Option<PathBuf>,
    /// Appended to every artifact file name. Default: empty.
    pub time_suffix: Option<String>,
    /// Default: Stable.
    pub cluster_stability: Option<ClusterStability>,
    /// Default: HighlyAvailable.
    pub topology: Option<TopologyMode>,
}

impl RunConfig {
    pub fn effective_time_suffix(&self) -> &str {
        self.time_suffix.as_deref().unwrap_or("")
    }

    pub fn effective_cluster_stability(&self) -> ClusterStability {
        self.cluster_stability.unwrap_or_default()
    }

    pub fn effective_topology(&self) -> TopologyMode {
        self.topology.unwrap_or_default()
    }
}

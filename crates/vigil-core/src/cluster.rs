//! Cluster properties that select monitor-test behaviour.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether the cluster under test is expected to stay available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ClusterStability {
    /// Availability loss is a test failure.
    #[default]
    Stable,
    /// The run deliberately perturbs the cluster (upgrades, reboots).
    Disruptive,
}

/// Control-plane topology reported by the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TopologyMode {
    #[default]
    HighlyAvailable,
    SingleReplica,
    External,
}

impl ClusterStability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stable => "Stable",
            Self::Disruptive => "Disruptive",
        }
    }
}

impl TopologyMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HighlyAvailable => "HighlyAvailable",
            Self::SingleReplica => "SingleReplica",
            Self::External => "External",
        }
    }
}

impl fmt::Display for ClusterStability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TopologyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClusterStability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stable" => Ok(Self::Stable),
            "disruptive" => Ok(Self::Disruptive),
            other => Err(format!("unknown cluster stability: {other}")),
        }
    }
}

impl FromStr for TopologyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "highlyavailable" => Ok(Self::HighlyAvailable),
            "singlereplica" => Ok(Self::SingleReplica),
            "external" => Ok(Self::External),
            other => Err(format!("unknown topology mode: {other}")),
        }
    }
}

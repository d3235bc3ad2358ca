//! Disruption evaluation configuration.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DisruptionConfig {
    /// Tolerated disruption per backend when no override exists. Default: 1s.
    pub default_allowed_secs: Option<u64>,
    /// Per-backend tolerated disruption, keyed by backend disruption name.
    pub allowed_secs: BTreeMap<String, u64>,
}

impl DisruptionConfig {
    pub fn effective_default_allowed(&self) -> Duration {
        Duration::from_secs(self.default_allowed_secs.unwrap_or(1))
    }

    /// Tolerated disruption for one backend.
    pub fn allowed_for(&self, backend_disruption_name: &str) -> Duration {
        self.allowed_secs
            .get(backend_disruption_name)
            .map(|secs| Duration::from_secs(*secs))
            .unwrap_or_else(|| self.effective_default_allowed())
    }
}

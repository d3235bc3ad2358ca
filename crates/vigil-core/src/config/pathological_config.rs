//! Pathological event configuration.

use serde::{Deserialize, Serialize};

use crate::constants::DUPLICATE_EVENT_THRESHOLD;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PathologicalConfig {
    /// Repeat count above which an event is pathological. Default: 20.
    pub duplicate_event_threshold: Option<u32>,
    /// Namespaces created by e2e tests; repeats there only flake.
    /// Default: `["e2e-"]`.
    pub e2e_namespace_prefixes: Vec<String>,
}

impl PathologicalConfig {
    pub fn effective_duplicate_event_threshold(&self) -> u32 {
        self.duplicate_event_threshold
            .unwrap_or(DUPLICATE_EVENT_THRESHOLD)
    }

    pub fn effective_e2e_namespace_prefixes(&self) -> Vec<String> {
        if self.e2e_namespace_prefixes.is_empty() {
            vec!["e2e-".to_string()]
        } else {
            self.e2e_namespace_prefixes.clone()
        }
    }
}

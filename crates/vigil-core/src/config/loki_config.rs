//! Log-store upload configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    LOKI_BACKOFF_BASE_SECS, LOKI_BACKOFF_FACTOR, LOKI_BACKOFF_STEPS, LOKI_MAX_BATCH_SIZE,
};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LokiConfig {
    /// Default: false.
    pub enabled: Option<bool>,
    pub push_url: Option<String>,
    /// OAuth client-credentials endpoint. Without it pushes are unauthenticated.
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Value of the `invoker` stream label.
    pub invoker: Option<String>,
    /// Default: 500, which is also the maximum.
    pub batch_size: Option<usize>,
    /// Default: 5.
    pub backoff_steps: Option<u32>,
    /// Default: 5.0.
    pub backoff_factor: Option<f64>,
    /// Default: 2.
    pub backoff_base_secs: Option<u64>,
}

impl LokiConfig {
    pub fn effective_enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(LOKI_MAX_BATCH_SIZE)
    }

    pub fn effective_backoff_steps(&self) -> u32 {
        self.backoff_steps.unwrap_or(LOKI_BACKOFF_STEPS)
    }

    pub fn effective_backoff_factor(&self) -> f64 {
        self.backoff_factor.unwrap_or(LOKI_BACKOFF_FACTOR)
    }

    pub fn effective_backoff_base(&self) -> Duration {
        Duration::from_secs(self.backoff_base_secs.unwrap_or(LOKI_BACKOFF_BASE_SECS))
    }

    pub fn effective_invoker(&self) -> &str {
        self.invoker.as_deref().unwrap_or("vigil")
    }
}

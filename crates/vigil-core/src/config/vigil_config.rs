//! Top-level Vigil configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{AuditConfig, DisruptionConfig, LokiConfig, PathologicalConfig, RunConfig};
use crate::cluster::ClusterStability;
use crate::constants::{LOKI_MAX_BATCH_SIZE, PROJECT_CONFIG_FILE};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Explicit overrides (applied via `apply_overrides`)
/// 2. Environment variables (`VIGIL_*`)
/// 3. Project config (`vigil.toml` in the run root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VigilConfig {
    pub run: RunConfig,
    pub disruption: DisruptionConfig,
    pub pathological: PathologicalConfig,
    pub loki: LokiConfig,
    pub audit: AuditConfig,
}

/// Overrides supplied by the embedding program.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub storage_dir: Option<PathBuf>,
    pub time_suffix: Option<String>,
    pub cluster_stability: Option<ClusterStability>,
    pub loki_enabled: Option<bool>,
    pub audit_log_dir: Option<PathBuf>,
}

impl VigilConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config);

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;
        tracing::debug!(
            event = "config_loaded",
            root = %root.display(),
            stability = %config.run.effective_cluster_stability(),
            loki_enabled = config.loki.effective_enabled(),
            "configuration resolved"
        );
        Ok(config)
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &VigilConfig) -> Result<(), ConfigError> {
        if let Some(batch_size) = config.loki.batch_size {
            if !(1..=LOKI_MAX_BATCH_SIZE).contains(&batch_size) {
                return Err(ConfigError::ValidationFailed {
                    field: "loki.batch_size".to_string(),
                    message: format!("must be between 1 and {LOKI_MAX_BATCH_SIZE}"),
                });
            }
        }
        if let Some(factor) = config.loki.backoff_factor {
            if factor.is_nan() || factor < 1.0 {
                return Err(ConfigError::ValidationFailed {
                    field: "loki.backoff_factor".to_string(),
                    message: "must be at least 1.0".to_string(),
                });
            }
        }
        if config.loki.effective_enabled()
            && config.loki.push_url.as_deref().map_or(true, str::is_empty)
        {
            return Err(ConfigError::ValidationFailed {
                field: "loki.push_url".to_string(),
                message: "required when loki.enabled is true".to_string(),
            });
        }
        if config.pathological.duplicate_event_threshold == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "pathological.duplicate_event_threshold".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored (forward-compatible).
    fn merge_toml_file(config: &mut VigilConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: VigilConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`, where `other` values override `base` values
    /// only when `other` has a `Some` value.
    fn merge(base: &mut VigilConfig, other: &VigilConfig) {
        // Run
        if other.run.storage_dir.is_some() {
            base.run.storage_dir = other.run.storage_dir.clone();
        }
        if other.run.time_suffix.is_some() {
            base.run.time_suffix = other.run.time_suffix.clone();
        }
        if other.run.cluster_stability.is_some() {
            base.run.cluster_stability = other.run.cluster_stability;
        }
        if other.run.topology.is_some() {
            base.run.topology = other.run.topology;
        }

        // Disruption
        if other.disruption.default_allowed_secs.is_some() {
            base.disruption.default_allowed_secs = other.disruption.default_allowed_secs;
        }
        if !other.disruption.allowed_secs.is_empty() {
            base.disruption.allowed_secs = other.disruption.allowed_secs.clone();
        }

        // Pathological
        if other.pathological.duplicate_event_threshold.is_some() {
            base.pathological.duplicate_event_threshold =
                other.pathological.duplicate_event_threshold;
        }
        if !other.pathological.e2e_namespace_prefixes.is_empty() {
            base.pathological.e2e_namespace_prefixes =
                other.pathological.e2e_namespace_prefixes.clone();
        }

        // Loki
        if other.loki.enabled.is_some() {
            base.loki.enabled = other.loki.enabled;
        }
        if other.loki.push_url.is_some() {
            base.loki.push_url = other.loki.push_url.clone();
        }
        if other.loki.token_url.is_some() {
            base.loki.token_url = other.loki.token_url.clone();
        }
        if other.loki.client_id.is_some() {
            base.loki.client_id = other.loki.client_id.clone();
        }
        if other.loki.client_secret.is_some() {
            base.loki.client_secret = other.loki.client_secret.clone();
        }
        if other.loki.invoker.is_some() {
            base.loki.invoker = other.loki.invoker.clone();
        }
        if other.loki.batch_size.is_some() {
            base.loki.batch_size = other.loki.batch_size;
        }
        if other.loki.backoff_steps.is_some() {
            base.loki.backoff_steps = other.loki.backoff_steps;
        }
        if other.loki.backoff_factor.is_some() {
            base.loki.backoff_factor = other.loki.backoff_factor;
        }
        if other.loki.backoff_base_secs.is_some() {
            base.loki.backoff_base_secs = other.loki.backoff_base_secs;
        }

        // Audit
        if other.audit.log_dir.is_some() {
            base.audit.log_dir = other.audit.log_dir.clone();
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `VIGIL_RUN_TIME_SUFFIX`, `VIGIL_LOKI_PUSH_URL`, etc.
    fn apply_env_overrides(config: &mut VigilConfig) {
        if let Ok(val) = std::env::var("VIGIL_RUN_STORAGE_DIR") {
            config.run.storage_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = std::env::var("VIGIL_RUN_TIME_SUFFIX") {
            config.run.time_suffix = Some(val);
        }
        if let Ok(val) = std::env::var("VIGIL_RUN_CLUSTER_STABILITY") {
            if let Ok(v) = val.parse::<ClusterStability>() {
                config.run.cluster_stability = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_PATHOLOGICAL_DUPLICATE_EVENT_THRESHOLD") {
            if let Ok(v) = val.parse::<u32>() {
                config.pathological.duplicate_event_threshold = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_LOKI_ENABLED") {
            if let Ok(v) = val.parse::<bool>() {
                config.loki.enabled = Some(v);
            }
        }
        if let Ok(val) = std::env::var("VIGIL_LOKI_PUSH_URL") {
            config.loki.push_url = Some(val);
        }
        if let Ok(val) = std::env::var("VIGIL_LOKI_TOKEN_URL") {
            config.loki.token_url = Some(val);
        }
        if let Ok(val) = std::env::var("VIGIL_LOKI_CLIENT_ID") {
            config.loki.client_id = Some(val);
        }
        if let Ok(val) = std::env::var("VIGIL_LOKI_CLIENT_SECRET") {
            config.loki.client_secret = Some(val);
        }
        if let Ok(val) = std::env::var("VIGIL_AUDIT_LOG_DIR") {
            config.audit.log_dir = Some(PathBuf::from(val));
        }
    }

    /// Apply explicit overrides (highest priority).
    fn apply_overrides(config: &mut VigilConfig, overrides: &ConfigOverrides) {
        if let Some(ref v) = overrides.storage_dir {
            config.run.storage_dir = Some(v.clone());
        }
        if let Some(ref v) = overrides.time_suffix {
            config.run.time_suffix = Some(v.clone());
        }
        if let Some(v) = overrides.cluster_stability {
            config.run.cluster_stability = Some(v);
        }
        if let Some(v) = overrides.loki_enabled {
            config.loki.enabled = Some(v);
        }
        if let Some(ref v) = overrides.audit_log_dir {
            config.audit.log_dir = Some(v.clone());
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

//! Configuration system for Vigil.
//! TOML-based, layered resolution: overrides > env > project file > defaults.

pub mod audit_config;
pub mod disruption_config;
pub mod loki_config;
pub mod pathological_config;
pub mod run_config;
pub mod vigil_config;

pub use audit_config::AuditConfig;
pub use disruption_config::DisruptionConfig;
pub use loki_config::LokiConfig;
pub use pathological_config::PathologicalConfig;
pub use run_config::RunConfig;
pub use vigil_config::{ConfigOverrides, VigilConfig};

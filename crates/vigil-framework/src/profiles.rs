//! Which monitor tests a run gets.

use vigil_core::cluster::ClusterStability;
use vigil_core::config::VigilConfig;
use vigil_core::errors::FrameworkError;

use crate::builtin::{
    AuditLogMonitorTest, DisruptionSummaryMonitorTest, GracefulRestartMonitorTest,
    IntervalSerializerMonitorTest, LokiMonitorTest, PathologicalMonitorTest,
};
use crate::registry::MonitorTestRegistry;

/// Inputs to building the default registry.
#[derive(Debug, Clone, Default)]
pub struct MonitorTestInitializationInfo {
    pub cluster_stability: ClusterStability,
    pub config: VigilConfig,
}

impl MonitorTestInitializationInfo {
    pub fn from_config(config: VigilConfig) -> Self {
        Self {
            cluster_stability: config.run.effective_cluster_stability(),
            config,
        }
    }
}

/// Register the built-in monitor tests.
///
/// A disruptive run expects outages, so its disruption test only records
/// availability instead of judging it.
pub fn default_monitor_tests(
    info: &MonitorTestInitializationInfo,
) -> Result<MonitorTestRegistry, FrameworkError> {
    let config = &info.config;
    let mut registry = MonitorTestRegistry::new();

    registry.add_monitor_test(
        "apiserver-graceful-restart",
        "kube-apiserver",
        Box::new(GracefulRestartMonitorTest::new()),
    )?;

    let disruption = match info.cluster_stability {
        ClusterStability::Stable => DisruptionSummaryMonitorTest::new(config.disruption.clone()),
        ClusterStability::Disruptive => {
            DisruptionSummaryMonitorTest::record_only(config.disruption.clone())
        }
    };
    registry.add_monitor_test("disruption-summary", "Networking", Box::new(disruption))?;

    registry.add_monitor_test(
        "pathological-event-analyzer",
        "Test Framework",
        Box::new(PathologicalMonitorTest::new(config.pathological.clone())),
    )?;
    registry.add_monitor_test(
        "interval-serializer",
        "Test Framework",
        Box::new(IntervalSerializerMonitorTest::new()),
    )?;
    registry.add_monitor_test(
        "audit-log-analyzer",
        "kube-apiserver",
        Box::new(AuditLogMonitorTest::new(&config.audit)),
    )?;
    registry.add_monitor_test(
        "loki-uploader",
        "Test Framework",
        Box::new(LokiMonitorTest::new(config.loki.clone())),
    )?;

    tracing::info!(
        event = "default_monitor_tests_registered",
        stability = %info.cluster_stability,
        count = registry.len(),
    );
    Ok(registry)
}

//! The monitor-test lifecycle.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use vigil_core::cluster::{ClusterStability, TopologyMode};
use vigil_core::config::VigilConfig;
use vigil_core::errors::MonitorTestError;
use vigil_core::interval::Intervals;
use vigil_core::junit::JUnitTestCase;
use vigil_core::recorder::Recorder;
use vigil_core::traits::{Cancellable, CancellationToken};

/// Run-wide facts handed to every lifecycle stage.
#[derive(Debug, Clone, Default)]
pub struct MonitorContext {
    pub cancellation: CancellationToken,
    pub topology: TopologyMode,
    pub stability: ClusterStability,
}

impl MonitorContext {
    pub fn new(topology: TopologyMode, stability: ClusterStability) -> Self {
        Self {
            cancellation: CancellationToken::new(),
            topology,
            stability,
        }
    }

    pub fn from_config(config: &VigilConfig) -> Self {
        Self::new(
            config.run.effective_topology(),
            config.run.effective_cluster_stability(),
        )
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

/// Lifecycle stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    PrepareCollection,
    StartCollection,
    CollectData,
    ConstructComputedIntervals,
    EvaluateTestsFromConstructedIntervals,
    WriteContentToStorage,
    Cleanup,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Self::PrepareCollection,
        Self::StartCollection,
        Self::CollectData,
        Self::ConstructComputedIntervals,
        Self::EvaluateTestsFromConstructedIntervals,
        Self::WriteContentToStorage,
        Self::Cleanup,
    ];

    /// Stage label used in JUnit case names.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PrepareCollection => "preparation",
            Self::StartCollection => "setup",
            Self::CollectData => "collection",
            Self::ConstructComputedIntervals => "interval construction",
            Self::EvaluateTestsFromConstructedIntervals => "test evaluation",
            Self::WriteContentToStorage => "writing to storage",
            Self::Cleanup => "cleanup",
        }
    }
}

/// Whether a plugin still takes part in the run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PluginState {
    #[default]
    Active,
    /// Preconditions are not met; every later stage is skipped and the plugin
    /// contributes no results.
    NotSupported { reason: String },
}

impl PluginState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Intervals and JUnit cases produced by [`MonitorTest::collect_data`].
#[derive(Debug, Clone, Default)]
pub struct CollectedData {
    pub intervals: Intervals,
    pub junits: Vec<JUnitTestCase>,
}

/// A pluggable observer of a run.
///
/// Every stage may return [`MonitorTestError::NotSupported`] to withdraw the
/// plugin from the rest of the run. Stages a plugin has no use for keep the
/// default no-op.
pub trait MonitorTest: Send {
    fn prepare_collection(&mut self, _ctx: &MonitorContext) -> Result<(), MonitorTestError> {
        Ok(())
    }

    /// Begin background collection. Long-running collectors keep the recorder
    /// and write into it until [`MonitorTest::collect_data`].
    fn start_collection(
        &mut self,
        _ctx: &MonitorContext,
        _recorder: &Arc<Recorder>,
    ) -> Result<(), MonitorTestError> {
        Ok(())
    }

    fn collect_data(
        &mut self,
        _ctx: &MonitorContext,
        _storage_dir: &Path,
        _beginning: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<CollectedData, MonitorTestError> {
        Ok(CollectedData::default())
    }

    /// Derive new intervals from the frozen starting set. Every plugin sees the
    /// same starting set, never another plugin's constructed intervals.
    fn construct_computed_intervals(
        &mut self,
        _ctx: &MonitorContext,
        _starting: &Intervals,
        _beginning: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Intervals, MonitorTestError> {
        Ok(Intervals::new())
    }

    fn evaluate_tests_from_constructed_intervals(
        &mut self,
        _ctx: &MonitorContext,
        _final_intervals: &Intervals,
    ) -> Result<Vec<JUnitTestCase>, MonitorTestError> {
        Ok(Vec::new())
    }

    fn write_content_to_storage(
        &mut self,
        _ctx: &MonitorContext,
        _storage_dir: &Path,
        _time_suffix: &str,
        _final_intervals: &Intervals,
        _junits: &[JUnitTestCase],
    ) -> Result<(), MonitorTestError> {
        Ok(())
    }

    fn cleanup(&mut self, _ctx: &MonitorContext) -> Result<(), MonitorTestError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL);
        assert_eq!(Stage::ALL[0].label(), "preparation");
        assert_eq!(Stage::ALL[6].label(), "cleanup");
    }

    #[test]
    fn test_context_from_config() {
        let mut config = VigilConfig::default();
        config.run.cluster_stability = Some(ClusterStability::Disruptive);
        let ctx = MonitorContext::from_config(&config);
        assert_eq!(ctx.stability, ClusterStability::Disruptive);
        assert_eq!(ctx.topology, TopologyMode::HighlyAvailable);
        assert!(!ctx.is_cancelled());
    }
}

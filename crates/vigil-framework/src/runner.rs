//! Sequential pipeline over every registered monitor test.
//!
//! collect → construct → backfill → evaluate → write → cleanup. Each stage of
//! each active plugin yields one JUnit case; a failing plugin is reported and
//! skipped without affecting the others.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};

use vigil_analysis::apply_pathological_backfill;
use vigil_core::constants::JUNIT_SUITE_NAME;
use vigil_core::errors::{FrameworkError, MonitorTestError, RunReport};
use vigil_core::interval::Intervals;
use vigil_core::junit::{JUnitTestCase, JUnitTestSuite};
use vigil_core::recorder::Recorder;
use vigil_storage::write_junit;

use crate::monitor_test::{MonitorContext, MonitorTest, PluginState, Stage};
use crate::registry::MonitorTestRegistry;

/// What a completed run produced.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// Sorted, backfilled intervals every evaluation saw.
    pub final_intervals: Intervals,
    /// Every JUnit case of the run, setup stages included.
    pub junits: Vec<JUnitTestCase>,
    pub junit_path: Option<PathBuf>,
}

/// A JUnit case tagged with the name of the monitor test that produced it.
type OwnedCase = (String, JUnitTestCase);

fn untag(cases: Vec<OwnedCase>) -> Vec<JUnitTestCase> {
    cases.into_iter().map(|(_, case)| case).collect()
}

pub struct MonitorTestRunner {
    registry: MonitorTestRegistry,
    recorder: Arc<Recorder>,
    time_suffix: String,
    setup_junits: Vec<OwnedCase>,
    cancellation_reported: bool,
}

impl MonitorTestRunner {
    pub fn new(registry: MonitorTestRegistry) -> Self {
        Self {
            registry,
            recorder: Arc::new(Recorder::new()),
            time_suffix: String::new(),
            setup_junits: Vec::new(),
            cancellation_reported: false,
        }
    }

    pub fn with_time_suffix(mut self, time_suffix: impl Into<String>) -> Self {
        self.time_suffix = time_suffix.into();
        self
    }

    /// Recorder shared with every collector.
    pub fn recorder(&self) -> Arc<Recorder> {
        Arc::clone(&self.recorder)
    }

    pub fn registry(&self) -> &MonitorTestRegistry {
        &self.registry
    }

    /// Prepare every plugin, then start collection on those still supported.
    pub fn prepare_and_start(&mut self, ctx: &MonitorContext) -> RunReport<Vec<JUnitTestCase>> {
        tracing::info!(
            event = "monitor_tests_starting",
            count = self.registry.len(),
            stability = %ctx.stability,
            topology = %ctx.topology,
        );
        let mut errors = Vec::new();
        let mut junits = Vec::new();
        let recorder = Arc::clone(&self.recorder);

        self.run_stage(ctx, Stage::PrepareCollection, &mut errors, &mut junits, |t| {
            t.prepare_collection(ctx)
        });
        self.run_stage(ctx, Stage::StartCollection, &mut errors, &mut junits, |t| {
            t.start_collection(ctx, &recorder)
        });

        self.setup_junits.extend(junits.iter().cloned());
        RunReport {
            data: untag(junits),
            errors,
        }
    }

    /// Stop collection and run the rest of the pipeline over
    /// `[beginning, end]`, writing artifacts and the JUnit report into
    /// `storage_dir`.
    pub fn collect_and_evaluate(
        &mut self,
        ctx: &MonitorContext,
        storage_dir: &Path,
        beginning: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> RunReport<RunOutcome> {
        let mut errors = Vec::new();
        let mut junits = std::mem::take(&mut self.setup_junits);
        let time_suffix = self.time_suffix.clone();

        let collected = self.run_stage(ctx, Stage::CollectData, &mut errors, &mut junits, |t| {
            t.collect_data(ctx, storage_dir, beginning, end)
        });
        self.recorder.close_open(end);
        let mut starting = self.recorder.snapshot();
        for (owner, data) in collected {
            starting = starting.merge(&data.intervals);
            junits.extend(data.junits.into_iter().map(|c| (owner.clone(), c)));
        }
        starting.sort();
        tracing::info!(event = "intervals_collected", count = starting.len());

        let computed = self.run_stage(
            ctx,
            Stage::ConstructComputedIntervals,
            &mut errors,
            &mut junits,
            |t| t.construct_computed_intervals(ctx, &starting, beginning, end),
        );
        let mut merged = computed
            .iter()
            .fold(starting.clone(), |acc, (_, constructed)| acc.merge(constructed));
        merged.sort();
        let final_intervals = apply_pathological_backfill(&merged);
        tracing::info!(
            event = "intervals_constructed",
            constructed = final_intervals.len().saturating_sub(starting.len()),
            total = final_intervals.len(),
        );

        let evaluated = self.run_stage(
            ctx,
            Stage::EvaluateTestsFromConstructedIntervals,
            &mut errors,
            &mut junits,
            |t| t.evaluate_tests_from_constructed_intervals(ctx, &final_intervals),
        );
        for (owner, cases) in evaluated {
            junits.extend(cases.into_iter().map(|c| (owner.clone(), c)));
        }

        let junits_so_far: Vec<JUnitTestCase> = junits.iter().map(|(_, c)| c.clone()).collect();
        self.run_stage(
            ctx,
            Stage::WriteContentToStorage,
            &mut errors,
            &mut junits,
            |t| {
                t.write_content_to_storage(
                    ctx,
                    storage_dir,
                    &time_suffix,
                    &final_intervals,
                    &junits_so_far,
                )
            },
        );

        self.run_stage(ctx, Stage::Cleanup, &mut errors, &mut junits, |t| {
            t.cleanup(ctx)
        });

        let junits = untag(junits);
        let suite = JUnitTestSuite::new(JUNIT_SUITE_NAME, junits.clone());
        let junit_path = match write_junit(storage_dir, &time_suffix, &suite) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(event = "junit_write_failed", error = %e);
                errors.push(FrameworkError::Storage(e));
                None
            }
        };

        tracing::info!(
            event = "monitor_tests_finished",
            tests = suite.num_tests,
            failures = suite.num_failed,
            errors = errors.len(),
        );
        RunReport {
            data: RunOutcome {
                final_intervals,
                junits,
                junit_path,
            },
            errors,
        }
    }

    /// Run one stage on every active plugin, collecting successful results
    /// keyed by plugin name.
    ///
    /// Once the run is cancelled every stage except cleanup is skipped, and the
    /// cancellation is reported once. A plugin that turns out to be
    /// unsupported loses every case it contributed so far.
    fn run_stage<T>(
        &mut self,
        ctx: &MonitorContext,
        stage: Stage,
        errors: &mut Vec<FrameworkError>,
        junits: &mut Vec<OwnedCase>,
        mut call: impl FnMut(&mut dyn MonitorTest) -> Result<T, MonitorTestError>,
    ) -> Vec<(String, T)> {
        let mut results = Vec::new();
        if ctx.is_cancelled() && stage != Stage::Cleanup {
            if !self.cancellation_reported {
                tracing::info!(event = "stage_skipped_cancelled", stage = stage.label());
                errors.push(FrameworkError::Cancelled);
                self.cancellation_reported = true;
            }
            return results;
        }

        for entry in self.registry.iter_mut() {
            if !entry.state.is_active() {
                continue;
            }
            let started = Instant::now();
            let outcome = call(entry.test.as_mut());
            let junit_name = entry.junit_name(stage.label());
            match outcome {
                Ok(value) => {
                    tracing::debug!(
                        event = "stage_passed",
                        test = %entry.name,
                        stage = stage.label(),
                        elapsed_ms = started.elapsed().as_millis() as u64,
                    );
                    junits.push((entry.name.clone(), JUnitTestCase::pass(junit_name)));
                    results.push((entry.name.clone(), value));
                }
                Err(MonitorTestError::NotSupported { reason }) => {
                    tracing::info!(
                        event = "monitor_test_not_supported",
                        test = %entry.name,
                        stage = stage.label(),
                        reason = %reason,
                    );
                    junits.retain(|(owner, _)| owner != &entry.name);
                    self.setup_junits.retain(|(owner, _)| owner != &entry.name);
                    entry.state = PluginState::NotSupported { reason };
                }
                Err(e) => {
                    tracing::warn!(
                        event = "stage_failed",
                        test = %entry.name,
                        stage = stage.label(),
                        error = %e,
                    );
                    junits.push((
                        entry.name.clone(),
                        JUnitTestCase::fail(junit_name, e.to_string()),
                    ));
                    errors.push(FrameworkError::Stage {
                        name: entry.name.clone(),
                        stage: stage.label(),
                        source: e,
                    });
                }
            }
        }
        results
    }
}

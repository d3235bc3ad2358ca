use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rustc_hash::FxHashSet;

use vigil_analysis::{
    evaluate_repeated_events, AllowedPathologicalEventRegistry, PathologicalEventKey,
};
use vigil_core::config::PathologicalConfig;
use vigil_core::errors::MonitorTestError;
use vigil_core::interval::{annotations, Interval, IntervalSource, Intervals, Level, Message};
use vigil_core::junit::JUnitTestCase;

use crate::monitor_test::{MonitorContext, MonitorTest};

pub const REPEATED_EVENTS_TEST: &str = "[sig-arch] events should not repeat pathologically";
pub const E2E_NAMESPACE_REPEATED_EVENTS_TEST: &str =
    "[sig-arch] events should not repeat pathologically in e2e namespaces";

const CONSTRUCTED_BY: &str = "pathological-event-analyzer";

/// First and last sighting of one pathological event.
struct Series<'a> {
    first: &'a Interval,
    to: DateTime<Utc>,
    times: u32,
}

/// Charts repeating events as series and fails the run on repeats nobody
/// tolerates.
///
/// Events in e2e namespaces are produced by the tests themselves, so their
/// repeats only flake.
#[derive(Debug)]
pub struct PathologicalMonitorTest {
    config: PathologicalConfig,
}

impl PathologicalMonitorTest {
    pub fn new(config: PathologicalConfig) -> Self {
        Self { config }
    }

    fn in_e2e_namespace(&self, prefixes: &[String], interval: &Interval) -> bool {
        interval
            .locator
            .namespace()
            .is_some_and(|ns| prefixes.iter().any(|p| ns.starts_with(p.as_str())))
    }
}

impl MonitorTest for PathologicalMonitorTest {
    /// One display interval per pathological event spanning every occurrence
    /// of it. The human message differs from the event's own so the series is
    /// never mistaken for another occurrence.
    fn construct_computed_intervals(
        &mut self,
        _ctx: &MonitorContext,
        starting: &Intervals,
        _beginning: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Intervals, MonitorTestError> {
        let events = || {
            starting
                .iter()
                .filter(|i| i.source == IntervalSource::KUBE_EVENT)
        };
        let pathological: FxHashSet<PathologicalEventKey> = events()
            .filter(|i| i.message.is_pathological())
            .map(PathologicalEventKey::of)
            .collect();

        let mut series: BTreeMap<String, Series<'_>> = BTreeMap::new();
        for interval in events() {
            let key = PathologicalEventKey::of(interval);
            if !pathological.contains(&key) {
                continue;
            }
            let entry = series.entry(key.as_str().to_string()).or_insert(Series {
                first: interval,
                to: interval.end_or_from(),
                times: 0,
            });
            entry.to = entry.to.max(interval.end_or_from());
            entry.times = entry.times.max(interval.message.times());
        }

        let constructed: Intervals = series
            .into_values()
            .map(|s| {
                Interval::builder(IntervalSource::PATHOLOGICAL_EVENT_ANALYZER, Level::Warning)
                    .locator(s.first.locator.clone())
                    .message(
                        Message::builder()
                            .reason(s.first.message.reason.clone())
                            .human(format!(
                                "pathological event series: {}",
                                s.first.message.human_message
                            ))
                            .annotation(annotations::COUNT, s.times.to_string())
                            .annotation(annotations::CONSTRUCTED, CONSTRUCTED_BY)
                            .build(),
                    )
                    .display()
                    .build(s.first.from, Some(s.to))
            })
            .collect();
        tracing::debug!(event = "pathological_series_constructed", count = constructed.len());
        Ok(constructed)
    }

    fn evaluate_tests_from_constructed_intervals(
        &mut self,
        ctx: &MonitorContext,
        final_intervals: &Intervals,
    ) -> Result<Vec<JUnitTestCase>, MonitorTestError> {
        let registry = AllowedPathologicalEventRegistry::universal(final_intervals)?;
        let threshold = self.config.effective_duplicate_event_threshold();
        let prefixes = self.config.effective_e2e_namespace_prefixes();

        let events = final_intervals.filter(|i| i.source == IntervalSource::KUBE_EVENT);
        let e2e = events.filter(|i| self.in_e2e_namespace(&prefixes, i));
        let platform = events.filter(|i| !self.in_e2e_namespace(&prefixes, i));

        let mut cases = evaluate_repeated_events(
            &platform,
            &registry,
            ctx.topology,
            threshold,
            REPEATED_EVENTS_TEST,
            false,
        );
        cases.extend(evaluate_repeated_events(
            &e2e,
            &registry,
            ctx.topology,
            threshold,
            E2E_NAMESPACE_REPEATED_EVENTS_TEST,
            true,
        ));
        Ok(cases)
    }
}

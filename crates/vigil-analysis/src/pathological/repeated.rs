//! Evaluation of events that repeated more often than the threshold.

use std::collections::BTreeMap;

use vigil_core::cluster::TopologyMode;
use vigil_core::interval::Intervals;
use vigil_core::junit::JUnitTestCase;

use super::registry::AllowedPathologicalEventRegistry;

/// Outcome of scanning a set of intervals for pathological repeats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepeatedEventEvaluation {
    /// Repeats nobody tolerates.
    pub failures: Vec<String>,
    /// Repeats with a known bug, or any repeat when evaluating flake-only.
    pub flakes: Vec<String>,
}

impl RepeatedEventEvaluation {
    pub fn evaluate(
        intervals: &Intervals,
        registry: &AllowedPathologicalEventRegistry,
        topology: TopologyMode,
        threshold: u32,
        flake_only: bool,
    ) -> Self {
        // Display text -> (highest count, known bug).
        let mut repeated: BTreeMap<String, (u32, Option<String>)> = BTreeMap::new();

        for interval in intervals {
            let times = interval.message.times();
            if times <= threshold {
                continue;
            }
            if registry.allowed_by_any(interval, topology).is_some() {
                continue;
            }
            let known_bug = registry
                .matches_any(interval)
                .and_then(|m| m.jira())
                .map(str::to_string);
            let display = format!("{} - {}", interval.locator, interval.message.human_message);
            let entry = repeated.entry(display).or_insert((0, None));
            entry.0 = entry.0.max(times);
            if entry.1.is_none() {
                entry.1 = known_bug;
            }
        }

        let mut evaluation = Self::default();
        for (display, (count, known_bug)) in repeated {
            let mut message = format!("event happened {count} times, something is wrong: {display}");
            match known_bug {
                Some(jira) => {
                    message.push_str(" - ");
                    message.push_str(&jira);
                    evaluation.flakes.push(message);
                }
                None if flake_only => evaluation.flakes.push(message),
                None => evaluation.failures.push(message),
            }
        }
        evaluation
    }

    /// A failure when anything repeated, plus a pass when nothing failed
    /// outright so known problems show up as flakes.
    pub fn into_junit(self, test_name: &str) -> Vec<JUnitTestCase> {
        let mut cases = Vec::new();
        if !self.failures.is_empty() || !self.flakes.is_empty() {
            let mut output = String::new();
            if !self.failures.is_empty() {
                output = format!(
                    "{} events happened too frequently\n\n{}",
                    self.failures.len(),
                    self.failures.join("\n")
                );
            }
            if !self.flakes.is_empty() {
                if !output.is_empty() {
                    output.push_str("\n\n");
                }
                output.push_str(&format!(
                    "{} events with known BZs\n\n{}",
                    self.flakes.len(),
                    self.flakes.join("\n")
                ));
            }
            cases.push(JUnitTestCase::fail(test_name, output));
        }
        if self.failures.is_empty() {
            cases.push(JUnitTestCase::pass(test_name));
        }
        cases
    }
}

/// JUnit cases for events repeating more than `threshold` times that no
/// matcher allows. With `flake_only`, unknown repeats flake instead of fail.
pub fn evaluate_repeated_events(
    intervals: &Intervals,
    registry: &AllowedPathologicalEventRegistry,
    topology: TopologyMode,
    threshold: u32,
    test_name: &str,
    flake_only: bool,
) -> Vec<JUnitTestCase> {
    let evaluation =
        RepeatedEventEvaluation::evaluate(intervals, registry, topology, threshold, flake_only);
    tracing::info!(
        event = "repeated_events_evaluated",
        test = test_name,
        failures = evaluation.failures.len(),
        flakes = evaluation.flakes.len(),
    );
    evaluation.into_junit(test_name)
}

//! Disruption duration per backend and connection type.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use vigil_core::errors::AnalysisError;
use vigil_core::interval::{BackendConnectionType, Interval, Intervals, Level, LocatorType};

/// Aggregated unavailability of one backend over the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BackendDisruption {
    /// Backend disruption name, e.g. `kube-api-new-connections`.
    pub name: String,
    /// Name without the connection-type suffix, e.g. `kube-api`.
    pub backend_name: String,
    pub connection_type: BackendConnectionType,
    #[serde(with = "super::duration_nanos")]
    pub disrupted_duration: Duration,
    #[serde(default)]
    pub disruption_messages: Vec<String>,
}

/// Contents of the `backend-disruption` artifact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDisruptionList {
    #[serde(rename = "BackendDisruptions")]
    pub backend_disruptions: BTreeMap<String, BackendDisruption>,
}

impl BackendDisruptionList {
    pub fn get(&self, name: &str) -> Option<&BackendDisruption> {
        self.backend_disruptions.get(name)
    }

    pub fn len(&self) -> usize {
        self.backend_disruptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backend_disruptions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackendDisruption> {
        self.backend_disruptions.values()
    }
}

fn backend_name(backend_disruption_name: &str) -> &str {
    backend_disruption_name
        .strip_suffix("-new-connections")
        .or_else(|| backend_disruption_name.strip_suffix("-reused-connections"))
        .unwrap_or(backend_disruption_name)
}

/// Scan state for one backend and connection type.
#[derive(Debug, Default)]
struct Accumulator {
    total: Duration,
    messages: Vec<String>,
}

impl Accumulator {
    /// Only Error intervals mark an active outage. Info intervals register the
    /// backend without adding time.
    fn observe(&mut self, interval: &Interval) {
        if interval.level != Level::Error {
            return;
        }
        self.total += interval.duration();
        if !interval.message.human_message.is_empty() {
            self.messages.push(interval.message.human_message.clone());
        }
    }

    fn finish(self) -> (Duration, Vec<String>) {
        (self.total, self.messages)
    }
}

fn is_counted(interval: &Interval) -> bool {
    interval.locator.locator_type == LocatorType::Disruption
        && matches!(interval.level, Level::Error | Level::Info)
}

/// Compute the disrupted duration of every backend seen in `intervals`.
///
/// Warning-level disruption is attributed to flaky external dependencies and
/// is ignored. Every backend with at least one counted interval appears in the
/// result, even with zero duration. `intervals` must be sorted by `from`.
///
/// The result is keyed by backend disruption name alone, so one name sampled
/// under two connection types is an invariant violation.
pub fn compute_disruption_data(
    intervals: &Intervals,
) -> Result<BackendDisruptionList, AnalysisError> {
    let mut groups: BTreeMap<(String, BackendConnectionType), Accumulator> = BTreeMap::new();

    for interval in intervals.iter().filter(|i| is_counted(i)) {
        let locator = &interval.locator;
        let (Some(name), Some(connection)) =
            (locator.backend_disruption_name(), locator.connection_type())
        else {
            tracing::debug!(
                event = "disruption_interval_skipped",
                locator = %locator,
                "disruption interval without backend name or connection type"
            );
            continue;
        };
        groups
            .entry((name.to_string(), connection))
            .or_default()
            .observe(interval);
    }

    let mut list = BackendDisruptionList::default();
    for ((name, connection_type), accumulator) in groups {
        let (disrupted_duration, disruption_messages) = accumulator.finish();
        if let Some(existing) = list.backend_disruptions.get(&name) {
            return Err(AnalysisError::InvariantViolated {
                context: "backend disruption name",
                expected: format!("{name}/{}", existing.connection_type),
                actual: format!("{name}/{connection_type}"),
            });
        }
        tracing::debug!(
            event = "backend_disruption_computed",
            backend = %name,
            connection = %connection_type,
            disrupted_ms = disrupted_duration.as_millis() as u64,
            episodes = disruption_messages.len(),
        );
        list.backend_disruptions.insert(
            name.clone(),
            BackendDisruption {
                backend_name: backend_name(&name).to_string(),
                name,
                connection_type,
                disrupted_duration,
                disruption_messages,
            },
        );
    }
    Ok(list)
}

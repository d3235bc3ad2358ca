//! Retroactive pathological marking.
//!
//! Collectors only mark an event `pathological=true` once its repeat count
//! crosses the threshold. Earlier occurrences of the same event are stamped
//! afterwards so the whole series charts consistently.

use std::fmt;

use rustc_hash::FxHashSet;

use vigil_core::interval::{annotations, Interval, Intervals};

/// Exact-match identity of an event: legacy locator, reason and human message
/// joined by single spaces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathologicalEventKey(String);

impl PathologicalEventKey {
    pub fn of(interval: &Interval) -> Self {
        Self(format!(
            "{} {} {}",
            interval.locator.legacy_string(),
            interval.message.reason,
            interval.message.human_message
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathologicalEventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An interval that crossed the threshold by itself, as opposed to one flagged
/// interesting by a matcher.
fn is_backfill_source(interval: &Interval) -> bool {
    interval.message.is_pathological() && !interval.message.is_interesting()
}

/// Stamped copies of every interval that shares a key with a pathological
/// source but is not yet marked, paired with its index in `intervals`.
pub fn backfill_pathological(intervals: &Intervals) -> Vec<(usize, Interval)> {
    let sources: FxHashSet<PathologicalEventKey> = intervals
        .iter()
        .filter(|i| is_backfill_source(i))
        .map(PathologicalEventKey::of)
        .collect();
    if sources.is_empty() {
        return Vec::new();
    }

    let replacements: Vec<(usize, Interval)> = intervals
        .iter()
        .enumerate()
        .filter(|(_, i)| !i.message.is_pathological())
        .filter(|(_, i)| sources.contains(&PathologicalEventKey::of(i)))
        .map(|(index, i)| (index, i.with_annotation(annotations::PATHOLOGICAL, "true")))
        .collect();

    tracing::debug!(
        event = "pathological_backfill",
        sources = sources.len(),
        stamped = replacements.len(),
    );
    replacements
}

/// `intervals` with every backfilled copy in place of its original.
pub fn apply_pathological_backfill(intervals: &Intervals) -> Intervals {
    intervals.with_replacements(&backfill_pathological(intervals))
}

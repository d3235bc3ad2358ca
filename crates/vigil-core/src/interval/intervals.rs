//! Ordered interval collections.

use std::cmp::Ordering;
use std::ops::Deref;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interval::Interval;

/// Canonical ordering: by `from`, then `to` (open intervals last), then level,
/// locator and message. Gives deterministic artifacts for equal timestamps.
pub fn compare_intervals(a: &Interval, b: &Interval) -> Ordering {
    a.from
        .cmp(&b.from)
        .then_with(|| match (a.to, b.to) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| a.level.cmp(&b.level))
        .then_with(|| a.locator.legacy_string().cmp(&b.locator.legacy_string()))
        .then_with(|| a.message.legacy_string().cmp(&b.message.legacy_string()))
}

/// An owned sequence of intervals threaded through the pipeline.
///
/// Operations return new collections; no stage mutates a previous stage's
/// output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Intervals(Vec<Interval>);

impl Intervals {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, interval: Interval) {
        self.0.push(interval);
    }

    pub fn into_inner(self) -> Vec<Interval> {
        self.0
    }

    /// Sorted copy using [`compare_intervals`].
    pub fn sorted(&self) -> Self {
        let mut items = self.0.clone();
        items.sort_by(compare_intervals);
        Self(items)
    }

    pub fn sort(&mut self) {
        self.0.sort_by(compare_intervals);
    }

    pub fn is_sorted_by_from(&self) -> bool {
        self.0.windows(2).all(|w| w[0].from <= w[1].from)
    }

    pub fn filter(&self, predicate: impl Fn(&Interval) -> bool) -> Self {
        Self(self.0.iter().filter(|i| predicate(i)).cloned().collect())
    }

    /// Intervals overlapping `[from, to]`. Open intervals overlap everything
    /// after their start.
    pub fn cut(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.filter(|i| i.from <= to && i.to.map_or(true, |end| end >= from))
    }

    /// Concatenate two collections into a new one, unsorted.
    pub fn merge(&self, other: &Intervals) -> Self {
        let mut items = Vec::with_capacity(self.0.len() + other.0.len());
        items.extend_from_slice(&self.0);
        items.extend_from_slice(&other.0);
        Self(items)
    }

    /// New collection where each `(index, interval)` supersedes the original at
    /// that position. Out-of-range indices are ignored.
    pub fn with_replacements(&self, replacements: &[(usize, Interval)]) -> Self {
        let mut items = self.0.clone();
        for (index, interval) in replacements {
            if let Some(slot) = items.get_mut(*index) {
                *slot = interval.clone();
            }
        }
        Self(items)
    }
}

impl Deref for Intervals {
    type Target = [Interval];

    fn deref(&self) -> &[Interval] {
        &self.0
    }
}

impl From<Vec<Interval>> for Intervals {
    fn from(items: Vec<Interval>) -> Self {
        Self(items)
    }
}

impl FromIterator<Interval> for Intervals {
    fn from_iter<I: IntoIterator<Item = Interval>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Intervals {
    type Item = Interval;
    type IntoIter = std::vec::IntoIter<Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Intervals {
    type Item = &'a Interval;
    type IntoIter = std::slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Extend<Interval> for Intervals {
    fn extend<I: IntoIterator<Item = Interval>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

//! Shared, append-only interval recorder written to by collectors.
//!
//! Background samplers hold an `Arc<Recorder>` and record while the workload
//! runs. Aggregation only ever reads a [`Recorder::snapshot`], taken after
//! collection has stopped.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::errors::IntervalError;
use crate::interval::{Interval, Intervals};

/// Handle returned by [`Recorder::start_interval`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalId(usize);

impl IntervalId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Default)]
pub struct Recorder {
    intervals: Mutex<Vec<Interval>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    // A poisoned lock only means a collector thread panicked mid-push; the
    // Vec itself is still consistent.
    fn lock(&self) -> MutexGuard<'_, Vec<Interval>> {
        self.intervals
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a complete interval.
    pub fn record(&self, interval: Interval) {
        self.lock().push(interval);
    }

    pub fn record_all(&self, intervals: impl IntoIterator<Item = Interval>) {
        self.lock().extend(intervals);
    }

    /// Record an interval whose end is not yet known.
    pub fn start_interval(&self, interval: Interval) -> IntervalId {
        let mut guard = self.lock();
        guard.push(interval.with_to(None));
        IntervalId(guard.len() - 1)
    }

    /// Set the end of an interval previously started.
    pub fn end_interval(&self, id: IntervalId, to: DateTime<Utc>) -> Result<(), IntervalError> {
        let mut guard = self.lock();
        let slot = guard
            .get_mut(id.0)
            .ok_or(IntervalError::UnknownIntervalId { id: id.0 })?;
        *slot = slot.with_to(Some(to));
        Ok(())
    }

    /// Close every still-open interval at `end`.
    ///
    /// Returns how many intervals were closed.
    pub fn close_open(&self, end: DateTime<Utc>) -> usize {
        let mut guard = self.lock();
        let mut closed = 0;
        for slot in guard.iter_mut().filter(|i| i.is_open()) {
            // An interval started after `end` closes on itself.
            let to = if slot.from > end { slot.from } else { end };
            *slot = slot.with_to(Some(to));
            closed += 1;
        }
        if closed > 0 {
            tracing::debug!(event = "recorder_closed_open", closed, "closed open intervals");
        }
        closed
    }

    /// Sorted copy of everything recorded so far.
    pub fn snapshot(&self) -> Intervals {
        let mut intervals = Intervals::from(self.lock().clone());
        intervals.sort();
        intervals
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

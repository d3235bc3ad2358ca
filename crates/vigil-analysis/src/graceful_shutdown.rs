//! Graceful-shutdown window construction for API server pods.
//!
//! A pod announces shutdown with `ShutdownInitiated` or `TerminationStart`
//! and finishes with `TerminationGracefulTerminationFinished`. Each start is
//! paired with the next finish for the same namespace/pod/node.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use vigil_core::interval::{
    annotations, Interval, IntervalReason, IntervalSource, Intervals, Level, Locator, Message,
};

const CONSTRUCTED_BY: &str = "graceful-shutdown-analyzer";

/// Identity of one shutting-down server instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ShutdownKey {
    namespace: String,
    pod: String,
    node: String,
}

impl ShutdownKey {
    fn of(interval: &Interval) -> Self {
        let locator = &interval.locator;
        Self {
            namespace: locator.namespace().unwrap_or_default().to_string(),
            pod: locator.pod_name().unwrap_or_default().to_string(),
            node: locator.node_name().unwrap_or_default().to_string(),
        }
    }

    /// `openshift-kube-apiserver` serves `kube-apiserver`.
    fn server(&self) -> &str {
        self.namespace
            .strip_prefix("openshift-")
            .unwrap_or(&self.namespace)
    }

    fn locator(&self) -> Locator {
        Locator::server(self.server(), &self.node, &self.namespace, &self.pod)
    }
}

fn is_start(reason: &IntervalReason) -> bool {
    *reason == IntervalReason::SHUTDOWN_INITIATED || *reason == IntervalReason::TERMINATION_START
}

fn is_end(reason: &IntervalReason) -> bool {
    *reason == IntervalReason::TERMINATION_GRACEFUL_TERMINATION_FINISHED
}

/// Pair shutdown start and finish events into constructed windows.
///
/// `intervals` must be sorted by `from`. A finish without a start is bounded
/// by `beginning`. A start that never finishes yields an open `Error` window.
pub fn construct_graceful_shutdown_windows(
    beginning: DateTime<Utc>,
    intervals: &Intervals,
) -> Intervals {
    let mut open_starts: BTreeMap<ShutdownKey, DateTime<Utc>> = BTreeMap::new();
    let mut windows = Intervals::new();

    for interval in intervals {
        let reason = &interval.message.reason;
        if is_start(reason) {
            // Only the first start before a finish counts; nesting is not expected.
            open_starts
                .entry(ShutdownKey::of(interval))
                .or_insert(interval.from);
        } else if is_end(reason) {
            let key = ShutdownKey::of(interval);
            let start = match open_starts.remove(&key) {
                Some(start) => start,
                None => {
                    tracing::debug!(
                        event = "graceful_shutdown_unmatched_end",
                        namespace = %key.namespace,
                        pod = %key.pod,
                        "shutdown finished without a recorded start, using beginning of collection"
                    );
                    beginning
                }
            };
            windows.push(complete_window(&key, start, interval.end_or_from()));
        }
    }

    for (key, start) in open_starts {
        tracing::debug!(
            event = "graceful_shutdown_incomplete",
            namespace = %key.namespace,
            pod = %key.pod,
            node = %key.node,
            "shutdown never finished"
        );
        windows.push(incomplete_window(&key, start));
    }

    windows.sort();
    windows
}

fn complete_window(key: &ShutdownKey, from: DateTime<Utc>, to: DateTime<Utc>) -> Interval {
    Interval::builder(IntervalSource::APISERVER_GRACEFUL_SHUTDOWN, Level::Info)
        .locator(key.locator())
        .message(
            Message::builder()
                .reason(IntervalReason::GRACEFUL_SHUTDOWN_WINDOW)
                .human(format!("{} graceful shutdown window", key.server()))
                .annotation(annotations::CONSTRUCTED, CONSTRUCTED_BY)
                .build(),
        )
        .display()
        .build(from, Some(to))
}

fn incomplete_window(key: &ShutdownKey, from: DateTime<Utc>) -> Interval {
    Interval::builder(IntervalSource::APISERVER_GRACEFUL_SHUTDOWN, Level::Error)
        .locator(key.locator())
        .message(
            Message::builder()
                .reason(IntervalReason::INCOMPLETE_GRACEFUL_SHUTDOWN_WINDOW)
                .human(format!(
                    "{} started a graceful shutdown that did not finish before the end of collection",
                    key.server()
                ))
                .annotation(annotations::CONSTRUCTED, CONSTRUCTED_BY)
                .build(),
        )
        .display()
        .build(from, None)
}

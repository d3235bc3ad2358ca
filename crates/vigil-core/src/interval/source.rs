//! Open-ended tags for who produced an interval and why.
//!
//! Both are string newtypes with well-known constants rather than closed enums:
//! collectors outside this workspace mint their own values, and the tags must
//! survive a JSON round trip untouched.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies the collector that produced an interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalSource(Cow<'static, str>);

impl IntervalSource {
    pub const DISRUPTION: Self = Self(Cow::Borrowed("Disruption"));
    pub const KUBE_EVENT: Self = Self(Cow::Borrowed("KubeEvent"));
    pub const NODE_MONITOR: Self = Self(Cow::Borrowed("NodeMonitor"));
    pub const APISERVER_GRACEFUL_SHUTDOWN: Self =
        Self(Cow::Borrowed("APIServerGracefulShutdown"));
    pub const PATHOLOGICAL_EVENT_ANALYZER: Self =
        Self(Cow::Borrowed("PathologicalEventAnalyzer"));
    pub const AUDIT_LOG: Self = Self(Cow::Borrowed("AuditLog"));

    pub fn new(source: impl Into<String>) -> Self {
        Self(Cow::Owned(source.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IntervalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IntervalSource {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Enum-like tag on a structured message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalReason(Cow<'static, str>);

impl IntervalReason {
    // Graceful-shutdown window boundaries.
    pub const SHUTDOWN_INITIATED: Self = Self(Cow::Borrowed("ShutdownInitiated"));
    pub const TERMINATION_START: Self = Self(Cow::Borrowed("TerminationStart"));
    pub const TERMINATION_GRACEFUL_TERMINATION_FINISHED: Self =
        Self(Cow::Borrowed("TerminationGracefulTerminationFinished"));
    pub const GRACEFUL_SHUTDOWN_WINDOW: Self = Self(Cow::Borrowed("GracefulShutdownWindow"));
    pub const INCOMPLETE_GRACEFUL_SHUTDOWN_WINDOW: Self =
        Self(Cow::Borrowed("IncompleteGracefulShutdownWindow"));
    pub const GRACEFUL_TERMINATION_TIMEOUT: Self =
        Self(Cow::Borrowed("GracefulTerminationTimeout"));

    // Backend disruption sampling.
    pub const DISRUPTION_BEGAN: Self = Self(Cow::Borrowed("DisruptionBegan"));
    pub const DISRUPTION_ENDED: Self = Self(Cow::Borrowed("DisruptionEnded"));

    pub fn new(reason: impl Into<String>) -> Self {
        Self(Cow::Owned(reason.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for IntervalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IntervalReason {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

//! Matchers describing repeated events that are known and tolerated.

use std::collections::BTreeMap;

use regex::Regex;

use vigil_core::cluster::TopologyMode;
use vigil_core::errors::AnalysisError;
use vigil_core::interval::{Interval, Intervals};

/// Recognises a family of repeated events.
pub trait EventMatcher: Send + Sync {
    /// Unique CamelCase name used in logs and lookups.
    fn name(&self) -> &str;

    /// Whether the interval belongs to this family. Says nothing about
    /// whether repeating is acceptable.
    fn matches(&self, interval: &Interval) -> bool;

    /// Whether the interval may repeat as often as it did on this topology.
    fn allows(&self, interval: &Interval, topology: TopologyMode) -> bool;

    /// Bug tracking the underlying problem, if known.
    fn jira(&self) -> Option<&str> {
        None
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex, AnalysisError> {
    Regex::new(pattern).map_err(|e| AnalysisError::InvalidMatcher {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

/// Every configured field must match for the matcher to apply.
#[derive(Debug, Clone)]
pub struct SimplePathologicalEventMatcher {
    name: String,
    locator_key_regexes: BTreeMap<String, Regex>,
    reason_regex: Option<Regex>,
    human_regex: Option<Regex>,
    jira: Option<String>,
    /// Allows more repeats than the default threshold. Only consulted by
    /// `allows`; fewer repeats cannot be expressed since the matcher only runs
    /// once the threshold is crossed.
    repeat_threshold_override: Option<u32>,
    /// Flag events as interesting without ever allowing them to repeat.
    never_allow: bool,
    topology: Option<TopologyMode>,
}

impl SimplePathologicalEventMatcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            locator_key_regexes: BTreeMap::new(),
            reason_regex: None,
            human_regex: None,
            jira: None,
            repeat_threshold_override: None,
            never_allow: false,
            topology: None,
        }
    }

    pub fn with_locator_key(mut self, key: &str, pattern: &str) -> Result<Self, AnalysisError> {
        let regex = compile(&self.name, pattern)?;
        self.locator_key_regexes.insert(key.to_string(), regex);
        Ok(self)
    }

    pub fn with_reason(mut self, pattern: &str) -> Result<Self, AnalysisError> {
        self.reason_regex = Some(compile(&self.name, pattern)?);
        Ok(self)
    }

    pub fn with_human_message(mut self, pattern: &str) -> Result<Self, AnalysisError> {
        self.human_regex = Some(compile(&self.name, pattern)?);
        Ok(self)
    }

    pub fn with_jira(mut self, jira: impl Into<String>) -> Self {
        self.jira = Some(jira.into());
        self
    }

    pub fn with_repeat_threshold_override(mut self, threshold: u32) -> Self {
        self.repeat_threshold_override = Some(threshold);
        self
    }

    pub fn never_allow(mut self) -> Self {
        self.never_allow = true;
        self
    }

    pub fn only_on(mut self, topology: TopologyMode) -> Self {
        self.topology = Some(topology);
        self
    }
}

impl EventMatcher for SimplePathologicalEventMatcher {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, interval: &Interval) -> bool {
        for (key, regex) in &self.locator_key_regexes {
            let value = interval.locator.get(key).unwrap_or_default();
            if !regex.is_match(value) {
                tracing::trace!(matcher = %self.name, key = %key, "locator key did not match");
                return false;
            }
        }
        if let Some(regex) = &self.human_regex {
            if !regex.is_match(&interval.message.human_message) {
                return false;
            }
        }
        if let Some(regex) = &self.reason_regex {
            if !regex.is_match(interval.message.reason.as_str()) {
                return false;
            }
        }
        true
    }

    fn allows(&self, interval: &Interval, topology: TopologyMode) -> bool {
        if self.never_allow || !self.matches(interval) {
            return false;
        }
        if let Some(threshold) = self.repeat_threshold_override {
            let count = interval.message.times();
            if count > threshold {
                tracing::debug!(
                    matcher = %self.name,
                    count,
                    threshold,
                    "event repeated over threshold override"
                );
                return false;
            }
        }
        if let Some(required) = self.topology {
            if required != topology {
                return false;
            }
        }
        true
    }

    fn jira(&self) -> Option<&str> {
        self.jira.as_deref()
    }
}

/// Allows an event only while it lies strictly inside one of a set of other
/// intervals, e.g. connection errors during an API server restart.
#[derive(Debug, Clone)]
pub struct OverlapOtherIntervalsMatcher {
    delegate: SimplePathologicalEventMatcher,
    allow_if_within: Intervals,
}

impl OverlapOtherIntervalsMatcher {
    pub fn new(delegate: SimplePathologicalEventMatcher, allow_if_within: Intervals) -> Self {
        Self {
            delegate,
            allow_if_within,
        }
    }
}

impl EventMatcher for OverlapOtherIntervalsMatcher {
    fn name(&self) -> &str {
        self.delegate.name()
    }

    fn matches(&self, interval: &Interval) -> bool {
        self.delegate.matches(interval)
    }

    fn allows(&self, interval: &Interval, topology: TopologyMode) -> bool {
        if !self.delegate.allows(interval, topology) {
            return false;
        }
        let end = interval.end_or_from();
        self.allow_if_within.iter().any(|outer| {
            outer.from < interval.from && outer.to.map_or(false, |outer_to| outer_to > end)
        })
    }

    fn jira(&self) -> Option<&str> {
        self.delegate.jira()
    }
}

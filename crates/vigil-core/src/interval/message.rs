//! Structured interval messages.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::source::IntervalReason;

/// Well-known annotation keys.
pub mod annotations {
    pub const PATHOLOGICAL: &str = "pathological";
    pub const INTERESTING: &str = "interesting";
    pub const STATUS: &str = "status";
    pub const COUNT: &str = "count";
    pub const CONSTRUCTED: &str = "constructed";
    pub const REQUEST_AUDIT_ID: &str = "request-audit-id";
}

const TRUE: &str = "true";

/// Matches kube event messages that carry their own repeat count,
/// e.g. `Back-off restarting failed container (42 times)`.
fn repeat_count_extractor() -> &'static Regex {
    static EXTRACTOR: OnceLock<Regex> = OnceLock::new();
    EXTRACTOR.get_or_init(|| {
        Regex::new(r"(?s)(.*) \((\d+) times\).*").expect("repeat count pattern is valid")
    })
}

/// Reason, free text and annotations describing an interval.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub reason: IntervalReason,
    pub human_message: String,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
}

impl Message {
    pub fn builder() -> MessageBuilder {
        MessageBuilder::default()
    }

    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.annotations.get(key).map(String::as_str)
    }

    pub fn is_pathological(&self) -> bool {
        self.annotation(annotations::PATHOLOGICAL) == Some(TRUE)
    }

    pub fn is_interesting(&self) -> bool {
        self.annotation(annotations::INTERESTING) == Some(TRUE)
    }

    /// Copy of this message with one more annotation.
    pub fn with_annotation(&self, key: &str, value: &str) -> Self {
        let mut copy = self.clone();
        copy.annotations.insert(key.to_string(), value.to_string());
        copy
    }

    /// How many times the underlying event was observed.
    ///
    /// Prefers the `count` annotation and falls back to a `(N times)` suffix in
    /// the human message. Returns 0 when neither is present.
    pub fn times(&self) -> u32 {
        if let Some(count) = self
            .annotation(annotations::COUNT)
            .and_then(|c| c.parse::<u32>().ok())
        {
            return count;
        }
        repeat_count_extractor()
            .captures(&self.human_message)
            .and_then(|caps| caps.get(2))
            .and_then(|m| m.as_str().parse::<u32>().ok())
            .unwrap_or(0)
    }

    /// Legacy flattened form: `reason/R key/value ... human message`.
    pub fn legacy_string(&self) -> String {
        let mut parts = Vec::with_capacity(self.annotations.len() + 2);
        if !self.reason.is_empty() {
            parts.push(format!("reason/{}", self.reason));
        }
        for (key, value) in &self.annotations {
            parts.push(format!("{key}/{value}"));
        }
        if !self.human_message.is_empty() {
            parts.push(self.human_message.clone());
        }
        parts.join(" ")
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.legacy_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    message: Message,
}

impl MessageBuilder {
    pub fn reason(mut self, reason: IntervalReason) -> Self {
        self.message.reason = reason;
        self
    }

    pub fn human(mut self, human_message: impl Into<String>) -> Self {
        self.message.human_message = human_message.into();
        self
    }

    pub fn annotation(mut self, key: &str, value: impl Into<String>) -> Self {
        self.message.annotations.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Message {
        self.message
    }
}

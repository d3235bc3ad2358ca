use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::level::Level;
use super::locator::Locator;
use super::message::Message;
use super::source::IntervalSource;

/// The atomic unit of observation.
///
/// `to == None` means the interval is still open (unterminated). Intervals are
/// never mutated after being built; derived intervals are new values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    pub level: Level,
    pub source: IntervalSource,
    pub locator: Locator,
    pub message: Message,
    #[serde(default)]
    pub display: bool,
    pub from: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<DateTime<Utc>>,
}

impl Interval {
    pub fn builder(source: IntervalSource, level: Level) -> IntervalBuilder {
        IntervalBuilder::new(source, level)
    }

    pub fn is_open(&self) -> bool {
        self.to.is_none()
    }

    /// `from <= to`, or still open.
    pub fn is_well_formed(&self) -> bool {
        self.to.map_or(true, |to| self.from <= to)
    }

    /// Elapsed time. Open intervals and skewed spans (`to < from`) count as zero.
    pub fn duration(&self) -> Duration {
        match self.to {
            Some(to) => (to - self.from).to_std().unwrap_or(Duration::ZERO),
            None => Duration::ZERO,
        }
    }

    /// The end of this interval, treating an open one as an instant.
    pub fn end_or_from(&self) -> DateTime<Utc> {
        self.to.unwrap_or(self.from)
    }

    /// Copy of this interval with an extra message annotation.
    pub fn with_annotation(&self, key: &str, value: &str) -> Self {
        Self {
            message: self.message.with_annotation(key, value),
            ..self.clone()
        }
    }

    /// Copy of this interval with a new end.
    pub fn with_to(&self, to: Option<DateTime<Utc>>) -> Self {
        Self { to, ..self.clone() }
    }

    /// Single-line human rendering used in JUnit output.
    pub fn legacy_string(&self) -> String {
        let to = self
            .to
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "<open>".to_string());
        format!(
            "{} - {} {} {} {}",
            self.from.to_rfc3339(),
            to,
            self.level,
            self.locator.legacy_string(),
            self.message.legacy_string()
        )
    }
}

/// Builder mirroring the collector-side construction of intervals.
#[derive(Debug, Clone)]
pub struct IntervalBuilder {
    level: Level,
    source: IntervalSource,
    locator: Option<Locator>,
    message: Message,
    display: bool,
}

impl IntervalBuilder {
    pub fn new(source: IntervalSource, level: Level) -> Self {
        Self {
            level,
            source,
            locator: None,
            message: Message::default(),
            display: false,
        }
    }

    pub fn locator(mut self, locator: Locator) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn message(mut self, message: Message) -> Self {
        self.message = message;
        self
    }

    /// Mark the interval for display in timeline charts.
    pub fn display(mut self) -> Self {
        self.display = true;
        self
    }

    pub fn build(self, from: DateTime<Utc>, to: Option<DateTime<Utc>>) -> Interval {
        let locator = self.locator.unwrap_or_else(|| Locator {
            locator_type: super::locator::LocatorType::Other,
            keys: Default::default(),
        });
        Interval {
            level: self.level,
            source: self.source,
            locator,
            message: self.message,
            display: self.display,
            from,
            to,
        }
    }
}

//! Loki push API payload.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use vigil_core::errors::StorageError;
use vigil_core::interval::Interval;

/// Value of the `type` stream label for every pushed interval.
pub const INTERVAL_STREAM_TYPE: &str = "origin-interval";

/// Body of `POST /loki/api/v1/push`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushRequest {
    pub streams: Vec<LokiStream>,
}

/// One label set and its `[nanosecond timestamp, line]` entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LokiStream {
    pub stream: BTreeMap<String, String>,
    pub values: Vec<[String; 2]>,
}

impl PushRequest {
    pub fn entry_count(&self) -> usize {
        self.streams.iter().map(|s| s.values.len()).sum()
    }
}

/// One stream per interval source; each line is the interval's JSON encoding
/// stamped with its start time.
pub fn build_push_request(batch: &[Interval], invoker: &str) -> Result<PushRequest, StorageError> {
    let mut streams: BTreeMap<&str, Vec<[String; 2]>> = BTreeMap::new();
    for interval in batch {
        let line = serde_json::to_string(interval).map_err(|e| StorageError::Serialization {
            artifact: "loki push".to_string(),
            message: e.to_string(),
        })?;
        // Only unrepresentable outside 1677..2262.
        let timestamp = interval.from.timestamp_nanos_opt().unwrap_or_default();
        streams
            .entry(interval.source.as_str())
            .or_default()
            .push([timestamp.to_string(), line]);
    }

    let streams = streams
        .into_iter()
        .map(|(source, values)| LokiStream {
            stream: BTreeMap::from([
                ("invoker".to_string(), invoker.to_string()),
                ("type".to_string(), INTERVAL_STREAM_TYPE.to_string()),
                ("src".to_string(), source.to_string()),
            ]),
            values,
        })
        .collect();
    Ok(PushRequest { streams })
}

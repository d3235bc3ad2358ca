//! Serialize `std::time::Duration` as integer nanoseconds.
//!
//! Consumers of the disruption artifact decode the field as a Go
//! `time.Duration`, which is an `int64` nanosecond count.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    let nanos = i64::try_from(duration.as_nanos()).unwrap_or(i64::MAX);
    serializer.serialize_i64(nanos)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let nanos = i64::deserialize(deserializer)?;
    // Negative durations never leave this process; clamp foreign ones.
    Ok(Duration::from_nanos(u64::try_from(nanos).unwrap_or(0)))
}

//! Protobuf ↔ domain conversions for timestamps
//!
//! Upstream messages carry times as Unix seconds (`int64`). These helpers
//! turn them into `DateTime<Utc>` and back.

use chrono::{DateTime, Utc};

/// Convert DateTime<Utc> to Unix timestamp (seconds since epoch)
pub fn datetime_to_timestamp(dt: DateTime<Utc>) -> i64 {
  dt.timestamp()
}

/// Convert Unix timestamp to DateTime<Utc>
///
/// Out-of-range values collapse to the Unix epoch.
pub fn timestamp_to_datetime(timestamp: i64) -> DateTime<Utc> {
  DateTime::from_timestamp(timestamp, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

//! Timestamp helpers for ledger rows and log markers.

use chrono::{DateTime, SecondsFormat, Utc};

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Formats a timestamp the way ledger rows store it.
///
/// The format is RFC 3339 with second precision and an explicit offset:
/// `YYYY-MM-DDTHH:MM:SS+00:00`
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use claimload::utils::format_timestamp;
///
/// let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
/// assert_eq!(format_timestamp(&ts), "2024-05-01T09:30:00+00:00");
/// ```
#[must_use]
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, false)
}

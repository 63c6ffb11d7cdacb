//! Date/time helpers shared by stored names, archive names, and API output.

use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};

/// Format used for the `<date>_<time>` prefix of stored and archive names.
///
/// Colons are replaced by hyphens so the result is safe in filenames.
pub const FILENAME_STAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Render a UTC instant as `YYYY-MM-DD_HH-MM-SS`.
pub fn filename_stamp(dt: &DateTime<Utc>) -> String {
    dt.format(FILENAME_STAMP_FORMAT).to_string()
}

/// Build a UTC instant from a millisecond epoch.
///
/// Out-of-range values clamp to the Unix epoch.
pub fn from_epoch_millis(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

/// Convert a filesystem timestamp to UTC.
pub fn from_system_time(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

/// RFC3339 with millisecond precision and a `Z` suffix, as used in API responses.
pub fn to_rfc3339(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

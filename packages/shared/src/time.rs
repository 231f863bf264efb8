//! Timestamp helpers.
//!
//! All wire-level timestamps are UTC RFC 3339 strings with millisecond
//! precision; unix milliseconds are used where a numeric value is handier
//! (e.g. connection bookkeeping).

use chrono::{SecondsFormat, Utc};

/// Current time as an RFC 3339 string with millisecond precision, e.g.
/// `2026-08-30T12:34:56.789Z`.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Current unix timestamp in milliseconds.
pub fn unix_millis() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iso_timestamp_format() {
        let ts = iso_timestamp();
        // RFC 3339 with trailing Z and millisecond fraction
        assert!(ts.ends_with('Z'));
        assert!(ts.contains('.'));
        assert!(chrono::DateTime::parse_from_rfc3339(&ts).is_ok());
    }

    #[test]
    fn test_unix_millis_is_recent() {
        // 2020-01-01 in millis; anything earlier means a broken clock source
        assert!(unix_millis() > 1_577_836_800_000);
    }
}

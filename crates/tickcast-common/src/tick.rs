//! The broadcast wire message.
//!
//! Every tick the server sends one JSON text frame per subscriber:
//!
//! ```json
//! {"timestamp":"2024-01-01T00:00:00.123","value":42}
//! ```
//!
//! The timestamp is rendered in the server's local time zone without an
//! offset, truncated to milliseconds.

use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// `YYYY-MM-DDTHH:MM:SS.mmm`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: String,
    pub value: i64,
}

impl Tick {
    pub fn new(timestamp: String, value: i64) -> Self {
        Self { timestamp, value }
    }

    /// Encode to the JSON text sent on the wire.
    pub fn to_json(&self) -> String {
        // A struct of a String and an i64 always serializes.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Parse the timestamp field back into a naive local date-time.
    pub fn parsed_timestamp(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }
}

/// Render a clock reading in its own time zone with millisecond precision.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Timelike, Utc};

    #[test]
    fn formats_millis_without_offset() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(format_timestamp(&at), "2024-01-01T00:00:00.123");
    }

    #[test]
    fn pads_millis_to_three_digits() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 2).unwrap()
            + chrono::Duration::milliseconds(7);
        assert_eq!(format_timestamp(&at), "2024-03-09T07:05:02.007");
    }

    #[test]
    fn truncates_sub_millisecond_precision() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::microseconds(123_999);
        assert_eq!(format_timestamp(&at), "2024-01-01T00:00:00.123");
    }

    #[test]
    fn json_shape_matches_wire_schema() {
        let tick = Tick::new("2024-01-01T00:00:00.123".into(), 42);
        assert_eq!(
            tick.to_json(),
            r#"{"timestamp":"2024-01-01T00:00:00.123","value":42}"#
        );
    }

    #[test]
    fn decodes_wire_message_and_timestamp() {
        let tick = Tick::from_json(r#"{"timestamp":"2024-05-06T12:34:56.789","value":255}"#)
            .unwrap();
        assert_eq!(tick.value, 255);

        let parsed = tick.parsed_timestamp().unwrap();
        assert_eq!(parsed.hour(), 12);
        assert_eq!(parsed.nanosecond(), 789_000_000);
    }

    #[test]
    fn rejects_message_without_value() {
        assert!(Tick::from_json(r#"{"timestamp":"2024-01-01T00:00:00.000"}"#).is_err());
    }

    #[test]
    fn unparseable_timestamp_yields_none() {
        let tick = Tick::new("yesterday".into(), 1);
        assert!(tick.parsed_timestamp().is_none());
    }
}

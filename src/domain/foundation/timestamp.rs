//! Timestamp value object for immutable points in time.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// Immutable point in time, always UTC. Serializes as ISO-8601.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Creates a timestamp for the current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a DateTime<Utc>.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parses an RFC 3339 / ISO-8601 string.
    pub fn parse_rfc3339(value: &str) -> Result<Self, chrono::ParseError> {
        Ok(Self(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc)))
    }

    /// Returns the inner DateTime.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Checks if this timestamp is before another.
    pub fn is_before(&self, other: &Timestamp) -> bool {
        self.0 < other.0
    }

    /// Returns the duration from another timestamp to this one.
    ///
    /// Returns negative duration if other is after self.
    pub fn duration_since(&self, other: &Timestamp) -> Duration {
        self.0.signed_duration_since(other.0)
    }

    /// Creates a new timestamp by adding the specified number of minutes.
    pub fn plus_minutes(&self, minutes: i64) -> Self {
        Self(self.0 + Duration::minutes(minutes))
    }

    /// Hour of day (0-23) and weekday as observed at the given UTC offset.
    ///
    /// Offsets outside +/-18h are treated as UTC.
    pub fn local_hour_and_weekday(&self, utc_offset_minutes: i32) -> (u32, Weekday) {
        match FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60)) {
            Some(offset) => {
                let local = self.0.with_timezone(&offset);
                (local.hour(), local.weekday())
            }
            None => (self.0.hour(), self.0.weekday()),
        }
    }

    /// ISO-8601 representation.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339()
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(value: &str) -> Timestamp {
        Timestamp::parse_rfc3339(value).unwrap()
    }

    #[test]
    fn timestamp_now_creates_current_time() {
        let before = Utc::now();
        let ts = Timestamp::now();
        let after = Utc::now();

        assert!(ts.as_datetime() >= &before);
        assert!(ts.as_datetime() <= &after);
    }

    #[test]
    fn timestamp_serializes_to_iso8601() {
        let ts = at("2024-01-15T10:30:00Z");
        let json = serde_json::to_string(&ts).unwrap();
        assert!(json.contains("2024-01-15T10:30:00"));
    }

    #[test]
    fn timestamp_deserializes_from_json() {
        let ts: Timestamp = serde_json::from_str("\"2024-01-15T10:30:00Z\"").unwrap();
        assert_eq!(ts.as_datetime().year(), 2024);
    }

    #[test]
    fn local_hour_applies_offset() {
        // 2024-01-15 is a Monday.
        let ts = at("2024-01-15T03:00:00Z");
        assert_eq!(ts.local_hour_and_weekday(0), (3, Weekday::Mon));
        assert_eq!(ts.local_hour_and_weekday(-300), (22, Weekday::Sun));
    }

    #[test]
    fn out_of_range_offset_falls_back_to_utc() {
        let ts = at("2024-01-15T03:00:00Z");
        assert_eq!(ts.local_hour_and_weekday(100_000).0, 3);
    }

    #[test]
    fn plus_minutes_and_ordering() {
        let ts1 = at("2024-01-15T10:00:00Z");
        let ts2 = ts1.plus_minutes(90);
        assert!(ts1.is_before(&ts2));
        assert_eq!(ts2.duration_since(&ts1), Duration::minutes(90));
    }
}

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CheckInId, Timestamp, UserId, ValidationError};

/// Longest accepted check-in text, in characters.
pub const MAX_TEXT_CHARS: usize = 10_000;

/// Largest accepted local-time offset from UTC (18 hours).
pub const MAX_UTC_OFFSET_MINUTES: i32 = 18 * 60;

/// A single free-text check-in submitted by a user.
///
/// Immutable once created. Empty or whitespace-only text is a valid
/// check-in; it simply scores zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckIn {
    checkin_id: CheckInId,
    user_id: UserId,
    text: String,
    timestamp: Timestamp,
    #[serde(default)]
    utc_offset_minutes: i32,
}

impl CheckIn {
    /// Creates a check-in observed in UTC.
    pub fn new(
        checkin_id: CheckInId,
        user_id: UserId,
        text: impl Into<String>,
        timestamp: Timestamp,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        let chars = text.chars().count();
        if chars > MAX_TEXT_CHARS {
            return Err(ValidationError::out_of_range(
                "text",
                0.0,
                MAX_TEXT_CHARS as f64,
                chars as f64,
            ));
        }

        Ok(Self {
            checkin_id,
            user_id,
            text,
            timestamp,
            utc_offset_minutes: 0,
        })
    }

    /// Records the user's local offset from UTC, used for the time-of-day factor.
    pub fn with_utc_offset(mut self, minutes: i32) -> Result<Self, ValidationError> {
        if minutes.abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(ValidationError::out_of_range(
                "utc_offset_minutes",
                -(MAX_UTC_OFFSET_MINUTES as f64),
                MAX_UTC_OFFSET_MINUTES as f64,
                minutes as f64,
            ));
        }
        self.utc_offset_minutes = minutes;
        Ok(self)
    }

    pub fn checkin_id(&self) -> &CheckInId {
        &self.checkin_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn utc_offset_minutes(&self) -> i32 {
        self.utc_offset_minutes
    }

    /// True when there is nothing to analyze.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    #[test]
    fn new_accepts_empty_text() {
        let checkin = CheckIn::new(CheckInId::new(), user(), "   ", Timestamp::now()).unwrap();
        assert!(checkin.is_blank());
        assert_eq!(checkin.utc_offset_minutes(), 0);
    }

    #[test]
    fn new_rejects_oversized_text() {
        let text = "a".repeat(MAX_TEXT_CHARS + 1);
        let result = CheckIn::new(CheckInId::new(), user(), text, Timestamp::now());
        assert!(matches!(result, Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn with_utc_offset_validates_range() {
        let checkin = CheckIn::new(CheckInId::new(), user(), "ok", Timestamp::now()).unwrap();
        assert!(checkin.clone().with_utc_offset(-300).is_ok());
        assert!(checkin.with_utc_offset(MAX_UTC_OFFSET_MINUTES + 1).is_err());
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let checkin = CheckIn::new(
            CheckInId::parse("c-1").unwrap(),
            user(),
            "hello",
            Timestamp::parse_rfc3339("2024-01-15T10:00:00Z").unwrap(),
        )
        .unwrap();
        let json = serde_json::to_value(&checkin).unwrap();
        assert_eq!(json["checkinId"], "c-1");
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["utcOffsetMinutes"], 0);
    }
}

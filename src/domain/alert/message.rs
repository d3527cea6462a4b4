//! Notification text templates.

use serde::{Deserialize, Serialize};

use super::{AlertLevel, Channel};
use crate::domain::foundation::{CheckInId, UserId};
use crate::domain::risk::RiskAssessment;

/// Longest check-in excerpt included in a notification, in characters.
pub const PREVIEW_CHARS: usize = 100;

pub const CRISIS_LINE: &str = "Veterans Crisis Line: dial 988 then press 1, or text 838255";
pub const CRISIS_URL: &str = "https://www.veteranscrisisline.net";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

impl AlertMessage {
    /// Message for an alert task at the given level.
    pub fn for_alert(
        level: AlertLevel,
        user_id: &UserId,
        text: &str,
        assessment: &RiskAssessment,
    ) -> Self {
        let preview = preview(text);
        let (subject, lead) = match level {
            AlertLevel::Crisis => (
                format!("CRISIS: {} may be in immediate danger", user_id),
                "Crisis indicators were detected in a check-in. Please reach out now.",
            ),
            AlertLevel::Immediate => (
                format!("Urgent: {} needs support today", user_id),
                "Serious distress was detected in a check-in. Please reach out as soon as you can.",
            ),
            AlertLevel::Standard => (
                format!("Check-in alert: {} needs support", user_id),
                "Signs of emotional distress were detected. Please consider reaching out today.",
            ),
            AlertLevel::Proactive => (
                "Checking in on you".to_string(),
                "Your recent check-ins suggest things have been getting harder. You don't have to handle it alone.",
            ),
            AlertLevel::FailureNotice => (
                format!("Alert delivery problem for {}", user_id),
                "An alert could not be delivered.",
            ),
        };

        // Outreach goes to the user, so their own words are not echoed back.
        let mut body = if level == AlertLevel::Proactive {
            lead.to_string()
        } else {
            format!(
                "{}\n\nRisk score: {}\nCheck-in: \"{}\"",
                lead,
                assessment.risk_score(),
                preview
            )
        };
        body.push_str(&format!("\n\nResources:\n{}\n{}", CRISIS_LINE, CRISIS_URL));

        Self { subject, body }
    }

    /// Message reporting that a task exhausted its retries.
    pub fn failure_notice(
        checkin_id: &CheckInId,
        user_id: &UserId,
        failed_level: AlertLevel,
        failed_channel: Channel,
        error: &str,
    ) -> Self {
        Self {
            subject: format!(
                "Alert delivery failed: {} via {}",
                failed_level, failed_channel
            ),
            body: format!(
                "A {} alert for user {} (check-in {}) could not be delivered via {} after all retries.\nLast error: {}\nManual follow-up is required.",
                failed_level, user_id, checkin_id, failed_channel, error
            ),
        }
    }
}

/// Truncates check-in text for notifications, on a character boundary.
pub fn preview(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= PREVIEW_CHARS {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(PREVIEW_CHARS).collect();
    format!("{}...", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{RiskScore, Timestamp};
    use std::collections::BTreeSet;

    fn assessment() -> RiskAssessment {
        RiskAssessment::new(
            CheckInId::parse("c-1").unwrap(),
            RiskScore::new(96.0),
            BTreeSet::new(),
            Timestamp::now(),
        )
    }

    #[test]
    fn preview_truncates_long_text() {
        let text = "é".repeat(150);
        let p = preview(&text);
        assert_eq!(p.chars().count(), PREVIEW_CHARS + 3);
        assert!(p.ends_with("..."));
    }

    #[test]
    fn preview_keeps_short_text() {
        assert_eq!(preview("  short  "), "short");
    }

    #[test]
    fn crisis_message_includes_preview_and_resources() {
        let user = UserId::new("u-7").unwrap();
        let message = AlertMessage::for_alert(AlertLevel::Crisis, &user, "I can't do this", &assessment());
        assert!(message.subject.starts_with("CRISIS"));
        assert!(message.body.contains("I can't do this"));
        assert!(message.body.contains(CRISIS_LINE));
    }

    #[test]
    fn outreach_message_does_not_echo_text() {
        let user = UserId::new("u-7").unwrap();
        let message = AlertMessage::for_alert(AlertLevel::Proactive, &user, "private words", &assessment());
        assert!(!message.body.contains("private words"));
        assert!(message.body.contains(CRISIS_URL));
    }

    #[test]
    fn failure_notice_names_channel() {
        let message = AlertMessage::failure_notice(
            &CheckInId::parse("c-1").unwrap(),
            &UserId::new("u-7").unwrap(),
            AlertLevel::Crisis,
            Channel::OpsTeam,
            "timed out",
        );
        assert!(message.subject.contains("ops_team"));
        assert!(message.body.contains("timed out"));
    }
}

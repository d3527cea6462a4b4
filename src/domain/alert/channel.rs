use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::CheckInId;
use crate::domain::profile::ContactMethod;

/// Severity label attached to every dispatch task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    Proactive,
    Standard,
    Immediate,
    Crisis,
    /// A lower-priority notice that another task exhausted its retries.
    FailureNotice,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Proactive => "proactive",
            AlertLevel::Standard => "standard",
            AlertLevel::Immediate => "immediate",
            AlertLevel::Crisis => "crisis",
            AlertLevel::FailureNotice => "failure_notice",
        }
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification destination. Each channel has its own circuit breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    TrustedContactSms,
    TrustedContactEmail,
    OpsTeam,
    UserOutreach,
    OpsEscalation,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::TrustedContactSms,
        Channel::TrustedContactEmail,
        Channel::OpsTeam,
        Channel::UserOutreach,
        Channel::OpsEscalation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::TrustedContactSms => "trusted_contact_sms",
            Channel::TrustedContactEmail => "trusted_contact_email",
            Channel::OpsTeam => "ops_team",
            Channel::UserOutreach => "user_outreach",
            Channel::OpsEscalation => "ops_escalation",
        }
    }

    /// Trusted-contact channel for a contact method.
    pub fn for_contact(method: ContactMethod) -> Self {
        match method {
            ContactMethod::Sms => Channel::TrustedContactSms,
            ContactMethod::Email => Channel::TrustedContactEmail,
        }
    }

    /// Name of the breaker guarding this channel.
    pub fn dependency_name(&self) -> String {
        format!("channel:{}", self.as_str())
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// At most one successful delivery exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdempotencyKey {
    pub checkin_id: CheckInId,
    pub level: AlertLevel,
    pub channel: Channel,
}

impl IdempotencyKey {
    pub fn new(checkin_id: CheckInId, level: AlertLevel, channel: Channel) -> Self {
        Self {
            checkin_id,
            level,
            channel,
        }
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.checkin_id, self.level, self.channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idempotency_key_display_joins_parts() {
        let key = IdempotencyKey::new(
            CheckInId::parse("c-9").unwrap(),
            AlertLevel::Crisis,
            Channel::OpsTeam,
        );
        assert_eq!(key.to_string(), "c-9:crisis:ops_team");
    }

    #[test]
    fn channel_dependency_names_are_distinct() {
        let names: std::collections::HashSet<String> =
            Channel::ALL.iter().map(|c| c.dependency_name()).collect();
        assert_eq!(names.len(), Channel::ALL.len());
    }

    #[test]
    fn contact_method_maps_to_channel() {
        assert_eq!(Channel::for_contact(ContactMethod::Sms), Channel::TrustedContactSms);
        assert_eq!(Channel::for_contact(ContactMethod::Email), Channel::TrustedContactEmail);
    }
}

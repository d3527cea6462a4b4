use serde::{Deserialize, Serialize};

use super::{AlertLevel, Channel, IdempotencyKey};
use crate::domain::foundation::{CheckInId, Timestamp, UserId};

/// Emitted once per dispatch attempt, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertEvent {
    pub checkin_id: CheckInId,
    pub user_id: UserId,
    pub level: AlertLevel,
    pub channel: Channel,
    pub attempt: u32,
    pub idempotency_key: IdempotencyKey,
    pub occurred_at: Timestamp,
}

impl AlertEvent {
    pub fn attempt(key: &IdempotencyKey, user_id: &UserId, attempt: u32) -> Self {
        Self {
            checkin_id: key.checkin_id.clone(),
            user_id: user_id.clone(),
            level: key.level,
            channel: key.channel,
            attempt,
            idempotency_key: key.clone(),
            occurred_at: Timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_copies_key_fields() {
        let key = IdempotencyKey::new(
            CheckInId::parse("c-1").unwrap(),
            AlertLevel::Standard,
            Channel::TrustedContactSms,
        );
        let event = AlertEvent::attempt(&key, &UserId::new("u-1").unwrap(), 2);
        assert_eq!(event.level, AlertLevel::Standard);
        assert_eq!(event.channel, Channel::TrustedContactSms);
        assert_eq!(event.attempt, 2);

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["idempotencyKey"]["channel"], "trusted_contact_sms");
    }
}

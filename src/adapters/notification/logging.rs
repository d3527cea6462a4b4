//! Notification sender that only logs.
//!
//! Used when no transport is configured for a deployment, so alerts still
//! leave a structured trail that on-call tooling can pick up.

use async_trait::async_trait;
use tracing::info;

use crate::ports::{ChannelError, Notification, NotificationSender};

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotificationSender;

impl LoggingNotificationSender {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSender for LoggingNotificationSender {
    async fn send(&self, notification: &Notification) -> Result<(), ChannelError> {
        info!(
            channel = %notification.channel,
            user_id = %notification.user_id,
            idempotency_key = %notification.idempotency_key,
            recipient = ?notification.recipient,
            subject = %notification.message.subject,
            "Alert notification"
        );
        Ok(())
    }
}

//! Mock notification sender for tests and local runs.
//!
//! Records every notification it is asked to send. Failures can be queued
//! in order, or pinned to a channel so that every send through it fails.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::alert::Channel;
use crate::ports::{ChannelError, Notification, NotificationSender};

#[derive(Debug, Clone, Default)]
pub struct MockNotificationSender {
    responses: Arc<Mutex<VecDeque<Result<(), ChannelError>>>>,
    channel_failures: Arc<Mutex<HashMap<Channel, ChannelError>>>,
    default_error: Option<ChannelError>,
    delay: Duration,
    sent: Arc<Mutex<Vec<Notification>>>,
    attempts: Arc<Mutex<Vec<Notification>>>,
}

impl MockNotificationSender {
    /// A sender that delivers everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails with `error` unless a queued response says otherwise.
    pub fn always_failing(error: ChannelError) -> Self {
        Self {
            default_error: Some(error),
            ..Self::default()
        }
    }

    /// Queues the outcome of the next send.
    pub fn with_response(self, response: Result<(), ChannelError>) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
        self
    }

    pub fn with_error(self, error: ChannelError) -> Self {
        self.with_response(Err(error))
    }

    /// Every send through `channel` fails with `error`.
    pub fn failing_channel(self, channel: Channel, error: ChannelError) -> Self {
        self.channel_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(channel, error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Notifications that were delivered.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Delivered notifications for one channel.
    pub fn sent_to(&self, channel: Channel) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|n| n.channel == channel)
            .collect()
    }

    /// Every send call, delivered or not.
    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn next_response(&self, channel: Channel) -> Result<(), ChannelError> {
        if let Some(error) = self
            .channel_failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&channel)
        {
            return Err(error.clone());
        }
        if let Some(queued) = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            return queued;
        }
        match &self.default_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send(&self, notification: &Notification) -> Result<(), ChannelError> {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.next_response(notification.channel)?;
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::{AlertLevel, AlertMessage, IdempotencyKey};
    use crate::domain::foundation::{CheckInId, UserId};
    use crate::ports::Recipient;

    fn notification(channel: Channel) -> Notification {
        Notification {
            channel,
            recipient: Recipient::Operations,
            message: AlertMessage {
                subject: "s".into(),
                body: "b".into(),
            },
            idempotency_key: IdempotencyKey::new(CheckInId::new(), AlertLevel::Crisis, channel),
            user_id: UserId::new("u-1").unwrap(),
        }
    }

    #[tokio::test]
    async fn queued_responses_are_consumed_in_order() {
        let sender = MockNotificationSender::new()
            .with_error(ChannelError::unavailable("503"))
            .with_response(Ok(()));

        assert!(sender.send(&notification(Channel::OpsTeam)).await.is_err());
        assert!(sender.send(&notification(Channel::OpsTeam)).await.is_ok());
        assert!(sender.send(&notification(Channel::OpsTeam)).await.is_ok());
        assert_eq!(sender.sent_count(), 2);
        assert_eq!(sender.attempt_count(), 3);
    }

    #[tokio::test]
    async fn failing_channel_only_affects_that_channel() {
        let sender = MockNotificationSender::new()
            .failing_channel(Channel::TrustedContactSms, ChannelError::unavailable("sms down"));

        assert!(sender.send(&notification(Channel::TrustedContactSms)).await.is_err());
        assert!(sender.send(&notification(Channel::OpsTeam)).await.is_ok());
        assert_eq!(sender.sent_to(Channel::OpsTeam).len(), 1);
        assert!(sender.sent_to(Channel::TrustedContactSms).is_empty());
    }
}

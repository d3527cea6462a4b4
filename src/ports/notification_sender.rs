//! NotificationSender port - Interface for notification transports.
//!
//! Transports (SMS gateway, email, ops paging, webhooks) live outside this
//! system. Every send carries its idempotency key so a transport that
//! supports deduplication can honor it too.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::alert::{AlertMessage, Channel, IdempotencyKey};
use crate::domain::foundation::UserId;

/// Where a notification goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    Phone(String),
    Email(String),
    /// The on-call operations team.
    Operations,
    /// The user who checked in.
    User(UserId),
}

/// A fully rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub channel: Channel,
    pub recipient: Recipient,
    pub message: AlertMessage,
    pub idempotency_key: IdempotencyKey,
    pub user_id: UserId,
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), ChannelError>;
}

/// Channel delivery failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("channel unavailable: {message}")]
    Unavailable { message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("rejected by transport: {reason}")]
    Rejected { reason: String },

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),
}

impl ChannelError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ChannelError::RateLimited { .. }
                | ChannelError::Unavailable { .. }
                | ChannelError::Network(_)
                | ChannelError::Timeout { .. }
        )
    }
}

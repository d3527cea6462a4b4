//! AlertEventPublisher port - Downstream feed of dispatch attempts.
//!
//! One `AlertEvent` is published per attempt. Publishing is best effort:
//! a publisher failure is logged and never blocks delivery.

use async_trait::async_trait;

use crate::domain::alert::AlertEvent;
use crate::domain::foundation::DomainError;

#[async_trait]
pub trait AlertEventPublisher: Send + Sync {
    async fn publish(&self, event: &AlertEvent) -> Result<(), DomainError>;
}

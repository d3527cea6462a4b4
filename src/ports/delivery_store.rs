//! DeliveryStore port - Idempotency records for alert delivery.
//!
//! Delivery uses a claim protocol rather than check-then-mark, so two
//! concurrent replays of the same key cannot both reach the channel:
//!
//! ```text
//! claim(key) -> Claimed         -> send -> mark_delivered(key)
//!                                       -> (failure) release(key)
//!            -> AlreadyDelivered   (skip, report Duplicate)
//!            -> InFlight           (another worker owns it; skip)
//! ```

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::alert::IdempotencyKey;
use crate::domain::foundation::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// Caller owns the key until it marks or releases it.
    Claimed,
    AlreadyDelivered,
    /// Another worker holds an unexpired claim.
    InFlight,
}

#[async_trait]
pub trait DeliveryStore: Send + Sync {
    /// Atomically claims `key`. Claims expire after `ttl` so a crashed
    /// worker cannot block delivery forever.
    async fn claim(&self, key: &IdempotencyKey, ttl: Duration) -> Result<ClaimOutcome, DomainError>;

    /// Records a successful delivery. Permanent.
    async fn mark_delivered(&self, key: &IdempotencyKey) -> Result<(), DomainError>;

    /// Drops a claim without recording delivery.
    async fn release(&self, key: &IdempotencyKey) -> Result<(), DomainError>;

    async fn is_delivered(&self, key: &IdempotencyKey) -> Result<bool, DomainError>;
}

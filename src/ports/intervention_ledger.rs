//! InterventionLedger port - Per-user crisis intervention counter.
//!
//! Increments must be atomic at the storage boundary: several check-ins for
//! the same user can be processed concurrently by independent workers.
//! Recording is idempotent per check-in, so replays never double count.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::foundation::{CheckInId, DomainError, Timestamp, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub crisis_intervention_count: u64,
    pub last_crisis_timestamp: Option<Timestamp>,
}

#[async_trait]
pub trait InterventionLedger: Send + Sync {
    /// Records a crisis for `checkin_id` and returns the user's count.
    ///
    /// The first call for a check-in increments and overwrites the last
    /// crisis timestamp; repeats return the current count unchanged.
    async fn record_crisis(
        &self,
        user_id: &UserId,
        checkin_id: &CheckInId,
        at: Timestamp,
    ) -> Result<u64, DomainError>;

    async fn snapshot(&self, user_id: &UserId) -> Result<LedgerEntry, DomainError>;
}

//! ProfileStore port - Interface for per-user risk history and contacts.
//!
//! The store is owned by an external collaborator. History is append-only;
//! appending an assessment for an already-recorded check-in is a no-op.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::profile::{TrustedContact, UserRiskProfile};
use crate::domain::risk::RiskAssessment;

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Time-ordered assessment history, oldest first. Unknown users have
    /// an empty history.
    async fn get_history(&self, user_id: &UserId) -> Result<Vec<RiskAssessment>, DomainError>;

    async fn get_trusted_contact(
        &self,
        user_id: &UserId,
    ) -> Result<Option<TrustedContact>, DomainError>;

    /// Appends to history. Returns false if the check-in was already present.
    async fn append_assessment(
        &self,
        user_id: &UserId,
        assessment: RiskAssessment,
    ) -> Result<bool, DomainError>;

    /// Mirrors a ledger increment onto the profile.
    async fn record_crisis(
        &self,
        user_id: &UserId,
        count: u64,
        at: Timestamp,
    ) -> Result<(), DomainError>;

    /// Full profile snapshot. Unknown users get an empty profile.
    async fn load_profile(&self, user_id: &UserId) -> Result<UserRiskProfile, DomainError>;
}

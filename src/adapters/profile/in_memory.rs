//! In-memory profile store
//!
//! Backs local runs and tests. Production deployments point the
//! `ProfileStore` port at the owning service instead.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::domain::profile::{TrustedContact, UserRiskProfile};
use crate::domain::risk::RiskAssessment;
use crate::ports::ProfileStore;

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<HashMap<UserId, UserRiskProfile>>,
    unavailable: AtomicBool,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a trusted contact for `user_id`.
    pub fn with_contact(self, user_id: UserId, contact: TrustedContact) -> Self {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id.clone())
            .or_insert_with(|| UserRiskProfile::new(user_id))
            .set_trusted_contact(Some(contact));
        self
    }

    /// Makes every call fail, to exercise degraded paths.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), DomainError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DomainError::storage("Profile store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_history(&self, user_id: &UserId) -> Result<Vec<RiskAssessment>, DomainError> {
        self.check_available()?;
        Ok(self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .map(|p| p.history().to_vec())
            .unwrap_or_default())
    }

    async fn get_trusted_contact(
        &self,
        user_id: &UserId,
    ) -> Result<Option<TrustedContact>, DomainError> {
        self.check_available()?;
        Ok(self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .and_then(|p| p.trusted_contact().cloned()))
    }

    async fn append_assessment(
        &self,
        user_id: &UserId,
        assessment: RiskAssessment,
    ) -> Result<bool, DomainError> {
        self.check_available()?;
        Ok(self
            .profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id.clone())
            .or_insert_with(|| UserRiskProfile::new(user_id.clone()))
            .append_assessment(assessment))
    }

    async fn record_crisis(
        &self,
        user_id: &UserId,
        count: u64,
        at: Timestamp,
    ) -> Result<(), DomainError> {
        self.check_available()?;
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(user_id.clone())
            .or_insert_with(|| UserRiskProfile::new(user_id.clone()))
            .record_crisis(count, at);
        Ok(())
    }

    async fn load_profile(&self, user_id: &UserId) -> Result<UserRiskProfile, DomainError> {
        self.check_available()?;
        Ok(self
            .profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserRiskProfile::new(user_id.clone())))
    }
}

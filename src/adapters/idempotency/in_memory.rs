//! In-memory delivery store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

use crate::domain::alert::IdempotencyKey;
use crate::domain::foundation::DomainError;
use crate::ports::{ClaimOutcome, DeliveryStore};

#[derive(Debug, Clone, Copy)]
enum Record {
    Claimed { expires_at: Instant },
    Delivered,
}

#[derive(Debug, Default)]
pub struct InMemoryDeliveryStore {
    records: Mutex<HashMap<IdempotencyKey, Record>>,
}

impl InMemoryDeliveryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delivered_count(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|r| matches!(r, Record::Delivered))
            .count()
    }
}

#[async_trait]
impl DeliveryStore for InMemoryDeliveryStore {
    async fn claim(&self, key: &IdempotencyKey, ttl: Duration) -> Result<ClaimOutcome, DomainError> {
        let now = Instant::now();
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        match records.get(key) {
            Some(Record::Delivered) => Ok(ClaimOutcome::AlreadyDelivered),
            Some(Record::Claimed { expires_at }) if *expires_at > now => Ok(ClaimOutcome::InFlight),
            _ => {
                records.insert(key.clone(), Record::Claimed { expires_at: now + ttl });
                Ok(ClaimOutcome::Claimed)
            }
        }
    }

    async fn mark_delivered(&self, key: &IdempotencyKey) -> Result<(), DomainError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), Record::Delivered);
        Ok(())
    }

    async fn release(&self, key: &IdempotencyKey) -> Result<(), DomainError> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(records.get(key), Some(Record::Claimed { .. })) {
            records.remove(key);
        }
        Ok(())
    }

    async fn is_delivered(&self, key: &IdempotencyKey) -> Result<bool, DomainError> {
        Ok(matches!(
            self.records
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get(key),
            Some(Record::Delivered)
        ))
    }
}

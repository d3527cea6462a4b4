//! In-memory alert event publisher for tests.
//!
//! Captures every published event for assertions. Can be switched to fail
//! so tests can show that a broken event feed never blocks delivery.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::domain::alert::{AlertEvent, AlertLevel, Channel};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::AlertEventPublisher;

#[derive(Debug, Default)]
pub struct InMemoryAlertEventPublisher {
    published: RwLock<Vec<AlertEvent>>,
    failing: AtomicBool,
}

impl InMemoryAlertEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A publisher whose every `publish` fails.
    pub fn failing() -> Self {
        let publisher = Self::default();
        publisher.failing.store(true, Ordering::SeqCst);
        publisher
    }

    // === Test Helpers ===

    pub fn published_events(&self) -> Vec<AlertEvent> {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Events for one level and channel, in publish order.
    pub fn events_for(&self, level: AlertLevel, channel: Channel) -> Vec<AlertEvent> {
        self.published_events()
            .into_iter()
            .filter(|e| e.level == level && e.channel == channel)
            .collect()
    }

    pub fn clear(&self) {
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl AlertEventPublisher for InMemoryAlertEventPublisher {
    async fn publish(&self, event: &AlertEvent) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::InternalError,
                "Event publisher unavailable",
            ));
        }
        self.published
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }
}

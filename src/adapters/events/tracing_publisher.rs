//! Publishes alert events as structured log records.

use async_trait::async_trait;
use tracing::info;

use crate::domain::alert::AlertEvent;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::AlertEventPublisher;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAlertEventPublisher;

impl TracingAlertEventPublisher {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AlertEventPublisher for TracingAlertEventPublisher {
    async fn publish(&self, event: &AlertEvent) -> Result<(), DomainError> {
        let payload = serde_json::to_string(event).map_err(|e| {
            DomainError::new(ErrorCode::InternalError, format!("Event serialization: {}", e))
        })?;
        info!(
            target: "alert_events",
            checkin_id = %event.checkin_id,
            level = %event.level,
            channel = %event.channel,
            attempt = event.attempt,
            event = %payload,
            "Alert dispatch attempt"
        );
        Ok(())
    }
}

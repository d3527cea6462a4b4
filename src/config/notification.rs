//! Notification channel configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::resilience::RetryPolicy;
use crate::ports::CircuitBreakerConfig;

/// Notification delivery configuration.
///
/// Without a `webhook_url` alerts are written to the log only.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Relay endpoint that owns the real SMS/email/paging transports
    pub webhook_url: Option<String>,

    /// Bearer token for the relay
    pub api_key: Option<Secret<String>>,

    /// Deadline per send attempt in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Attempts per alert task, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Proportional random extra added to each backoff delay
    #[serde(default = "default_jitter")]
    pub jitter: f64,

    /// Consecutive failures before a channel's breaker opens
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl NotificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            multiplier: 2.0,
            jitter: self.jitter,
        }
    }

    pub fn breaker(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            cooldown: Duration::from_secs(self.cooldown_secs),
            ..CircuitBreakerConfig::for_channel()
        }
    }

    /// Validate notification configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = self.webhook_url.as_deref().filter(|u| !u.trim().is_empty()) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidUrl("NOTIFICATION__WEBHOOK_URL"));
            }
        }
        if self.max_attempts == 0 {
            return Err(ValidationError::MustBePositive("NOTIFICATION__MAX_ATTEMPTS"));
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::MustBePositive("NOTIFICATION__TIMEOUT_MS"));
        }
        if self.failure_threshold == 0 {
            return Err(ValidationError::MustBePositive("NOTIFICATION__FAILURE_THRESHOLD"));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            return Err(ValidationError::InvalidJitter);
        }
        Ok(())
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            api_key: None,
            timeout_ms: default_timeout_ms(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: default_jitter(),
            failure_threshold: default_failure_threshold(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_jitter() -> f64 {
    0.1
}

fn default_failure_threshold() -> u32 {
    5
}

fn default_cooldown_secs() -> u64 {
    30
}

//! Classifier configuration

use secrecy::Secret;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::ports::CircuitBreakerConfig;

/// External classifier configuration.
///
/// Without a `base_url` the classifier is treated as permanently
/// unavailable and every check-in is scored from patterns alone.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    /// Classifier service base URL
    pub base_url: Option<String>,

    /// Bearer token for the classifier service
    pub api_key: Option<Secret<String>>,

    /// Deadline per classification call in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Consecutive failures before the breaker opens
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    /// Seconds the breaker stays open before a trial call
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
}

impl ClassifierConfig {
    pub fn is_configured(&self) -> bool {
        self.base_url.as_ref().is_some_and(|u| !u.trim().is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn breaker(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            cooldown: Duration::from_secs(self.cooldown_secs),
            ..CircuitBreakerConfig::for_classifier()
        }
    }

    /// Validate classifier configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(url) = self.base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidUrl("CLASSIFIER__BASE_URL"));
            }
        }
        if self.timeout_ms == 0 {
            return Err(ValidationError::MustBePositive("CLASSIFIER__TIMEOUT_MS"));
        }
        if self.failure_threshold == 0 {
            return Err(ValidationError::MustBePositive("CLASSIFIER__FAILURE_THRESHOLD"));
        }
        Ok(())
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            timeout_ms: default_timeout_ms(),
            failure_threshold: default_failure_threshold(),
            cooldown_secs: default_cooldown_secs(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_cooldown_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_leave_classifier_unconfigured() {
        let config = ClassifierConfig::default();
        assert!(!config.is_configured());
        assert_eq!(config.timeout(), Duration::from_secs(2));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_breaker_uses_configured_threshold_and_cooldown() {
        let config = ClassifierConfig {
            failure_threshold: 4,
            cooldown_secs: 10,
            ..Default::default()
        };
        let breaker = config.breaker();
        assert_eq!(breaker.failure_threshold, 4);
        assert_eq!(breaker.cooldown, Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_non_http_url() {
        let config = ClassifierConfig {
            base_url: Some("ftp://classifier".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}

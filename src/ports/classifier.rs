//! Classifier port - Interface for the external sentiment/entity service.
//!
//! The classifier is advisory. Scoring never depends on it being reachable;
//! callers wrap it with a breaker and convert failures into an explicit
//! unavailability signal.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::checkin::ClassifierResult;
use crate::domain::foundation::UserId;

/// Input to the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub text: String,
    pub user_id: UserId,
}

impl ClassificationRequest {
    pub fn new(text: impl Into<String>, user_id: UserId) -> Self {
        Self {
            text: text.into(),
            user_id,
        }
    }
}

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, request: &ClassificationRequest) -> Result<ClassifierResult, ClassifierError>;

    /// Short provider name for logs.
    fn name(&self) -> &str;
}

/// Classifier failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifierError {
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    #[error("classifier unavailable: {message}")]
    Unavailable { message: String },

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
}

impl ClassifierError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Returns true if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClassifierError::RateLimited { .. }
                | ClassifierError::Unavailable { .. }
                | ClassifierError::Network(_)
                | ClassifierError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(ClassifierError::RateLimited { retry_after_secs: 1 }.is_retryable());
        assert!(ClassifierError::unavailable("503").is_retryable());
        assert!(ClassifierError::network("reset").is_retryable());
        assert!(ClassifierError::Timeout { timeout_ms: 2000 }.is_retryable());
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(!ClassifierError::AuthenticationFailed.is_retryable());
        assert!(!ClassifierError::Parse("bad json".into()).is_retryable());
        assert!(!ClassifierError::InvalidRequest("empty".into()).is_retryable());
    }
}

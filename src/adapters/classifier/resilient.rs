//! Breaker-guarded classifier that never fails.
//!
//! Every failure mode (open circuit, timeout, error, no classifier
//! configured) becomes `ClassificationOutcome::Unavailable`, which the scorer
//! handles with pattern-only scoring plus the failsafe rule.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::adapters::resilience::{call_guarded, retry_with, GuardError, RetryOutcome, RetryPolicy};
use crate::domain::checkin::{ClassificationOutcome, UnavailableReason};
use crate::ports::{CircuitBreaker, ClassificationRequest, Classifier, ClassifierError};

pub struct ResilientClassifier {
    inner: Option<Arc<dyn Classifier>>,
    breaker: Arc<dyn CircuitBreaker>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl ResilientClassifier {
    /// Wraps `inner`. Defaults to a single attempt so an ailing classifier
    /// never delays scoring by more than one timeout.
    pub fn new(inner: Arc<dyn Classifier>, breaker: Arc<dyn CircuitBreaker>, timeout: Duration) -> Self {
        Self {
            inner: Some(inner),
            breaker,
            timeout,
            retry: RetryPolicy::no_retry(),
        }
    }

    /// No classifier is deployed; every call reports `NotConfigured`.
    pub fn not_configured(breaker: Arc<dyn CircuitBreaker>) -> Self {
        Self {
            inner: None,
            breaker,
            timeout: Duration::ZERO,
            retry: RetryPolicy::no_retry(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn breaker(&self) -> &Arc<dyn CircuitBreaker> {
        &self.breaker
    }

    pub async fn classify(&self, request: &ClassificationRequest) -> ClassificationOutcome {
        let Some(inner) = &self.inner else {
            debug!("No classifier configured, using pattern-only scoring");
            return ClassificationOutcome::Unavailable(UnavailableReason::NotConfigured);
        };

        let outcome = retry_with(&self.retry, "classifier", |_| {
            call_guarded(self.breaker.as_ref(), self.timeout, inner.classify(request))
        })
        .await;

        match outcome {
            RetryOutcome::Succeeded { value, .. } => ClassificationOutcome::Available(value),
            RetryOutcome::Failed { error, attempts } => {
                let reason = unavailable_reason(error);
                warn!(
                    user_id = %request.user_id,
                    attempts = attempts,
                    reason = %reason,
                    "Classifier unavailable, using pattern-only scoring"
                );
                ClassificationOutcome::Unavailable(reason)
            }
        }
    }
}

fn unavailable_reason(error: GuardError<ClassifierError>) -> UnavailableReason {
    match error {
        GuardError::CircuitOpen { .. } => UnavailableReason::CircuitOpen,
        GuardError::Timeout { .. } | GuardError::Inner(ClassifierError::Timeout { .. }) => {
            UnavailableReason::Timeout
        }
        GuardError::Inner(e) => UnavailableReason::Failed(e.to_string()),
    }
}

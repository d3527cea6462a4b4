//! Breaker + timeout wrapper for a single external call.

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

use super::retry::Retryable;
use crate::ports::CircuitBreaker;

/// Why a guarded call did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError<E> {
    /// The breaker is open; the call was not attempted.
    #[error("circuit open for {dependency}")]
    CircuitOpen { dependency: String },

    #[error("timed out after {after:?}")]
    Timeout { after: Duration },

    #[error(transparent)]
    Inner(E),
}

impl<E: Retryable> Retryable for GuardError<E> {
    /// An open circuit may close before the next attempt, so it is retried
    /// like any other transient failure.
    fn is_retryable(&self) -> bool {
        match self {
            GuardError::CircuitOpen { .. } | GuardError::Timeout { .. } => true,
            GuardError::Inner(e) => e.is_retryable(),
        }
    }
}

/// An admitted call that has not reported its result yet. Dropping it
/// unsettled (the caller's future was cancelled) hands the slot back.
struct Admission<'a> {
    breaker: &'a dyn CircuitBreaker,
    settled: bool,
}

impl<'a> Admission<'a> {
    fn success(mut self) {
        self.settled = true;
        self.breaker.record_success();
    }

    fn failure(mut self) {
        self.settled = true;
        self.breaker.record_failure();
    }
}

impl Drop for Admission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.breaker.record_abandoned();
        }
    }
}

/// Runs `call` through `breaker` with a deadline.
///
/// Timeouts and transient errors count as breaker failures. A permanent
/// error (for example a rejected payload) proves the dependency answered,
/// so it counts as a success for breaker accounting. If the returned future
/// is dropped mid-call, the admission is released without a result.
pub async fn call_guarded<T, E, Fut>(
    breaker: &dyn CircuitBreaker,
    timeout: Duration,
    call: Fut,
) -> Result<T, GuardError<E>>
where
    E: Retryable,
    Fut: Future<Output = Result<T, E>>,
{
    if !breaker.should_allow() {
        return Err(GuardError::CircuitOpen {
            dependency: breaker.name().to_string(),
        });
    }
    let admission = Admission {
        breaker,
        settled: false,
    };

    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(value)) => {
            admission.success();
            Ok(value)
        }
        Ok(Err(error)) => {
            if error.is_retryable() {
                admission.failure();
            } else {
                admission.success();
            }
            Err(GuardError::Inner(error))
        }
        Err(_) => {
            admission.failure();
            Err(GuardError::Timeout { after: timeout })
        }
    }
}

//! Retry with capped exponential backoff and jitter.

use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::ports::{ChannelError, ClassifierError};

/// Errors that know whether trying again could help.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for ClassifierError {
    fn is_retryable(&self) -> bool {
        ClassifierError::is_retryable(self)
    }
}

impl Retryable for ChannelError {
    fn is_retryable(&self) -> bool {
        ChannelError::is_retryable(self)
    }
}

/// Backoff schedule: `min(base * multiplier^(n-1), max_delay)` plus up to
/// `jitter` proportional random extra.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
            jitter: 0.1,
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no backoff.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = 0.0;
        self
    }

    /// Delay before the attempt following attempt `attempt` (1-based),
    /// without jitter.
    pub fn base_delay_after(&self, attempt: u32) -> Duration {
        let exp = self.multiplier.powi(attempt.saturating_sub(1) as i32);
        let millis = self.base_delay.as_millis() as f64 * exp;
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    /// Delay before the next attempt, jittered.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let base = self.base_delay_after(attempt);
        if self.jitter <= 0.0 {
            return base;
        }
        let extra = rand::thread_rng().gen_range(0.0..=self.jitter);
        base.mul_f64(1.0 + extra)
    }
}

/// Final result of a retried operation, with the attempt count.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T, E> {
    Succeeded { value: T, attempts: u32 },
    /// A non-retryable error, or retries exhausted.
    Failed { error: E, attempts: u32 },
}

/// Runs `op` until it succeeds, fails permanently, or attempts run out.
///
/// `op` receives the 1-based attempt number.
pub async fn retry_with<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> RetryOutcome<T, E>
where
    E: Retryable + std::fmt::Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return RetryOutcome::Succeeded { value, attempts: attempt },
            Err(error) => {
                if !error.is_retryable() || attempt >= max_attempts {
                    return RetryOutcome::Failed { error, attempts: attempt };
                }
                let delay = policy.delay_after(attempt);
                warn!(
                    operation = %label,
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(250),
            multiplier: 2.0,
            jitter: 0.0,
        }
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let p = policy();
        assert_eq!(p.base_delay_after(1), Duration::from_millis(100));
        assert_eq!(p.base_delay_after(2), Duration::from_millis(200));
        assert_eq!(p.base_delay_after(3), Duration::from_millis(250));
    }

    #[test]
    fn jitter_stays_within_bound() {
        let p = RetryPolicy {
            jitter: 0.1,
            ..policy()
        };
        for _ in 0..100 {
            let d = p.delay_after(1);
            assert!(d >= Duration::from_millis(100));
            assert!(d <= Duration::from_millis(110));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_with_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let c = Arc::clone(&calls);
        let outcome = retry_with(&policy(), "test", move |_| {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ChannelError::unavailable("503"))
                } else {
                    Ok("sent")
                }
            }
        })
        .await;

        assert_eq!(outcome, RetryOutcome::Succeeded { value: "sent", attempts: 3 });
        assert_eq!(started.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn permanent_errors_are_not_retried() {
        let outcome: RetryOutcome<(), _> =
            retry_with(&policy(), "test", |_| async { Err(ChannelError::rejected("blocked")) }).await;
        assert!(matches!(outcome, RetryOutcome::Failed { attempts: 1, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let outcome: RetryOutcome<(), _> = retry_with(&policy(), "test", |_| async {
            Err(ClassifierError::Timeout { timeout_ms: 10 })
        })
        .await;
        assert!(matches!(outcome, RetryOutcome::Failed { attempts: 3, .. }));
    }

    #[tokio::test]
    async fn no_retry_policy_makes_one_attempt() {
        let outcome: RetryOutcome<(), _> = retry_with(&RetryPolicy::no_retry(), "test", |_| async {
            Err(ClassifierError::unavailable("down"))
        })
        .await;
        assert!(matches!(outcome, RetryOutcome::Failed { attempts: 1, .. }));
    }
}

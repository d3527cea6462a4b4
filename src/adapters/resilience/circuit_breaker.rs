//! In-memory circuit breaker.
//!
//! All state transitions happen under one mutex so concurrent callers see a
//! consistent state; lifetime totals are atomics read without the lock.
//! Time comes from `tokio::time::Instant` so tests can pause the clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::ports::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    half_open_successes: u32,
    half_open_in_flight: u32,
    opened_at: Option<Instant>,
    last_failure_at: Option<Instant>,
}

impl BreakerState {
    fn closed() -> Self {
        Self {
            state: CircuitState::Closed,
            consecutive_failures: 0,
            half_open_successes: 0,
            half_open_in_flight: 0,
            opened_at: None,
            last_failure_at: None,
        }
    }
}

/// Circuit breaker guarding one named dependency.
#[derive(Debug)]
pub struct InMemoryCircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
    total_successes: AtomicU64,
    total_failures: AtomicU64,
    total_rejected: AtomicU64,
    times_opened: AtomicU64,
}

impl InMemoryCircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(BreakerState::closed()),
            total_successes: AtomicU64::new(0),
            total_failures: AtomicU64::new(0),
            total_rejected: AtomicU64::new(0),
            times_opened: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Locks the state, applying any cooldown-driven transition first.
    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // A panic while holding the lock cannot leave the state half-written,
        // so a poisoned lock is still usable.
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        self.refresh(&mut inner, Instant::now());
        inner
    }

    fn refresh(&self, inner: &mut BreakerState, now: Instant) {
        if inner.state != CircuitState::Open {
            return;
        }
        let Some(opened_at) = inner.opened_at else {
            return;
        };
        if now.duration_since(opened_at) >= self.config.cooldown {
            info!(breaker = %self.name, "Circuit breaker half-open after cooldown");
            inner.state = CircuitState::HalfOpen;
            inner.half_open_successes = 0;
            inner.half_open_in_flight = 0;
        }
    }

    fn open(&self, inner: &mut BreakerState, now: Instant) {
        inner.state = CircuitState::Open;
        inner.opened_at = Some(now);
        inner.half_open_successes = 0;
        inner.half_open_in_flight = 0;
        self.times_opened.fetch_add(1, Ordering::Relaxed);
    }
}

impl CircuitBreaker for InMemoryCircuitBreaker {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> CircuitState {
        self.lock().state
    }

    fn should_allow(&self) -> bool {
        let mut inner = self.lock();
        let allowed = match inner.state {
            CircuitState::Closed => true,
            CircuitState::Open => false,
            CircuitState::HalfOpen => {
                if inner.half_open_in_flight < self.config.half_open_max_requests {
                    inner.half_open_in_flight += 1;
                    true
                } else {
                    false
                }
            }
        };
        if !allowed {
            self.total_rejected.fetch_add(1, Ordering::Relaxed);
        }
        allowed
    }

    fn record_success(&self) {
        self.total_successes.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => inner.consecutive_failures = 0,
            CircuitState::HalfOpen => {
                inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
                inner.half_open_successes += 1;
                if inner.half_open_successes >= self.config.success_threshold {
                    info!(breaker = %self.name, "Circuit breaker closed after successful trial");
                    *inner = BreakerState::closed();
                }
            }
            CircuitState::Open => {
                debug!(breaker = %self.name, "Success recorded while circuit open");
            }
        }
    }

    fn record_failure(&self) {
        self.total_failures.fetch_add(1, Ordering::Relaxed);
        let now = Instant::now();
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed => {
                if let (Some(window), Some(last)) = (self.config.failure_window, inner.last_failure_at) {
                    if now.duration_since(last) > window {
                        inner.consecutive_failures = 0;
                    }
                }
                inner.consecutive_failures += 1;
                inner.last_failure_at = Some(now);

                if inner.consecutive_failures >= self.config.failure_threshold {
                    warn!(
                        breaker = %self.name,
                        failures = inner.consecutive_failures,
                        "Circuit breaker opening due to failures"
                    );
                    self.open(&mut inner, now);
                }
            }
            CircuitState::HalfOpen => {
                warn!(breaker = %self.name, "Circuit breaker re-opening after failed trial");
                self.open(&mut inner, now);
            }
            CircuitState::Open => {}
        }
    }

    fn record_abandoned(&self) {
        let mut inner = self.lock();
        if inner.state == CircuitState::HalfOpen {
            debug!(breaker = %self.name, "Half-open trial abandoned, slot released");
            inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
        }
    }

    fn reset(&self) {
        info!(breaker = %self.name, "Circuit breaker reset");
        *self.lock() = BreakerState::closed();
    }

    fn metrics(&self) -> CircuitBreakerMetrics {
        let now = Instant::now();
        let inner = self.lock();
        let time_until_half_open = match (inner.state, inner.opened_at) {
            (CircuitState::Open, Some(opened_at)) => {
                Some(self.config.cooldown.saturating_sub(now.duration_since(opened_at)))
            }
            _ => None,
        };

        CircuitBreakerMetrics {
            name: self.name.clone(),
            state: Some(inner.state),
            total_successes: self.total_successes.load(Ordering::Relaxed),
            total_failures: self.total_failures.load(Ordering::Relaxed),
            total_rejected: self.total_rejected.load(Ordering::Relaxed),
            times_opened: self.times_opened.load(Ordering::Relaxed),
            current_failures: inner.consecutive_failures,
            current_successes: inner.half_open_successes,
            time_until_half_open,
        }
    }
}

//! CircuitBreaker port - Dependency-scoped protection for external calls.
//!
//! One breaker guards one external dependency (the classifier, or a single
//! notification channel). While open, callers get an immediate
//! "circuit open" signal instead of paying the call's timeout.
//!
//! ## Transitions
//!
//! ```text
//! Closed --[failure_threshold consecutive failures]--> Open
//! Open --[cooldown elapsed]--> Half-Open
//! Half-Open --[success_threshold trial successes]--> Closed
//! Half-Open --[trial failure]--> Open
//! ```

use serde::Serialize;
use std::time::Duration;

/// Circuit breaker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation - requests flow through to the dependency.
    Closed,

    /// Too many failures - requests rejected without calling the dependency.
    Open,

    /// Cooldown elapsed - a limited number of trial requests allowed.
    HalfOpen,
}

impl CircuitState {
    pub fn allows_requests(&self) -> bool {
        matches!(self, CircuitState::Closed | CircuitState::HalfOpen)
    }
}

/// Configuration for circuit breaker behavior.
#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before opening.
    pub failure_threshold: u32,

    /// Time spent open before a trial is allowed.
    pub cooldown: Duration,

    /// Trial successes needed in half-open to close.
    pub success_threshold: u32,

    /// Concurrent trial requests allowed in half-open.
    pub half_open_max_requests: u32,

    /// If set, only failures within this window count toward the threshold.
    pub failure_window: Option<Duration>,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cooldown: Duration::from_secs(30),
            success_threshold: 1,
            half_open_max_requests: 1,
            failure_window: None,
        }
    }
}

impl CircuitBreakerConfig {
    /// Classifier defaults: trip fast, recover slowly.
    pub fn for_classifier() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(60),
            ..Self::default()
        }
    }

    /// Notification channel defaults.
    pub fn for_channel() -> Self {
        Self::default()
    }
}

/// Port for circuit breaker functionality.
///
/// Implementations must be safe to share across concurrently processed
/// check-ins.
pub trait CircuitBreaker: Send + Sync {
    /// Name of the guarded dependency.
    fn name(&self) -> &str;

    /// Current state. An open breaker whose cooldown has elapsed reports
    /// `HalfOpen`.
    fn state(&self) -> CircuitState;

    /// Asks to make a call. Returns `false` when open, or when half-open
    /// and the trial slots are taken.
    fn should_allow(&self) -> bool;

    /// Record a successful call.
    fn record_success(&self);

    /// Record a failed call (timeouts included).
    fn record_failure(&self);

    /// Record an admitted call that was cancelled before it finished.
    /// Frees its half-open trial slot without counting a result.
    fn record_abandoned(&self);

    /// Force the circuit closed. Administrative use only.
    fn reset(&self);

    fn metrics(&self) -> CircuitBreakerMetrics;
}

/// Point-in-time breaker metrics.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CircuitBreakerMetrics {
    pub name: String,
    pub state: Option<CircuitState>,
    pub total_successes: u64,
    pub total_failures: u64,
    /// Calls refused while open.
    pub total_rejected: u64,
    pub times_opened: u64,
    pub current_failures: u32,
    pub current_successes: u32,
    #[serde(serialize_with = "serialize_millis")]
    pub time_until_half_open: Option<Duration>,
}

fn serialize_millis<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
        None => serializer.serialize_none(),
    }
}

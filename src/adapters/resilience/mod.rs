//! Resilience adapters - circuit breakers, retry and call guarding.
//!
//! - `InMemoryCircuitBreaker` - `CircuitBreaker` port implementation
//! - `BreakerRegistry` - One breaker per external dependency
//! - `RetryPolicy` / `retry_with` - Capped exponential backoff with jitter
//! - `call_guarded` - Breaker check + deadline around one call

mod circuit_breaker;
mod guard;
mod registry;
mod retry;

pub use circuit_breaker::InMemoryCircuitBreaker;
pub use guard::{call_guarded, GuardError};
pub use registry::{BreakerRegistry, CLASSIFIER_BREAKER};
pub use retry::{retry_with, RetryOutcome, RetryPolicy, Retryable};

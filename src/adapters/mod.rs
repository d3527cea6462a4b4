//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `classifier` - HTTP and mock classifiers, plus the breaker-guarded wrapper
//! - `events` - Alert event publishers (in-memory, tracing)
//! - `http` - Axum routes
//! - `idempotency` - Delivery claim stores (in-memory, Redis)
//! - `ledger` - Intervention ledgers (in-memory, Redis)
//! - `notification` - Channel senders (webhook relay, logging, mock)
//! - `profile` - Risk profile store
//! - `resilience` - Circuit breakers, retry, guarded calls

pub mod classifier;
pub mod events;
pub mod http;
pub mod idempotency;
pub mod ledger;
pub mod notification;
pub mod profile;
pub mod resilience;

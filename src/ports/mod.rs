//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Consumed Services
//!
//! - `Classifier` - External sentiment/entity classification
//! - `ProfileStore` - Risk history and trusted contacts
//! - `NotificationSender` - Notification transports
//!
//! ## Produced Records
//!
//! - `AlertEventPublisher` - One event per dispatch attempt
//! - `InterventionLedger` - Atomic per-user crisis counter
//!
//! ## Resilience Infrastructure
//!
//! - `CircuitBreaker` - Dependency-scoped failure isolation
//! - `DeliveryStore` - Claim-based delivery idempotency

mod alert_event_publisher;
mod circuit_breaker;
mod classifier;
mod delivery_store;
mod intervention_ledger;
mod notification_sender;
mod profile_store;

pub use alert_event_publisher::AlertEventPublisher;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, CircuitState};
pub use classifier::{ClassificationRequest, Classifier, ClassifierError};
pub use delivery_store::{ClaimOutcome, DeliveryStore};
pub use intervention_ledger::{InterventionLedger, LedgerEntry};
pub use notification_sender::{ChannelError, Notification, NotificationSender, Recipient};
pub use profile_store::ProfileStore;

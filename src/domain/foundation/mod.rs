//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, the bounded risk score and error types
//! used throughout the check-in sentinel domain.

mod errors;
mod ids;
mod risk_score;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{CheckInId, UserId};
pub use risk_score::RiskScore;
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

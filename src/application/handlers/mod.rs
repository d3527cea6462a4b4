//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod checkin;

pub use checkin::{CheckInError, ProcessCheckInCommand, ProcessCheckInHandler, ProcessCheckInResult};

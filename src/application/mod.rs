//! Application layer - Commands and handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The check-in handler owns the decision; the dispatcher owns delivery.

pub mod dispatcher;
pub mod handlers;

pub use dispatcher::{AlertDispatcher, DispatchRequest, DispatcherConfig};
pub use handlers::{CheckInError, ProcessCheckInCommand, ProcessCheckInHandler, ProcessCheckInResult};

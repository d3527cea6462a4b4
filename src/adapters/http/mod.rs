//! HTTP adapters - REST API implementations.

pub mod checkin;

pub use checkin::{checkin_router, CheckInAppState};

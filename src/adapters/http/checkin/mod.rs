//! HTTP adapter for check-in processing.
//!
//! # Endpoints
//!
//! - `POST /api/checkins` - Score a check-in and dispatch the resulting alert
//! - `GET /api/resilience/breakers` - Circuit breaker metrics per dependency

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::CheckInAppState;
pub use routes::checkin_router;

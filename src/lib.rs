//! Check-in Sentinel - crisis-risk scoring and alert routing
//!
//! Scores free-text check-ins for crisis risk, trends them against each
//! user's history, and routes the result to escalating notification
//! channels with retry, idempotency, and circuit breaking.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod server;

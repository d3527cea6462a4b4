//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, timestamps, risk score, errors)
//! - `checkin` - Inbound check-ins and classifier output
//! - `risk` - Pattern scoring and trajectory analysis
//! - `profile` - Per-user risk history and trusted contact
//! - `alert` - Routing policy, channel plans and dispatch lifecycle

pub mod alert;
pub mod checkin;
pub mod foundation;
pub mod profile;
pub mod risk;

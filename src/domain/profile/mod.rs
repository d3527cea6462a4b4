//! Profile module - per-user risk history and trusted contact.

mod trusted_contact;
mod user_risk_profile;

pub use trusted_contact::{ContactMethod, TrustedContact};
pub use user_risk_profile::UserRiskProfile;

//! Check-in handlers.
//!
//! ## Commands
//! - Processing a check-in end to end: classify, score, trend, decide, dispatch

mod process_checkin;

pub use process_checkin::{
    CheckInError, ProcessCheckInCommand, ProcessCheckInHandler, ProcessCheckInResult,
};

//! Check-in module - the inbound free-text check-in and the external
//! classifier's view of it.

mod check_in;
mod classification;

pub use check_in::{CheckIn, MAX_TEXT_CHARS, MAX_UTC_OFFSET_MINUTES};
pub use classification::{
    ClassificationOutcome, ClassifierResult, Entity, SentimentLabel, UnavailableReason,
};

//! Classifier adapters.
//!
//! - `HttpClassifier` - External sentiment/entity service over HTTP
//! - `MockClassifier` - Scripted responses for tests and local runs
//! - `ResilientClassifier` - Breaker + deadline wrapper that degrades to
//!   `ClassificationOutcome::Unavailable` instead of failing

mod http;
mod mock;
mod resilient;

pub use http::{HttpClassifier, HttpClassifierConfig};
pub use mock::{MockClassification, MockClassifier};
pub use resilient::ResilientClassifier;

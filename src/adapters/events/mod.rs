//! Alert event publishers.
//!
//! - `InMemoryAlertEventPublisher` - Captures events for assertions
//! - `TracingAlertEventPublisher` - Emits each event as a log record

mod in_memory;
mod tracing_publisher;

pub use in_memory::InMemoryAlertEventPublisher;
pub use tracing_publisher::TracingAlertEventPublisher;

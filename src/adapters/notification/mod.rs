//! Notification sender adapters.
//!
//! - `WebhookNotificationSender` - JSON relay with idempotency header
//! - `LoggingNotificationSender` - Structured log line per alert
//! - `MockNotificationSender` - Recording sender with failure injection

mod logging;
mod mock;
mod webhook;

pub use logging::LoggingNotificationSender;
pub use mock::MockNotificationSender;
pub use webhook::{WebhookConfig, WebhookNotificationSender};

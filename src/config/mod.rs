//! Application configuration module
//!
//! Configuration is loaded from environment variables using the `config` and
//! `dotenvy` crates. Variables carry the `CHECKIN_SENTINEL` prefix and nested
//! values are separated with double underscores.
//!
//! # Example
//!
//! ```no_run
//! use checkin_sentinel::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod classifier;
mod error;
mod notification;
mod redis;
mod routing;
mod server;

pub use self::redis::RedisConfig;
pub use classifier::ClassifierConfig;
pub use error::{ConfigError, ValidationError};
pub use notification::NotificationConfig;
pub use routing::RoutingConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration.
///
/// Every section has working defaults, so an empty environment yields a
/// development setup: in-memory stores, no classifier, log-only alerts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// External sentiment classifier
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Alert delivery (relay endpoint, retry, channel breakers)
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Alert rule thresholds
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Shared idempotency and ledger state. In-memory stores are used when absent.
    pub redis: Option<RedisConfig>,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `CHECKIN_SENTINEL__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CHECKIN_SENTINEL__ROUTING__CRISIS_THRESHOLD=95` -> `routing.crisis_threshold = 95`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CHECKIN_SENTINEL")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.classifier.validate()?;
        self.notification.validate()?;
        self.routing.validate()?;
        if let Some(redis) = &self.redis {
            redis.validate()?;
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

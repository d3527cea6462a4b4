//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Request timeout must be between 1 and 300 seconds")]
    InvalidTimeout,

    #[error("Request body limit must be at least {0} bytes")]
    BodyLimitTooSmall(usize),

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Redis key prefix must be non-empty without whitespace")]
    InvalidKeyPrefix,

    #[error("{0} must be an http(s) URL")]
    InvalidUrl(&'static str),

    #[error("{0} must be greater than zero")]
    MustBePositive(&'static str),

    #[error("Jitter must be between 0 and 1")]
    InvalidJitter,

    #[error("Routing thresholds must satisfy crisis > immediate > standard > outreach")]
    ThresholdsOutOfOrder,

    #[error("Crisis threshold must be at least 85 so every crisis requires immediate attention")]
    CrisisThresholdTooLow,

    #[error("Risk thresholds must lie within [0, 100]")]
    ThresholdOutOfRange,

    #[error("Sentiment threshold must lie within [-1, 1]")]
    SentimentThresholdOutOfRange,
}

//! Alert routing thresholds

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::alert::RoutingThresholds;
use crate::domain::risk::IMMEDIATE_ATTENTION_THRESHOLD;

/// Thresholds for the ordered alert rules. Comparisons are strict.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    #[serde(default = "default_crisis")]
    pub crisis_threshold: f64,

    #[serde(default = "default_immediate")]
    pub immediate_threshold: f64,

    #[serde(default = "default_standard")]
    pub standard_threshold: f64,

    /// Sentiment below this raises a standard alert on its own
    #[serde(default = "default_standard_sentiment")]
    pub standard_sentiment_threshold: f64,

    /// Minimum risk for proactive outreach on a declining trajectory
    #[serde(default = "default_outreach")]
    pub outreach_threshold: f64,
}

impl RoutingConfig {
    pub fn thresholds(&self) -> RoutingThresholds {
        RoutingThresholds {
            crisis: self.crisis_threshold,
            immediate: self.immediate_threshold,
            standard: self.standard_threshold,
            standard_sentiment: self.standard_sentiment_threshold,
            outreach: self.outreach_threshold,
        }
    }

    /// Validate routing thresholds
    pub fn validate(&self) -> Result<(), ValidationError> {
        let risks = [
            self.crisis_threshold,
            self.immediate_threshold,
            self.standard_threshold,
            self.outreach_threshold,
        ];
        if risks.iter().any(|t| !(0.0..=100.0).contains(t)) {
            return Err(ValidationError::ThresholdOutOfRange);
        }
        if !(-1.0..=1.0).contains(&self.standard_sentiment_threshold) {
            return Err(ValidationError::SentimentThresholdOutOfRange);
        }
        if !risks.windows(2).all(|w| w[0] > w[1]) {
            return Err(ValidationError::ThresholdsOutOfOrder);
        }
        if self.crisis_threshold < IMMEDIATE_ATTENTION_THRESHOLD {
            return Err(ValidationError::CrisisThresholdTooLow);
        }
        Ok(())
    }
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            crisis_threshold: default_crisis(),
            immediate_threshold: default_immediate(),
            standard_threshold: default_standard(),
            standard_sentiment_threshold: default_standard_sentiment(),
            outreach_threshold: default_outreach(),
        }
    }
}

fn default_crisis() -> f64 {
    95.0
}

fn default_immediate() -> f64 {
    85.0
}

fn default_standard() -> f64 {
    50.0
}

fn default_standard_sentiment() -> f64 {
    -0.6
}

fn default_outreach() -> f64 {
    30.0
}

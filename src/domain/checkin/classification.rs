use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Overall sentiment label reported by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

/// A named entity detected in the check-in text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Output of the external sentiment/entity classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifierResult {
    pub sentiment_label: SentimentLabel,
    pub sentiment_score: f64,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl ClassifierResult {
    /// Creates a result, rejecting sentiment scores outside [-1, 1].
    pub fn new(
        sentiment_label: SentimentLabel,
        sentiment_score: f64,
        entities: Vec<Entity>,
    ) -> Result<Self, ValidationError> {
        if !(-1.0..=1.0).contains(&sentiment_score) {
            return Err(ValidationError::out_of_range(
                "sentiment_score",
                -1.0,
                1.0,
                sentiment_score,
            ));
        }
        Ok(Self {
            sentiment_label,
            sentiment_score,
            entities,
        })
    }

    /// Convenience constructor for a result without entities.
    pub fn sentiment(
        sentiment_label: SentimentLabel,
        sentiment_score: f64,
    ) -> Result<Self, ValidationError> {
        Self::new(sentiment_label, sentiment_score, Vec::new())
    }
}

/// Why no classifier result is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum UnavailableReason {
    /// No classifier is configured.
    NotConfigured,
    /// The classifier breaker is open; the call was not attempted.
    CircuitOpen,
    /// The call exceeded its deadline.
    Timeout,
    /// The call failed.
    Failed(String),
}

impl UnavailableReason {
    pub fn error_code(&self) -> ErrorCode {
        match self {
            UnavailableReason::CircuitOpen => ErrorCode::CircuitOpen,
            _ => ErrorCode::ClassificationUnavailable,
        }
    }
}

impl fmt::Display for UnavailableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnavailableReason::NotConfigured => write!(f, "classifier not configured"),
            UnavailableReason::CircuitOpen => write!(f, "classifier circuit open"),
            UnavailableReason::Timeout => write!(f, "classifier timed out"),
            UnavailableReason::Failed(reason) => write!(f, "classifier failed: {}", reason),
        }
    }
}

/// Classification as seen by the scorer: a result, or an explicit
/// unavailability signal. Unavailability is a handled state, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    Available(ClassifierResult),
    Unavailable(UnavailableReason),
}

impl ClassificationOutcome {
    pub fn result(&self) -> Option<&ClassifierResult> {
        match self {
            ClassificationOutcome::Available(result) => Some(result),
            ClassificationOutcome::Unavailable(_) => None,
        }
    }

    pub fn sentiment_score(&self) -> Option<f64> {
        self.result().map(|r| r.sentiment_score)
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, ClassificationOutcome::Unavailable(_))
    }

    pub fn unavailable_reason(&self) -> Option<&UnavailableReason> {
        match self {
            ClassificationOutcome::Available(_) => None,
            ClassificationOutcome::Unavailable(reason) => Some(reason),
        }
    }
}

//! Pattern Risk Scorer - turns a check-in and optional classifier output
//! into a bounded risk assessment.
//!
//! # Scoring pipeline
//!
//! 1. Sum the weights of every distinct matched pattern.
//! 2. Multiply by the time-of-day/weekday factor (only when something matched).
//! 3. Failsafe: extreme negative sentiment, or an unavailable classifier with
//!    a high-severity match, raises the score to at least 80.
//! 4. Cumulative distress: four or more distinct distress words raise the
//!    score to at least 45.
//! 5. Clamp to [0, 100].
//!
//! Every step is non-decreasing in the set of matches, so adding a matched
//! pattern can never lower the final score.

use chrono::Weekday;
use std::collections::BTreeSet;

use super::assessment::RiskAssessment;
use super::patterns::{distress_word_count, matched_patterns, Severity};
use crate::domain::checkin::{CheckIn, ClassificationOutcome};
use crate::domain::foundation::{RiskScore, Timestamp};

/// Minimum score once the failsafe fires.
pub const FAILSAFE_FLOOR: f64 = 80.0;

/// Sentiment strictly below this always fires the failsafe.
pub const EXTREME_NEGATIVE_SENTIMENT: f64 = -0.9;

/// Distinct distress words needed for the cumulative floor.
pub const DISTRESS_WORD_THRESHOLD: usize = 4;

/// Minimum score once the cumulative distress floor applies.
pub const DISTRESS_FLOOR: f64 = 45.0;

pub const FACTOR_LATE_NIGHT: &str = "temporal:late_night";
pub const FACTOR_WEEKEND: &str = "temporal:weekend";
pub const FACTOR_EXTREME_SENTIMENT: &str = "failsafe:extreme_negative_sentiment";
pub const FACTOR_UNVERIFIED_HIGH_SEVERITY: &str = "failsafe:classifier_unavailable_high_severity";
pub const FACTOR_CUMULATIVE_DISTRESS: &str = "failsafe:cumulative_distress";

/// Multipliers for low-support hours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalWeights {
    /// Applied between 23:00 and 04:59 local time.
    pub late_night: f64,
    /// Applied on Saturday and Sunday.
    pub weekend: f64,
    /// Upper bound of the combined factor.
    pub max_factor: f64,
}

impl Default for TemporalWeights {
    fn default() -> Self {
        Self {
            late_night: 1.2,
            weekend: 1.1,
            max_factor: 1.5,
        }
    }
}

impl TemporalWeights {
    /// Combined factor in `[1.0, max_factor]` plus the labels that applied.
    pub fn factor_at(&self, timestamp: Timestamp, utc_offset_minutes: i32) -> (f64, Vec<&'static str>) {
        let (hour, weekday) = timestamp.local_hour_and_weekday(utc_offset_minutes);
        let mut factor = 1.0;
        let mut labels = Vec::new();

        if hour >= 23 || hour < 5 {
            factor *= self.late_night;
            labels.push(FACTOR_LATE_NIGHT);
        }
        if matches!(weekday, Weekday::Sat | Weekday::Sun) {
            factor *= self.weekend;
            labels.push(FACTOR_WEEKEND);
        }

        (factor.clamp(1.0, self.max_factor.max(1.0)), labels)
    }
}

/// Stateless, deterministic crisis-risk scorer.
#[derive(Debug, Clone, Default)]
pub struct PatternRiskScorer {
    temporal: TemporalWeights,
}

impl PatternRiskScorer {
    pub fn new(temporal: TemporalWeights) -> Self {
        Self { temporal }
    }

    /// Scores a check-in. Never fails: classifier unavailability degrades to
    /// pattern-only scoring plus the failsafe rule.
    pub fn score(&self, checkin: &CheckIn, classification: &ClassificationOutcome) -> RiskAssessment {
        let mut factors = BTreeSet::new();

        if checkin.is_blank() {
            return RiskAssessment::new(
                checkin.checkin_id().clone(),
                RiskScore::ZERO,
                factors,
                checkin.timestamp(),
            );
        }

        let text = checkin.text();
        let matched = matched_patterns(text);
        let base: f64 = matched.iter().map(|p| p.weight).sum();
        let has_high_severity = matched.iter().any(|p| p.severity == Severity::High);
        factors.extend(matched.iter().map(|p| p.id.to_string()));

        let mut score = base;
        if base > 0.0 {
            let (factor, labels) = self
                .temporal
                .factor_at(checkin.timestamp(), checkin.utc_offset_minutes());
            score *= factor;
            factors.extend(labels.into_iter().map(String::from));
        }
        let mut score = RiskScore::new(score);

        let extreme_sentiment = classification
            .sentiment_score()
            .is_some_and(|s| s < EXTREME_NEGATIVE_SENTIMENT);
        if extreme_sentiment {
            score = score.at_least(FAILSAFE_FLOOR);
            factors.insert(FACTOR_EXTREME_SENTIMENT.to_string());
        }
        if classification.is_unavailable() && has_high_severity {
            score = score.at_least(FAILSAFE_FLOOR);
            factors.insert(FACTOR_UNVERIFIED_HIGH_SEVERITY.to_string());
        }
        if extreme_sentiment || (classification.is_unavailable() && has_high_severity) {
            tracing::warn!(
                checkin_id = %checkin.checkin_id(),
                risk_score = score.value(),
                "failsafe floor applied"
            );
        }

        if distress_word_count(text) >= DISTRESS_WORD_THRESHOLD {
            score = score.at_least(DISTRESS_FLOOR);
            factors.insert(FACTOR_CUMULATIVE_DISTRESS.to_string());
        }

        RiskAssessment::new(checkin.checkin_id().clone(), score, factors, checkin.timestamp())
    }
}

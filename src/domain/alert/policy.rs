//! Alert policy - an ordered, first-match-wins rule list.
//!
//! Rules are data, so thresholds change without touching dispatch code.

use serde::{Deserialize, Serialize};

use super::AlertDecision;
use crate::domain::risk::{RiskAssessment, Trajectory};

/// Thresholds behind the default rule list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutingThresholds {
    pub crisis: f64,
    pub immediate: f64,
    pub standard: f64,
    pub standard_sentiment: f64,
    pub outreach: f64,
}

impl Default for RoutingThresholds {
    fn default() -> Self {
        Self {
            crisis: 95.0,
            immediate: 85.0,
            standard: 50.0,
            standard_sentiment: -0.6,
            outreach: 30.0,
        }
    }
}

/// Facts a rule can look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionInput {
    pub risk_score: f64,
    /// Absent when the classifier was unavailable.
    pub sentiment_score: Option<f64>,
    pub trajectory: Trajectory,
}

impl DecisionInput {
    pub fn new(
        assessment: &RiskAssessment,
        sentiment_score: Option<f64>,
        trajectory: Trajectory,
    ) -> Self {
        Self {
            risk_score: assessment.risk_score().value(),
            sentiment_score,
            trajectory,
        }
    }
}

/// Predicate half of a rule. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleCondition {
    RiskAbove { risk: f64 },
    /// A missing sentiment never satisfies the sentiment clause.
    RiskAboveOrSentimentBelow { risk: f64, sentiment: f64 },
    TrajectoryIsAndRiskAbove { trajectory: Trajectory, risk: f64 },
}

impl RuleCondition {
    pub fn matches(&self, input: &DecisionInput) -> bool {
        match *self {
            RuleCondition::RiskAbove { risk } => input.risk_score > risk,
            RuleCondition::RiskAboveOrSentimentBelow { risk, sentiment } => {
                input.risk_score > risk || input.sentiment_score.is_some_and(|s| s < sentiment)
            }
            RuleCondition::TrajectoryIsAndRiskAbove { trajectory, risk } => {
                input.trajectory == trajectory && input.risk_score > risk
            }
        }
    }
}

/// A `(predicate, action)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub condition: RuleCondition,
    pub decision: AlertDecision,
}

/// Ordered rules, highest priority first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPolicy {
    rules: Vec<AlertRule>,
}

impl AlertPolicy {
    pub fn new(rules: Vec<AlertRule>) -> Self {
        Self { rules }
    }

    /// The standard five-step guard list.
    pub fn from_thresholds(t: RoutingThresholds) -> Self {
        Self::new(vec![
            AlertRule {
                condition: RuleCondition::RiskAbove { risk: t.crisis },
                decision: AlertDecision::CrisisProtocol,
            },
            AlertRule {
                condition: RuleCondition::RiskAbove { risk: t.immediate },
                decision: AlertDecision::ImmediateIntervention,
            },
            AlertRule {
                condition: RuleCondition::RiskAboveOrSentimentBelow {
                    risk: t.standard,
                    sentiment: t.standard_sentiment,
                },
                decision: AlertDecision::StandardAlert,
            },
            AlertRule {
                condition: RuleCondition::TrajectoryIsAndRiskAbove {
                    trajectory: Trajectory::Declining,
                    risk: t.outreach,
                },
                decision: AlertDecision::ProactiveOutreach,
            },
        ])
    }

    pub fn rules(&self) -> &[AlertRule] {
        &self.rules
    }

    /// First matching rule wins; no match means `None`.
    pub fn decide(
        &self,
        assessment: &RiskAssessment,
        sentiment_score: Option<f64>,
        trajectory: Trajectory,
    ) -> AlertDecision {
        self.evaluate(&DecisionInput::new(assessment, sentiment_score, trajectory))
    }

    pub fn evaluate(&self, input: &DecisionInput) -> AlertDecision {
        self.rules
            .iter()
            .find(|rule| rule.condition.matches(input))
            .map(|rule| rule.decision)
            .unwrap_or(AlertDecision::None)
    }
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self::from_thresholds(RoutingThresholds::default())
    }
}

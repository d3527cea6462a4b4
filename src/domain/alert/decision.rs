use serde::{Deserialize, Serialize};
use std::fmt;

use super::AlertLevel;

/// What the router decided to do with an assessment.
///
/// Derived, never stored on its own: the same assessment and profile state
/// always produce the same decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertDecision {
    None,
    StandardAlert,
    ImmediateIntervention,
    CrisisProtocol,
    ProactiveOutreach,
}

impl AlertDecision {
    /// Label carried by the dispatch tasks of this decision.
    pub fn level(&self) -> Option<AlertLevel> {
        match self {
            AlertDecision::None => None,
            AlertDecision::StandardAlert => Some(AlertLevel::Standard),
            AlertDecision::ImmediateIntervention => Some(AlertLevel::Immediate),
            AlertDecision::CrisisProtocol => Some(AlertLevel::Crisis),
            AlertDecision::ProactiveOutreach => Some(AlertLevel::Proactive),
        }
    }
}

impl fmt::Display for AlertDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AlertDecision::None => "none",
            AlertDecision::StandardAlert => "standard_alert",
            AlertDecision::ImmediateIntervention => "immediate_intervention",
            AlertDecision::CrisisProtocol => "crisis_protocol",
            AlertDecision::ProactiveOutreach => "proactive_outreach",
        };
        write!(f, "{}", s)
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{CheckInId, RiskScore, Timestamp};

/// Scores strictly above this require immediate attention.
pub const IMMEDIATE_ATTENTION_THRESHOLD: f64 = 85.0;

/// The scored outcome of one check-in.
///
/// Created exactly once per check-in by the scorer and never mutated.
/// `requires_immediate_attention` is derived from the score at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    checkin_id: CheckInId,
    risk_score: RiskScore,
    risk_factors: BTreeSet<String>,
    requires_immediate_attention: bool,
    timestamp: Timestamp,
}

impl RiskAssessment {
    pub fn new(
        checkin_id: CheckInId,
        risk_score: RiskScore,
        risk_factors: BTreeSet<String>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            checkin_id,
            requires_immediate_attention: risk_score.exceeds(IMMEDIATE_ATTENTION_THRESHOLD),
            risk_score,
            risk_factors,
            timestamp,
        }
    }

    pub fn checkin_id(&self) -> &CheckInId {
        &self.checkin_id
    }

    pub fn risk_score(&self) -> RiskScore {
        self.risk_score
    }

    pub fn risk_factors(&self) -> &BTreeSet<String> {
        &self.risk_factors
    }

    pub fn has_factor(&self, factor: &str) -> bool {
        self.risk_factors.contains(factor)
    }

    pub fn requires_immediate_attention(&self) -> bool {
        self.requires_immediate_attention
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assessment(score: f64) -> RiskAssessment {
        RiskAssessment::new(
            CheckInId::parse("c-1").unwrap(),
            RiskScore::new(score),
            BTreeSet::from(["isolation".to_string()]),
            Timestamp::parse_rfc3339("2024-03-01T12:00:00Z").unwrap(),
        )
    }

    #[test]
    fn immediate_attention_is_strictly_above_85() {
        assert!(!assessment(85.0).requires_immediate_attention());
        assert!(assessment(85.5).requires_immediate_attention());
    }

    #[test]
    fn wire_shape_uses_camel_case_and_array_factors() {
        let json = serde_json::to_value(assessment(42.0)).unwrap();
        assert_eq!(json["checkinId"], "c-1");
        assert_eq!(json["riskScore"], 42.0);
        assert_eq!(json["riskFactors"], serde_json::json!(["isolation"]));
        assert_eq!(json["requiresImmediateAttention"], false);
        assert!(json["timestamp"].as_str().unwrap().starts_with("2024-03-01T12:00:00"));
    }
}

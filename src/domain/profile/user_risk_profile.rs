use serde::{Deserialize, Serialize};

use super::TrustedContact;
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::risk::{RiskAssessment, Trajectory, TrajectoryAnalyzer};

/// A user's accumulated risk state.
///
/// History is append-only and kept in time order. Crisis counters mirror the
/// intervention ledger and are only advanced by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRiskProfile {
    user_id: UserId,
    history: Vec<RiskAssessment>,
    last_trajectory: Trajectory,
    crisis_intervention_count: u64,
    last_crisis_timestamp: Option<Timestamp>,
    trusted_contact: Option<TrustedContact>,
}

impl UserRiskProfile {
    /// Creates an empty profile.
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            history: Vec::new(),
            last_trajectory: Trajectory::InsufficientData,
            crisis_intervention_count: 0,
            last_crisis_timestamp: None,
            trusted_contact: None,
        }
    }

    pub fn with_trusted_contact(mut self, contact: TrustedContact) -> Self {
        self.trusted_contact = Some(contact);
        self
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn history(&self) -> &[RiskAssessment] {
        &self.history
    }

    pub fn last_trajectory(&self) -> Trajectory {
        self.last_trajectory
    }

    pub fn crisis_intervention_count(&self) -> u64 {
        self.crisis_intervention_count
    }

    pub fn last_crisis_timestamp(&self) -> Option<Timestamp> {
        self.last_crisis_timestamp
    }

    pub fn trusted_contact(&self) -> Option<&TrustedContact> {
        self.trusted_contact.as_ref()
    }

    pub fn set_trusted_contact(&mut self, contact: Option<TrustedContact>) {
        self.trusted_contact = contact;
    }

    /// Appends an assessment in time order and refreshes the trajectory.
    ///
    /// Returns false (and changes nothing) if the check-in is already recorded.
    pub fn append_assessment(&mut self, assessment: RiskAssessment) -> bool {
        if self
            .history
            .iter()
            .any(|a| a.checkin_id() == assessment.checkin_id())
        {
            return false;
        }
        let at = self
            .history
            .partition_point(|a| a.timestamp() <= assessment.timestamp());
        self.history.insert(at, assessment);
        self.last_trajectory = TrajectoryAnalyzer::analyze(&self.history);
        true
    }

    /// Mirrors a ledger increment. Counts never move backwards.
    pub fn record_crisis(&mut self, count: u64, at: Timestamp) {
        self.crisis_intervention_count = self.crisis_intervention_count.max(count);
        self.last_crisis_timestamp = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{CheckInId, RiskScore};
    use std::collections::BTreeSet;

    fn assessment(id: &str, score: f64, minute: i64) -> RiskAssessment {
        let base = Timestamp::parse_rfc3339("2024-03-01T12:00:00Z").unwrap();
        RiskAssessment::new(
            CheckInId::parse(id).unwrap(),
            RiskScore::new(score),
            BTreeSet::new(),
            base.plus_minutes(minute),
        )
    }

    fn profile() -> UserRiskProfile {
        UserRiskProfile::new(UserId::new("u-1").unwrap())
    }

    #[test]
    fn new_profile_has_insufficient_data() {
        assert_eq!(profile().last_trajectory(), Trajectory::InsufficientData);
        assert_eq!(profile().crisis_intervention_count(), 0);
    }

    #[test]
    fn append_keeps_time_order() {
        let mut profile = profile();
        profile.append_assessment(assessment("b", 20.0, 10));
        profile.append_assessment(assessment("a", 10.0, 0));
        let ids: Vec<&str> = profile.history().iter().map(|a| a.checkin_id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(profile.last_trajectory(), Trajectory::Declining);
    }

    #[test]
    fn append_ignores_duplicate_checkin() {
        let mut profile = profile();
        assert!(profile.append_assessment(assessment("a", 10.0, 0)));
        assert!(!profile.append_assessment(assessment("a", 90.0, 1)));
        assert_eq!(profile.history().len(), 1);
    }

    #[test]
    fn record_crisis_never_lowers_count() {
        let mut profile = profile();
        let at = Timestamp::now();
        profile.record_crisis(3, at);
        profile.record_crisis(2, at);
        assert_eq!(profile.crisis_intervention_count(), 3);
        assert_eq!(profile.last_crisis_timestamp(), Some(at));
    }
}

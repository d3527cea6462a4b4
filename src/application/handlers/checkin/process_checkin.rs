//! ProcessCheckInHandler - Command handler for a single check-in.
//!
//! Processing always ends with a decision. Every external dependency can
//! fail without stopping it:
//!
//! - classifier down: pattern-only scoring plus the failsafe floor
//! - history unreadable: trajectory from the current assessment alone
//! - history append fails: logged, processing continues
//! - contact lookup fails: dispatch proceeds as if none were configured

use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::adapters::classifier::ResilientClassifier;
use crate::application::dispatcher::{AlertDispatcher, DispatchRequest};
use crate::domain::alert::{AlertDecision, AlertPolicy, DispatchReport};
use crate::domain::checkin::{CheckIn, ClassificationOutcome};
use crate::domain::foundation::{CheckInId, Timestamp, UserId, ValidationError};
use crate::domain::risk::{PatternRiskScorer, RiskAssessment, Trajectory, TrajectoryAnalyzer};
use crate::ports::{ClassificationRequest, ProfileStore};

/// Command to process one check-in.
#[derive(Debug, Clone)]
pub struct ProcessCheckInCommand {
    /// Generated when absent. Supplying it makes replays idempotent.
    pub checkin_id: Option<CheckInId>,
    pub user_id: UserId,
    pub text: String,
    /// Defaults to now.
    pub timestamp: Option<Timestamp>,
    pub utc_offset_minutes: Option<i32>,
}

impl ProcessCheckInCommand {
    pub fn new(user_id: UserId, text: impl Into<String>) -> Self {
        Self {
            checkin_id: None,
            user_id,
            text: text.into(),
            timestamp: None,
            utc_offset_minutes: None,
        }
    }

    pub fn with_checkin_id(mut self, checkin_id: CheckInId) -> Self {
        self.checkin_id = Some(checkin_id);
        self
    }

    pub fn at(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_utc_offset(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = Some(minutes);
        self
    }
}

/// Result of processing a check-in.
#[derive(Debug, Clone)]
pub struct ProcessCheckInResult {
    pub checkin: CheckIn,
    pub assessment: RiskAssessment,
    pub trajectory: Trajectory,
    pub decision: AlertDecision,
    pub classification: ClassificationOutcome,
    pub dispatch: DispatchReport,
}

#[derive(Debug, Error)]
pub enum CheckInError {
    #[error("invalid check-in: {0}")]
    Validation(#[from] ValidationError),

    /// The dispatch task panicked or was aborted.
    #[error("dispatch task failed: {0}")]
    DispatchAborted(String),
}

pub struct ProcessCheckInHandler {
    classifier: Arc<ResilientClassifier>,
    profiles: Arc<dyn ProfileStore>,
    dispatcher: AlertDispatcher,
    scorer: PatternRiskScorer,
    policy: AlertPolicy,
}

impl ProcessCheckInHandler {
    pub fn new(
        classifier: Arc<ResilientClassifier>,
        profiles: Arc<dyn ProfileStore>,
        dispatcher: AlertDispatcher,
    ) -> Self {
        Self {
            classifier,
            profiles,
            dispatcher,
            scorer: PatternRiskScorer::default(),
            policy: AlertPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: AlertPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_scorer(mut self, scorer: PatternRiskScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub async fn handle(&self, cmd: ProcessCheckInCommand) -> Result<ProcessCheckInResult, CheckInError> {
        // 1. Validate
        let mut checkin = CheckIn::new(
            cmd.checkin_id.unwrap_or_default(),
            cmd.user_id,
            cmd.text,
            cmd.timestamp.unwrap_or_else(Timestamp::now),
        )?;
        if let Some(minutes) = cmd.utc_offset_minutes {
            checkin = checkin.with_utc_offset(minutes)?;
        }
        let user_id = checkin.user_id().clone();

        // 2. Classify (never fails) and score
        let classification = self
            .classifier
            .classify(&ClassificationRequest::new(checkin.text(), user_id.clone()))
            .await;
        let assessment = self.scorer.score(&checkin, &classification);

        // 3. Trend over stored history plus this assessment
        let history = match self.profiles.get_history(&user_id).await {
            Ok(history) => history,
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "History unavailable, trending from current check-in only");
                Vec::new()
            }
        };
        let trajectory = TrajectoryAnalyzer::analyze(&with_current(history, &assessment));

        if let Err(e) = self.profiles.append_assessment(&user_id, assessment.clone()).await {
            warn!(
                user_id = %user_id,
                checkin_id = %checkin.checkin_id(),
                error = %e,
                "Failed to append assessment to history"
            );
        }

        // 4. Decide
        let decision = self
            .policy
            .decide(&assessment, classification.sentiment_score(), trajectory);
        info!(
            checkin_id = %checkin.checkin_id(),
            user_id = %user_id,
            risk_score = assessment.risk_score().value(),
            trajectory = %trajectory,
            decision = %decision,
            classifier_unavailable = classification.is_unavailable(),
            "Check-in assessed"
        );

        // 5. Dispatch on its own task so a dropped request cannot cancel it
        let contact = if decision == AlertDecision::None {
            None
        } else {
            self.profiles.get_trusted_contact(&user_id).await.unwrap_or_else(|e| {
                warn!(user_id = %user_id, error = %e, "Trusted contact lookup failed");
                None
            })
        };
        let request = DispatchRequest {
            checkin: checkin.clone(),
            assessment: assessment.clone(),
            decision,
            contact,
        };
        let dispatcher = self.dispatcher.clone();
        let dispatch = tokio::spawn(async move { dispatcher.dispatch(&request).await })
            .await
            .map_err(|e| CheckInError::DispatchAborted(e.to_string()))?;

        Ok(ProcessCheckInResult {
            checkin,
            assessment,
            trajectory,
            decision,
            classification,
            dispatch,
        })
    }
}

/// History with `current` inserted in time order, unless a replay already
/// stored it.
fn with_current(mut history: Vec<RiskAssessment>, current: &RiskAssessment) -> Vec<RiskAssessment> {
    if history.iter().any(|a| a.checkin_id() == current.checkin_id()) {
        return history;
    }
    let at = history.partition_point(|a| a.timestamp() <= current.timestamp());
    history.insert(at, current.clone());
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::classifier::MockClassifier;
    use crate::adapters::events::InMemoryAlertEventPublisher;
    use crate::adapters::idempotency::InMemoryDeliveryStore;
    use crate::adapters::ledger::InMemoryInterventionLedger;
    use crate::adapters::notification::MockNotificationSender;
    use crate::adapters::profile::InMemoryProfileStore;
    use crate::adapters::resilience::{BreakerRegistry, CLASSIFIER_BREAKER};
    use crate::domain::checkin::SentimentLabel;
    use crate::domain::foundation::RiskScore;
    use crate::ports::CircuitBreakerConfig;
    use std::collections::BTreeSet;
    use std::time::Duration;

    const WEEKDAY_NOON: &str = "2024-03-06T12:00:00Z";

    fn handler(classifier: MockClassifier, profiles: Arc<InMemoryProfileStore>) -> ProcessCheckInHandler {
        let registry = Arc::new(BreakerRegistry::new());
        let breaker = registry.get_or_create(CLASSIFIER_BREAKER, CircuitBreakerConfig::for_classifier());
        let classifier = Arc::new(ResilientClassifier::new(
            Arc::new(classifier),
            breaker,
            Duration::from_secs(2),
        ));
        let dispatcher = AlertDispatcher::new(
            Arc::new(MockNotificationSender::new()),
            Arc::new(InMemoryDeliveryStore::new()),
            Arc::new(InMemoryInterventionLedger::new()),
            Arc::new(InMemoryAlertEventPublisher::new()),
            profiles.clone(),
            registry,
        );
        ProcessCheckInHandler::new(classifier, profiles, dispatcher)
    }

    fn command(text: &str) -> ProcessCheckInCommand {
        ProcessCheckInCommand::new(UserId::new("vet-1").unwrap(), text)
            .at(Timestamp::parse_rfc3339(WEEKDAY_NOON).unwrap())
    }

    #[tokio::test]
    async fn calm_checkin_scores_zero_and_decides_none() {
        let profiles = Arc::new(InMemoryProfileStore::new());
        let h = handler(
            MockClassifier::new().with_sentiment(SentimentLabel::Negative, -0.3),
            profiles.clone(),
        );
        let result = h.handle(command("Had a rough day but pushing through")).await.unwrap();

        assert_eq!(result.assessment.risk_score(), RiskScore::ZERO);
        assert_eq!(result.decision, AlertDecision::None);
        assert!(result.dispatch.tasks.is_empty());
        assert_eq!(profiles.get_history(&UserId::new("vet-1").unwrap()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn strongly_negative_sentiment_alone_raises_standard_alert() {
        let h = handler(
            MockClassifier::new().with_sentiment(SentimentLabel::Negative, -0.7),
            Arc::new(InMemoryProfileStore::new()),
        );
        let result = h.handle(command("Today was bad")).await.unwrap();
        assert_eq!(result.decision, AlertDecision::StandardAlert);
    }

    #[tokio::test]
    async fn oversized_text_is_rejected() {
        let h = handler(MockClassifier::new(), Arc::new(InMemoryProfileStore::new()));
        let text = "a".repeat(crate::domain::checkin::MAX_TEXT_CHARS + 1);
        assert!(matches!(
            h.handle(command(&text)).await,
            Err(CheckInError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn profile_store_outage_still_produces_decision() {
        let profiles = Arc::new(InMemoryProfileStore::new());
        profiles.set_unavailable(true);
        let h = handler(MockClassifier::new(), profiles);

        let result = h
            .handle(command("I have my gun and thinking about ending it all"))
            .await
            .unwrap();
        assert_eq!(result.trajectory, Trajectory::InsufficientData);
        assert_eq!(result.decision, AlertDecision::ImmediateIntervention);
    }

    #[test]
    fn current_assessment_is_inserted_in_time_order_once() {
        let base = Timestamp::parse_rfc3339(WEEKDAY_NOON).unwrap();
        let at = |id: &str, minute: i64| {
            RiskAssessment::new(
                CheckInId::parse(id).unwrap(),
                RiskScore::new(10.0),
                BTreeSet::new(),
                base.plus_minutes(minute),
            )
        };
        let history = vec![at("a", 0), at("c", 20)];

        let merged = with_current(history.clone(), &at("b", 10));
        let ids: Vec<&str> = merged.iter().map(|a| a.checkin_id().as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);

        assert_eq!(with_current(history, &at("c", 20)).len(), 2);
    }
}

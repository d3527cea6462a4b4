//! AlertDispatcher - Executes the dispatch plan for one decision.
//!
//! Every task follows the same path:
//!
//! ```text
//! claim(key) ─┬─ AlreadyDelivered / InFlight ──> Duplicate
//!             └─ Claimed ──> retry { publish AlertEvent; guarded send }
//!                              ├─ ok   ──> mark_delivered ──> Delivered
//!                              └─ fail ──> release ──> failure notice ──> Failed
//! ```
//!
//! A crisis runs its two branches concurrently and joins them without
//! either branch's failure cancelling the other.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::adapters::resilience::{call_guarded, retry_with, BreakerRegistry, RetryOutcome, RetryPolicy};
use crate::domain::alert::{
    AlertDecision, AlertEvent, AlertLevel, AlertMessage, Channel, DispatchPlan, DispatchReport,
    IdempotencyKey, PlannedTask, TaskOutcome, TaskReport,
};
use crate::domain::checkin::CheckIn;
use crate::domain::profile::{ContactMethod, TrustedContact};
use crate::domain::risk::RiskAssessment;
use crate::ports::{
    AlertEventPublisher, CircuitBreakerConfig, ClaimOutcome, DeliveryStore, InterventionLedger,
    Notification, NotificationSender, ProfileStore, Recipient,
};

/// Tunables for channel delivery.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub retry: RetryPolicy,
    /// Deadline for one send attempt.
    pub send_timeout: Duration,
    /// How long a delivery claim blocks other workers.
    pub claim_ttl: Duration,
    pub channel_breaker: CircuitBreakerConfig,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            send_timeout: Duration::from_secs(5),
            claim_ttl: Duration::from_secs(120),
            channel_breaker: CircuitBreakerConfig::for_channel(),
        }
    }
}

/// Everything a dispatch needs, owned so it can move onto its own task.
#[derive(Debug, Clone)]
pub struct DispatchRequest {
    pub checkin: CheckIn,
    pub assessment: RiskAssessment,
    pub decision: AlertDecision,
    pub contact: Option<TrustedContact>,
}

#[derive(Clone)]
pub struct AlertDispatcher {
    sender: Arc<dyn NotificationSender>,
    deliveries: Arc<dyn DeliveryStore>,
    ledger: Arc<dyn InterventionLedger>,
    events: Arc<dyn AlertEventPublisher>,
    profiles: Arc<dyn ProfileStore>,
    breakers: Arc<BreakerRegistry>,
    config: DispatcherConfig,
}

impl AlertDispatcher {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        deliveries: Arc<dyn DeliveryStore>,
        ledger: Arc<dyn InterventionLedger>,
        events: Arc<dyn AlertEventPublisher>,
        profiles: Arc<dyn ProfileStore>,
        breakers: Arc<BreakerRegistry>,
    ) -> Self {
        Self {
            sender,
            deliveries,
            ledger,
            events,
            profiles,
            breakers,
            config: DispatcherConfig::default(),
        }
    }

    pub fn with_config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs every task the decision implies and settles the lifecycle.
    pub async fn dispatch(&self, request: &DispatchRequest) -> DispatchReport {
        let mut report = DispatchReport::new(request.decision);
        let plan = DispatchPlan::for_decision(request.decision, request.contact.as_ref());

        match plan {
            DispatchPlan::Nothing => {}
            DispatchPlan::Single(task) => {
                report.tasks.push(self.run_task(request, &task).await);
            }
            DispatchPlan::Crisis { contact, ops } => {
                error!(
                    checkin_id = %request.checkin.checkin_id(),
                    user_id = %request.checkin.user_id(),
                    risk_score = request.assessment.risk_score().value(),
                    "Crisis protocol engaged"
                );
                let (contact_report, (ops_report, ledger_count)) = futures::join!(
                    self.run_task(request, &contact),
                    self.run_ops_branch(request, &ops),
                );
                report.tasks.push(contact_report);
                report.tasks.push(ops_report);
                report.ledger_count = ledger_count;
            }
        }

        if let Err(e) = report.settle() {
            error!(
                checkin_id = %request.checkin.checkin_id(),
                error = %e,
                "Dispatch lifecycle rejected a transition"
            );
        }
        info!(
            checkin_id = %request.checkin.checkin_id(),
            decision = %request.decision,
            state = ?report.state,
            tasks = report.tasks.len(),
            "Dispatch settled"
        );
        report
    }

    /// Ops notification and ledger increment. The increment happens whether
    /// or not the notification gets through.
    async fn run_ops_branch(&self, request: &DispatchRequest, task: &PlannedTask) -> (TaskReport, Option<u64>) {
        futures::join!(self.run_task(request, task), self.record_crisis(request))
    }

    async fn record_crisis(&self, request: &DispatchRequest) -> Option<u64> {
        let user_id = request.checkin.user_id();
        let at = request.checkin.timestamp();
        match self
            .ledger
            .record_crisis(user_id, request.checkin.checkin_id(), at)
            .await
        {
            Ok(count) => {
                if let Err(e) = self.profiles.record_crisis(user_id, count, at).await {
                    warn!(user_id = %user_id, error = %e, "Failed to mirror crisis count onto profile");
                }
                Some(count)
            }
            Err(e) => {
                error!(
                    user_id = %user_id,
                    checkin_id = %request.checkin.checkin_id(),
                    error = %e,
                    "Intervention ledger increment failed"
                );
                None
            }
        }
    }

    async fn run_task(&self, request: &DispatchRequest, task: &PlannedTask) -> TaskReport {
        match task {
            PlannedTask::Skip { level, reason } => {
                warn!(
                    checkin_id = %request.checkin.checkin_id(),
                    level = %level,
                    reason = %reason,
                    "Alert task skipped"
                );
                TaskReport {
                    level: *level,
                    channel: None,
                    outcome: TaskOutcome::Skipped {
                        reason: reason.clone(),
                    },
                }
            }
            PlannedTask::Send { level, channel } => TaskReport {
                level: *level,
                channel: Some(*channel),
                outcome: self.deliver(request, *level, *channel).await,
            },
        }
    }

    async fn deliver(&self, request: &DispatchRequest, level: AlertLevel, channel: Channel) -> TaskOutcome {
        let checkin = &request.checkin;
        let Some(recipient) = recipient_for(channel, checkin, request.contact.as_ref()) else {
            return TaskOutcome::Skipped {
                reason: format!("no address for {}", channel),
            };
        };

        let key = IdempotencyKey::new(checkin.checkin_id().clone(), level, channel);
        if !self.claim(&key).await {
            info!(idempotency_key = %key, "Alert already delivered or in flight, skipping");
            return TaskOutcome::Duplicate;
        }

        let notification = Notification {
            channel,
            recipient,
            message: AlertMessage::for_alert(level, checkin.user_id(), checkin.text(), &request.assessment),
            idempotency_key: key.clone(),
            user_id: checkin.user_id().clone(),
        };
        let breaker = self
            .breakers
            .get_or_create(&channel.dependency_name(), self.config.channel_breaker.clone());
        let breaker = breaker.as_ref();
        let notification = &notification;
        let key_ref = &key;
        let timeout = self.config.send_timeout;

        let outcome = retry_with(&self.config.retry, channel.as_str(), |attempt| async move {
            self.publish(AlertEvent::attempt(key_ref, &notification.user_id, attempt))
                .await;
            call_guarded(breaker, timeout, self.sender.send(notification)).await
        })
        .await;

        match outcome {
            RetryOutcome::Succeeded { attempts, .. } => {
                if let Err(e) = self.deliveries.mark_delivered(&key).await {
                    warn!(idempotency_key = %key, error = %e, "Failed to record delivery");
                }
                info!(idempotency_key = %key, attempts = attempts, "Alert delivered");
                TaskOutcome::Delivered { attempts }
            }
            RetryOutcome::Failed { error: err, attempts } => {
                if let Err(e) = self.deliveries.release(&key).await {
                    warn!(idempotency_key = %key, error = %e, "Failed to release delivery claim");
                }
                let error_text = err.to_string();
                error!(
                    idempotency_key = %key,
                    attempts = attempts,
                    error = %error_text,
                    "Alert delivery exhausted retries"
                );
                let notice_sent = self.send_failure_notice(request, level, channel, &error_text).await;
                TaskOutcome::Failed {
                    attempts,
                    error: error_text,
                    notice_sent,
                }
            }
        }
    }

    /// Single-attempt notice to the escalation channel.
    async fn send_failure_notice(
        &self,
        request: &DispatchRequest,
        failed_level: AlertLevel,
        failed_channel: Channel,
        error_text: &str,
    ) -> bool {
        let checkin = &request.checkin;
        let key = IdempotencyKey::new(checkin.checkin_id().clone(), AlertLevel::FailureNotice, failed_channel);
        if !self.claim(&key).await {
            return true;
        }

        let notification = Notification {
            channel: Channel::OpsEscalation,
            recipient: Recipient::Operations,
            message: AlertMessage::failure_notice(
                checkin.checkin_id(),
                checkin.user_id(),
                failed_level,
                failed_channel,
                error_text,
            ),
            idempotency_key: key.clone(),
            user_id: checkin.user_id().clone(),
        };

        self.publish(AlertEvent {
            channel: Channel::OpsEscalation,
            ..AlertEvent::attempt(&key, checkin.user_id(), 1)
        })
        .await;

        let breaker = self.breakers.get_or_create(
            &Channel::OpsEscalation.dependency_name(),
            self.config.channel_breaker.clone(),
        );
        match call_guarded(breaker.as_ref(), self.config.send_timeout, self.sender.send(&notification)).await {
            Ok(()) => {
                if let Err(e) = self.deliveries.mark_delivered(&key).await {
                    warn!(idempotency_key = %key, error = %e, "Failed to record failure notice delivery");
                }
                true
            }
            Err(e) => {
                if let Err(release_err) = self.deliveries.release(&key).await {
                    warn!(idempotency_key = %key, error = %release_err, "Failed to release notice claim");
                }
                error!(
                    idempotency_key = %key,
                    error = %e,
                    "Failure notice could not be delivered"
                );
                false
            }
        }
    }

    /// Returns true when this worker owns the key.
    ///
    /// An unreachable delivery store does not block the alert: at-least-once
    /// delivery is preferred over a silently dropped crisis notification.
    async fn claim(&self, key: &IdempotencyKey) -> bool {
        match self.deliveries.claim(key, self.config.claim_ttl).await {
            Ok(ClaimOutcome::Claimed) => true,
            Ok(ClaimOutcome::AlreadyDelivered) | Ok(ClaimOutcome::InFlight) => false,
            Err(e) => {
                warn!(idempotency_key = %key, error = %e, "Delivery store unavailable, sending without dedup");
                true
            }
        }
    }

    async fn publish(&self, event: AlertEvent) {
        if let Err(e) = self.events.publish(&event).await {
            warn!(
                idempotency_key = %event.idempotency_key,
                attempt = event.attempt,
                error = %e,
                "Failed to publish alert event"
            );
        }
    }
}

fn recipient_for(channel: Channel, checkin: &CheckIn, contact: Option<&TrustedContact>) -> Option<Recipient> {
    match channel {
        Channel::TrustedContactSms => contact
            .and_then(|c| c.address(ContactMethod::Sms))
            .map(|phone| Recipient::Phone(phone.to_string())),
        Channel::TrustedContactEmail => contact
            .and_then(|c| c.address(ContactMethod::Email))
            .map(|email| Recipient::Email(email.to_string())),
        Channel::OpsTeam | Channel::OpsEscalation => Some(Recipient::Operations),
        Channel::UserOutreach => Some(Recipient::User(checkin.user_id().clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryAlertEventPublisher;
    use crate::adapters::idempotency::InMemoryDeliveryStore;
    use crate::adapters::ledger::InMemoryInterventionLedger;
    use crate::adapters::notification::MockNotificationSender;
    use crate::adapters::profile::InMemoryProfileStore;
    use crate::domain::alert::DispatchState;
    use crate::domain::foundation::{CheckInId, RiskScore, Timestamp, UserId};
    use crate::ports::ChannelError;
    use std::collections::BTreeSet;

    struct Harness {
        sender: Arc<MockNotificationSender>,
        deliveries: Arc<InMemoryDeliveryStore>,
        ledger: Arc<InMemoryInterventionLedger>,
        events: Arc<InMemoryAlertEventPublisher>,
        profiles: Arc<InMemoryProfileStore>,
        dispatcher: AlertDispatcher,
    }

    fn harness(sender: MockNotificationSender) -> Harness {
        let sender = Arc::new(sender);
        let deliveries = Arc::new(InMemoryDeliveryStore::new());
        let ledger = Arc::new(InMemoryInterventionLedger::new());
        let events = Arc::new(InMemoryAlertEventPublisher::new());
        let profiles = Arc::new(InMemoryProfileStore::new());
        let dispatcher = AlertDispatcher::new(
            sender.clone(),
            deliveries.clone(),
            ledger.clone(),
            events.clone(),
            profiles.clone(),
            Arc::new(BreakerRegistry::new()),
        )
        .with_config(DispatcherConfig {
            retry: RetryPolicy::default().without_jitter(),
            ..DispatcherConfig::default()
        });
        Harness {
            sender,
            deliveries,
            ledger,
            events,
            profiles,
            dispatcher,
        }
    }

    fn user() -> UserId {
        UserId::new("vet-1").unwrap()
    }

    fn request(decision: AlertDecision, contact: Option<TrustedContact>) -> DispatchRequest {
        let checkin = CheckIn::new(
            CheckInId::parse("c-100").unwrap(),
            user(),
            "I have my gun and thinking about ending it all",
            Timestamp::parse_rfc3339("2024-03-06T12:00:00Z").unwrap(),
        )
        .unwrap();
        let assessment = RiskAssessment::new(
            checkin.checkin_id().clone(),
            RiskScore::new(97.0),
            BTreeSet::new(),
            checkin.timestamp(),
        );
        DispatchRequest {
            checkin,
            assessment,
            decision,
            contact,
        }
    }

    fn sms_contact() -> TrustedContact {
        TrustedContact::new("Alex", ContactMethod::Sms, Some("+15550101".into()), None).unwrap()
    }

    #[tokio::test]
    async fn no_decision_dispatches_nothing() {
        let h = harness(MockNotificationSender::new());
        let report = h.dispatcher.dispatch(&request(AlertDecision::None, None)).await;

        assert!(report.tasks.is_empty());
        assert_eq!(report.state, DispatchState::Completed);
        assert_eq!(report.transitions, vec![DispatchState::Evaluating, DispatchState::Completed]);
        assert_eq!(h.sender.attempt_count(), 0);
    }

    #[tokio::test]
    async fn crisis_notifies_both_branches_and_counts_once() {
        let h = harness(MockNotificationSender::new());
        let report = h
            .dispatcher
            .dispatch(&request(AlertDecision::CrisisProtocol, Some(sms_contact())))
            .await;

        assert_eq!(report.state, DispatchState::Completed);
        assert_eq!(report.ledger_count, Some(1));
        assert_eq!(h.sender.sent_to(Channel::TrustedContactSms).len(), 1);
        assert_eq!(h.sender.sent_to(Channel::OpsTeam).len(), 1);
        assert_eq!(h.events.event_count(), 2);
        assert_eq!(h.deliveries.delivered_count(), 2);

        let profile = h.profiles.load_profile(&user()).await.unwrap();
        assert_eq!(profile.crisis_intervention_count(), 1);
    }

    #[tokio::test]
    async fn replayed_crisis_is_deduplicated() {
        let h = harness(MockNotificationSender::new());
        let req = request(AlertDecision::CrisisProtocol, Some(sms_contact()));
        h.dispatcher.dispatch(&req).await;
        let replay = h.dispatcher.dispatch(&req).await;

        assert!(replay.tasks.iter().all(|t| t.outcome == TaskOutcome::Duplicate));
        assert_eq!(replay.ledger_count, Some(1));
        assert_eq!(h.sender.sent_count(), 2);
        assert_eq!(h.ledger.snapshot(&user()).await.unwrap().crisis_intervention_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn contact_failure_is_partial_and_emits_notice() {
        let sender = MockNotificationSender::new()
            .failing_channel(Channel::TrustedContactSms, ChannelError::unavailable("sms gateway down"));
        let h = harness(sender);
        let report = h
            .dispatcher
            .dispatch(&request(AlertDecision::CrisisProtocol, Some(sms_contact())))
            .await;

        assert!(report.partially_failed());
        assert_eq!(report.state, DispatchState::Completed);
        assert!(matches!(
            report.tasks[0].outcome,
            TaskOutcome::Failed {
                attempts: 3,
                notice_sent: true,
                ..
            }
        ));
        assert_eq!(report.tasks[1].outcome, TaskOutcome::Delivered { attempts: 1 });
        assert_eq!(h.sender.sent_to(Channel::OpsEscalation).len(), 1);
        assert_eq!(
            h.events
                .events_for(AlertLevel::Crisis, Channel::TrustedContactSms)
                .len(),
            3
        );
    }

    #[tokio::test(start_paused = true)]
    async fn ledger_increments_even_when_ops_notification_fails() {
        let sender = MockNotificationSender::new()
            .failing_channel(Channel::OpsTeam, ChannelError::unavailable("pager down"));
        let h = harness(sender);
        let report = h
            .dispatcher
            .dispatch(&request(AlertDecision::CrisisProtocol, Some(sms_contact())))
            .await;

        assert_eq!(report.ledger_count, Some(1));
        assert!(report.partially_failed());
        assert_eq!(h.sender.sent_to(Channel::TrustedContactSms).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn crisis_that_delivers_nothing_fails() {
        let sender = MockNotificationSender::new()
            .failing_channel(Channel::OpsTeam, ChannelError::unavailable("pager down"));
        let h = harness(sender);
        let report = h
            .dispatcher
            .dispatch(&request(AlertDecision::CrisisProtocol, None))
            .await;

        assert!(matches!(report.tasks[0].outcome, TaskOutcome::Skipped { .. }));
        assert!(report.tasks[1].outcome.is_failure());
        assert_eq!(report.state, DispatchState::Failed);
        assert!(!report.partially_failed());
        assert_eq!(report.ledger_count, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn single_task_failure_fails_dispatch() {
        let h = harness(MockNotificationSender::always_failing(ChannelError::unavailable("down")));
        let report = h
            .dispatcher
            .dispatch(&request(AlertDecision::StandardAlert, Some(sms_contact())))
            .await;

        assert_eq!(report.state, DispatchState::Failed);
        assert!(matches!(
            report.tasks[0].outcome,
            TaskOutcome::Failed { notice_sent: false, .. }
        ));
        // The failed claim was released so a later replay may try again.
        let key = IdempotencyKey::new(
            CheckInId::parse("c-100").unwrap(),
            AlertLevel::Standard,
            Channel::TrustedContactSms,
        );
        assert!(!h.deliveries.is_delivered(&key).await.unwrap());
    }

    #[tokio::test]
    async fn permanent_rejection_is_not_retried() {
        let sender = MockNotificationSender::new().with_error(ChannelError::rejected("opted out"));
        let h = harness(sender);
        let report = h
            .dispatcher
            .dispatch(&request(AlertDecision::StandardAlert, Some(sms_contact())))
            .await;

        assert!(matches!(
            report.tasks[0].outcome,
            TaskOutcome::Failed { attempts: 1, notice_sent: true, .. }
        ));
    }

    #[tokio::test]
    async fn standard_alert_without_contact_is_skipped() {
        let h = harness(MockNotificationSender::new());
        let report = h
            .dispatcher
            .dispatch(&request(AlertDecision::StandardAlert, None))
            .await;

        assert!(matches!(report.tasks[0].outcome, TaskOutcome::Skipped { .. }));
        assert_eq!(report.state, DispatchState::Completed);
        assert_eq!(h.sender.attempt_count(), 0);
    }

    #[tokio::test]
    async fn immediate_without_contact_goes_to_ops() {
        let h = harness(MockNotificationSender::new());
        h.dispatcher
            .dispatch(&request(AlertDecision::ImmediateIntervention, None))
            .await;
        assert_eq!(h.sender.sent_to(Channel::OpsTeam).len(), 1);
    }

    #[tokio::test]
    async fn outreach_goes_to_the_user() {
        let h = harness(MockNotificationSender::new());
        h.dispatcher
            .dispatch(&request(AlertDecision::ProactiveOutreach, Some(sms_contact())))
            .await;
        let sent = h.sender.sent_to(Channel::UserOutreach);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, Recipient::User(user()));
    }

    #[tokio::test]
    async fn broken_event_feed_does_not_block_delivery() {
        let sender = Arc::new(MockNotificationSender::new());
        let dispatcher = AlertDispatcher::new(
            sender.clone(),
            Arc::new(InMemoryDeliveryStore::new()),
            Arc::new(InMemoryInterventionLedger::new()),
            Arc::new(InMemoryAlertEventPublisher::failing()),
            Arc::new(InMemoryProfileStore::new()),
            Arc::new(BreakerRegistry::new()),
        );
        let report = dispatcher
            .dispatch(&request(AlertDecision::ImmediateIntervention, Some(sms_contact())))
            .await;
        assert_eq!(report.state, DispatchState::Completed);
        assert_eq!(sender.sent_count(), 1);
    }
}

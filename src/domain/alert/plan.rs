//! Channel selection for a decision.

use super::{AlertDecision, AlertLevel, Channel};
use crate::domain::profile::TrustedContact;

/// One unit of dispatch work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedTask {
    Send { level: AlertLevel, channel: Channel },
    /// Nothing to send to; reported, not failed.
    Skip { level: AlertLevel, reason: String },
}

impl PlannedTask {
    pub fn level(&self) -> AlertLevel {
        match self {
            PlannedTask::Send { level, .. } | PlannedTask::Skip { level, .. } => *level,
        }
    }
}

/// Work implied by a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchPlan {
    Nothing,
    Single(PlannedTask),
    /// Two independent branches run concurrently. The ops branch also
    /// records the intervention.
    Crisis {
        contact: PlannedTask,
        ops: PlannedTask,
    },
}

impl DispatchPlan {
    pub fn for_decision(decision: AlertDecision, contact: Option<&TrustedContact>) -> Self {
        let contact_channel = contact
            .and_then(|c| c.reachable_method())
            .map(Channel::for_contact);

        match decision {
            AlertDecision::None => DispatchPlan::Nothing,
            AlertDecision::CrisisProtocol => DispatchPlan::Crisis {
                contact: match contact_channel {
                    Some(channel) => PlannedTask::Send {
                        level: AlertLevel::Crisis,
                        channel,
                    },
                    None => PlannedTask::Skip {
                        level: AlertLevel::Crisis,
                        reason: "no trusted contact configured".to_string(),
                    },
                },
                ops: PlannedTask::Send {
                    level: AlertLevel::Crisis,
                    channel: Channel::OpsTeam,
                },
            },
            AlertDecision::ImmediateIntervention => DispatchPlan::Single(PlannedTask::Send {
                level: AlertLevel::Immediate,
                channel: contact_channel.unwrap_or(Channel::OpsTeam),
            }),
            AlertDecision::StandardAlert => DispatchPlan::Single(match contact_channel {
                Some(channel) => PlannedTask::Send {
                    level: AlertLevel::Standard,
                    channel,
                },
                None => PlannedTask::Skip {
                    level: AlertLevel::Standard,
                    reason: "no trusted contact configured".to_string(),
                },
            }),
            AlertDecision::ProactiveOutreach => DispatchPlan::Single(PlannedTask::Send {
                level: AlertLevel::Proactive,
                channel: Channel::UserOutreach,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::profile::ContactMethod;

    fn sms_contact() -> TrustedContact {
        TrustedContact::new("Sam", ContactMethod::Sms, Some("+15550100".into()), None).unwrap()
    }

    #[test]
    fn none_plans_nothing() {
        assert_eq!(
            DispatchPlan::for_decision(AlertDecision::None, Some(&sms_contact())),
            DispatchPlan::Nothing
        );
    }

    #[test]
    fn crisis_fans_out_to_contact_and_ops() {
        let plan = DispatchPlan::for_decision(AlertDecision::CrisisProtocol, Some(&sms_contact()));
        assert_eq!(
            plan,
            DispatchPlan::Crisis {
                contact: PlannedTask::Send {
                    level: AlertLevel::Crisis,
                    channel: Channel::TrustedContactSms
                },
                ops: PlannedTask::Send {
                    level: AlertLevel::Crisis,
                    channel: Channel::OpsTeam
                },
            }
        );
    }

    #[test]
    fn crisis_without_contact_skips_contact_branch() {
        let plan = DispatchPlan::for_decision(AlertDecision::CrisisProtocol, None);
        assert!(matches!(
            plan,
            DispatchPlan::Crisis {
                contact: PlannedTask::Skip { .. },
                ops: PlannedTask::Send { channel: Channel::OpsTeam, .. }
            }
        ));
    }

    #[test]
    fn immediate_falls_back_to_ops_team() {
        assert_eq!(
            DispatchPlan::for_decision(AlertDecision::ImmediateIntervention, None),
            DispatchPlan::Single(PlannedTask::Send {
                level: AlertLevel::Immediate,
                channel: Channel::OpsTeam
            })
        );
    }

    #[test]
    fn standard_without_contact_is_skipped() {
        let plan = DispatchPlan::for_decision(AlertDecision::StandardAlert, None);
        assert!(matches!(plan, DispatchPlan::Single(PlannedTask::Skip { level: AlertLevel::Standard, .. })));
    }

    #[test]
    fn outreach_goes_to_user() {
        assert_eq!(
            DispatchPlan::for_decision(AlertDecision::ProactiveOutreach, Some(&sms_contact())),
            DispatchPlan::Single(PlannedTask::Send {
                level: AlertLevel::Proactive,
                channel: Channel::UserOutreach
            })
        );
    }
}

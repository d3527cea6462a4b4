//! Dispatch lifecycle and its report.

use serde::{Deserialize, Serialize};

use super::{AlertDecision, AlertLevel, Channel};
use crate::domain::foundation::{DomainError, ErrorCode, StateMachine};

/// Lifecycle of a single check-in's dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchState {
    Evaluating,
    Dispatching,
    /// One crisis branch failed, the other did not.
    PartiallyFailed,
    Completed,
    Failed,
}

impl StateMachine for DispatchState {
    fn valid_transitions(&self) -> Vec<Self> {
        use DispatchState::*;
        match self {
            Evaluating => vec![Dispatching, Completed],
            Dispatching => vec![Completed, Failed, PartiallyFailed],
            PartiallyFailed => vec![Completed],
            Completed | Failed => vec![],
        }
    }
}

/// Result of one dispatch task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskOutcome {
    Delivered { attempts: u32 },
    /// Already delivered under the same idempotency key.
    Duplicate,
    Skipped { reason: String },
    /// Retries exhausted. A failure notice was emitted if `notice_sent`.
    #[serde(rename_all = "camelCase")]
    Failed {
        attempts: u32,
        error: String,
        notice_sent: bool,
    },
}

impl TaskOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, TaskOutcome::Failed { .. })
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        self.is_failure().then_some(ErrorCode::ChannelDispatchFailure)
    }

    /// The notification reached the channel, now or on an earlier run.
    pub fn is_delivered(&self) -> bool {
        matches!(self, TaskOutcome::Delivered { .. } | TaskOutcome::Duplicate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub level: AlertLevel,
    pub channel: Option<Channel>,
    pub outcome: TaskOutcome,
}

/// Everything a dispatch did, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchReport {
    pub decision: AlertDecision,
    pub state: DispatchState,
    pub transitions: Vec<DispatchState>,
    pub tasks: Vec<TaskReport>,
    pub ledger_count: Option<u64>,
}

impl DispatchReport {
    pub fn new(decision: AlertDecision) -> Self {
        Self {
            decision,
            state: DispatchState::Evaluating,
            transitions: vec![DispatchState::Evaluating],
            tasks: Vec::new(),
            ledger_count: None,
        }
    }

    /// Moves to `target`, rejecting transitions the lifecycle forbids.
    pub fn advance(&mut self, target: DispatchState) -> Result<(), DomainError> {
        self.state = self.state.transition_to(target)?;
        self.transitions.push(target);
        Ok(())
    }

    /// Walks the lifecycle to its terminal state from the recorded tasks.
    ///
    /// Only a crisis dispatch, with its two independent branches, can pass
    /// through `PartiallyFailed`, and only when some branch delivered; that
    /// path still ends `Completed`. A skipped branch delivers nothing.
    pub fn settle(&mut self) -> Result<(), DomainError> {
        if self.tasks.is_empty() {
            return self.advance(DispatchState::Completed);
        }

        self.advance(DispatchState::Dispatching)?;
        let failures = self.tasks.iter().filter(|t| t.outcome.is_failure()).count();
        let crisis = self.decision == AlertDecision::CrisisProtocol;
        let delivered = self.tasks.iter().any(|t| t.outcome.is_delivered());

        if failures == 0 {
            self.advance(DispatchState::Completed)
        } else if crisis && delivered {
            self.advance(DispatchState::PartiallyFailed)?;
            self.advance(DispatchState::Completed)
        } else {
            self.advance(DispatchState::Failed)
        }
    }

    /// Code of the first failed task, if any.
    pub fn error_code(&self) -> Option<ErrorCode> {
        self.tasks.iter().find_map(|t| t.outcome.error_code())
    }

    pub fn partially_failed(&self) -> bool {
        self.transitions.contains(&DispatchState::PartiallyFailed)
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

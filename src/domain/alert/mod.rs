//! Alert module - routing decisions, channel plans and dispatch lifecycle.
//!
//! # Components
//!
//! - `AlertPolicy` - Ordered first-match-wins rules producing an `AlertDecision`
//! - `DispatchPlan` - Which channels a decision fans out to
//! - `DispatchReport` - Lifecycle state machine plus per-task outcomes
//! - `AlertMessage` - Notification templates
//!
//! Decisions are pure. Executing a plan is the dispatcher's job.

mod channel;
mod decision;
mod dispatch_state;
mod event;
mod message;
mod plan;
mod policy;

pub use channel::{AlertLevel, Channel, IdempotencyKey};
pub use decision::AlertDecision;
pub use dispatch_state::{DispatchReport, DispatchState, TaskOutcome, TaskReport};
pub use event::AlertEvent;
pub use message::{preview, AlertMessage, CRISIS_LINE, CRISIS_URL, PREVIEW_CHARS};
pub use plan::{DispatchPlan, PlannedTask};
pub use policy::{AlertPolicy, AlertRule, DecisionInput, RoutingThresholds, RuleCondition};

//! HTTP DTOs for check-in endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::checkin::ProcessCheckInResult;
use crate::domain::alert::{AlertDecision, DispatchReport};
use crate::domain::checkin::UnavailableReason;
use crate::domain::risk::Trajectory;
use crate::ports::CircuitBreakerMetrics;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Inbound check-in.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitCheckInRequest {
    /// Upstream identifier. Resubmitting the same id never re-sends alerts.
    pub checkin_id: Option<String>,
    pub user_id: String,
    pub text: String,
    /// RFC 3339. Defaults to the time of receipt.
    pub timestamp: Option<String>,
    pub utc_offset_minutes: Option<i32>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub risk_score: f64,
    pub risk_factors: Vec<String>,
    pub requires_immediate_attention: bool,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInResponse {
    pub checkin_id: String,
    pub user_id: String,
    pub assessment: AssessmentResponse,
    pub trajectory: Trajectory,
    pub decision: AlertDecision,
    pub dispatch: DispatchReport,
    pub classification_unavailable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unavailable_reason: Option<UnavailableReason>,
    /// `CLASSIFICATION_UNAVAILABLE` or `CIRCUIT_OPEN` when scoring ran without
    /// the classifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_error_code: Option<String>,
    /// `CHANNEL_DISPATCH_FAILURE` when any notification task failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatch_error_code: Option<String>,
}

impl From<ProcessCheckInResult> for CheckInResponse {
    fn from(result: ProcessCheckInResult) -> Self {
        let assessment = &result.assessment;
        Self {
            checkin_id: result.checkin.checkin_id().to_string(),
            user_id: result.checkin.user_id().to_string(),
            assessment: AssessmentResponse {
                risk_score: assessment.risk_score().value(),
                risk_factors: assessment.risk_factors().iter().cloned().collect(),
                requires_immediate_attention: assessment.requires_immediate_attention(),
                timestamp: assessment.timestamp().to_rfc3339(),
            },
            trajectory: result.trajectory,
            decision: result.decision,
            classification_unavailable: result.classification.is_unavailable(),
            unavailable_reason: result.classification.unavailable_reason().cloned(),
            classification_error_code: result
                .classification
                .unavailable_reason()
                .map(|r| r.error_code().to_string()),
            dispatch_error_code: result.dispatch.error_code().map(|c| c.to_string()),
            dispatch: result.dispatch,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BreakersResponse {
    pub breakers: Vec<CircuitBreakerMetrics>,
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}

//! HTTP handlers for check-in endpoints.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::error;

use crate::adapters::resilience::BreakerRegistry;
use crate::application::handlers::checkin::{
    CheckInError, ProcessCheckInCommand, ProcessCheckInHandler,
};
use crate::domain::foundation::{CheckInId, Timestamp, UserId};

use super::dto::{BreakersResponse, CheckInResponse, ErrorResponse, SubmitCheckInRequest};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for check-in routes.
#[derive(Clone)]
pub struct CheckInAppState {
    pub handler: Arc<ProcessCheckInHandler>,
    pub breakers: Arc<BreakerRegistry>,
}

impl CheckInAppState {
    pub fn new(handler: Arc<ProcessCheckInHandler>, breakers: Arc<BreakerRegistry>) -> Self {
        Self { handler, breakers }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/checkins - Score a check-in and dispatch its alert
pub async fn submit_checkin(
    State(state): State<CheckInAppState>,
    Json(request): Json<SubmitCheckInRequest>,
) -> Result<impl IntoResponse, CheckInApiError> {
    let cmd = into_command(request)?;
    let result = state.handler.handle(cmd).await?;
    Ok((StatusCode::OK, Json(CheckInResponse::from(result))))
}

/// GET /api/resilience/breakers - Breaker metrics for every dependency
pub async fn list_breakers(State(state): State<CheckInAppState>) -> impl IntoResponse {
    Json(BreakersResponse {
        breakers: state.breakers.metrics(),
    })
}

fn into_command(request: SubmitCheckInRequest) -> Result<ProcessCheckInCommand, CheckInApiError> {
    let user_id = UserId::new(request.user_id)
        .map_err(|e| CheckInApiError::BadRequest(e.to_string()))?;
    let mut cmd = ProcessCheckInCommand::new(user_id, request.text);

    if let Some(id) = request.checkin_id {
        let id = CheckInId::parse(id).map_err(|e| CheckInApiError::BadRequest(e.to_string()))?;
        cmd = cmd.with_checkin_id(id);
    }
    if let Some(raw) = request.timestamp {
        let ts = Timestamp::parse_rfc3339(&raw)
            .map_err(|_| CheckInApiError::BadRequest(format!("Invalid timestamp: {}", raw)))?;
        cmd = cmd.at(ts);
    }
    if let Some(minutes) = request.utc_offset_minutes {
        cmd = cmd.with_utc_offset(minutes);
    }
    Ok(cmd)
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error type that converts application errors to HTTP responses.
#[derive(Debug)]
pub enum CheckInApiError {
    BadRequest(String),
    Internal(String),
}

impl From<CheckInError> for CheckInApiError {
    fn from(err: CheckInError) -> Self {
        match err {
            CheckInError::Validation(e) => CheckInApiError::BadRequest(e.to_string()),
            CheckInError::DispatchAborted(msg) => {
                error!(error = %msg, "Alert dispatch aborted");
                CheckInApiError::Internal("Alert dispatch aborted".to_string())
            }
        }
    }
}

impl IntoResponse for CheckInApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            CheckInApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, ErrorResponse::bad_request(msg))
            }
            CheckInApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal(msg))
            }
        };

        (status, Json(error)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> SubmitCheckInRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn command_carries_optional_fields() {
        let cmd = into_command(request(
            r#"{"checkinId": "c-9", "userId": "vet-1", "text": "hi",
                "timestamp": "2024-03-06T12:00:00Z", "utcOffsetMinutes": 60}"#,
        ))
        .unwrap();
        assert_eq!(cmd.checkin_id.unwrap().as_str(), "c-9");
        assert_eq!(cmd.timestamp.unwrap().to_rfc3339(), "2024-03-06T12:00:00+00:00");
        assert_eq!(cmd.utc_offset_minutes, Some(60));
    }

    #[test]
    fn blank_user_id_is_bad_request() {
        let err = into_command(request(r#"{"userId": " ", "text": "hi"}"#)).unwrap_err();
        assert!(matches!(err, CheckInApiError::BadRequest(_)));
    }

    #[test]
    fn malformed_timestamp_is_bad_request() {
        let err = into_command(request(
            r#"{"userId": "vet-1", "text": "hi", "timestamp": "yesterday"}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, CheckInApiError::BadRequest(_)));
    }

    #[test]
    fn dispatch_abort_maps_to_internal() {
        let err = CheckInApiError::from(CheckInError::DispatchAborted("panicked".into()));
        assert!(matches!(err, CheckInApiError::Internal(_)));
    }
}

//! Route configuration for check-in endpoints.

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{list_breakers, submit_checkin, CheckInAppState};

/// Creates the check-in router.
///
/// Routes:
/// - `POST /api/checkins` - Score a check-in and dispatch its alert
/// - `GET /api/resilience/breakers` - Breaker metrics
pub fn checkin_router() -> Router<CheckInAppState> {
    Router::new()
        .route("/api/checkins", post(submit_checkin))
        .route("/api/resilience/breakers", get(list_breakers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::classifier::{MockClassifier, ResilientClassifier};
    use crate::adapters::events::InMemoryAlertEventPublisher;
    use crate::adapters::idempotency::InMemoryDeliveryStore;
    use crate::adapters::ledger::InMemoryInterventionLedger;
    use crate::adapters::notification::MockNotificationSender;
    use crate::adapters::profile::InMemoryProfileStore;
    use crate::adapters::resilience::{BreakerRegistry, CLASSIFIER_BREAKER};
    use crate::application::{AlertDispatcher, ProcessCheckInHandler};
    use crate::ports::{CircuitBreakerConfig, ClassifierError};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> Router {
        app_with(MockClassifier::new())
    }

    fn app_with(classifier: MockClassifier) -> Router {
        let registry = Arc::new(BreakerRegistry::new());
        let breaker = registry.get_or_create(CLASSIFIER_BREAKER, CircuitBreakerConfig::for_classifier());
        let classifier = Arc::new(ResilientClassifier::new(
            Arc::new(classifier),
            breaker,
            Duration::from_secs(2),
        ));
        let profiles = Arc::new(InMemoryProfileStore::new());
        let dispatcher = AlertDispatcher::new(
            Arc::new(MockNotificationSender::new()),
            Arc::new(InMemoryDeliveryStore::new()),
            Arc::new(InMemoryInterventionLedger::new()),
            Arc::new(InMemoryAlertEventPublisher::new()),
            profiles.clone(),
            registry.clone(),
        );
        let handler = Arc::new(ProcessCheckInHandler::new(classifier, profiles, dispatcher));
        checkin_router().with_state(CheckInAppState::new(handler, registry))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn submit_checkin_returns_assessment_and_decision() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/checkins")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"userId": "vet-1", "text": "Had a rough day but pushing through",
                            "timestamp": "2024-03-06T12:00:00Z"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["assessment"]["riskScore"], 0.0);
        assert_eq!(body["decision"], "none");
        assert_eq!(body["trajectory"], "insufficient_data");
        assert_eq!(body["classificationUnavailable"], false);
        assert_eq!(body["dispatch"]["state"], "completed");
        assert!(body.get("classificationErrorCode").is_none());
        assert!(body.get("dispatchErrorCode").is_none());
    }

    #[tokio::test]
    async fn classifier_outage_is_tagged_with_error_code() {
        let classifier = MockClassifier::always_failing(ClassifierError::unavailable("503"));
        let response = app_with(classifier)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/checkins")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        r#"{"userId": "vet-1", "text": "Had a rough day but pushing through",
                            "timestamp": "2024-03-06T12:00:00Z"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["classificationUnavailable"], true);
        assert_eq!(body["classificationErrorCode"], "CLASSIFICATION_UNAVAILABLE");
    }

    #[tokio::test]
    async fn blank_user_id_is_rejected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/checkins")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"userId": "", "text": "hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn breakers_endpoint_lists_classifier() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/resilience/breakers")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let names: Vec<&str> = body["breakers"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|b| b["name"].as_str())
            .collect();
        assert!(names.contains(&"classifier"));
    }
}

//! Service wiring: picks adapters from configuration and builds the router.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use redis::aio::MultiplexedConnection;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::adapters::classifier::{HttpClassifier, HttpClassifierConfig, ResilientClassifier};
use crate::adapters::events::TracingAlertEventPublisher;
use crate::adapters::http::{checkin_router, CheckInAppState};
use crate::adapters::idempotency::{InMemoryDeliveryStore, RedisDeliveryStore};
use crate::adapters::ledger::{InMemoryInterventionLedger, RedisInterventionLedger};
use crate::adapters::notification::{
    LoggingNotificationSender, WebhookConfig, WebhookNotificationSender,
};
use crate::adapters::profile::InMemoryProfileStore;
use crate::adapters::resilience::{BreakerRegistry, CLASSIFIER_BREAKER};
use crate::application::{AlertDispatcher, DispatcherConfig, ProcessCheckInHandler};
use crate::config::{AppConfig, ClassifierConfig, NotificationConfig, RedisConfig, ValidationError};
use crate::domain::alert::AlertPolicy;
use crate::ports::{
    ChannelError, ClassifierError, DeliveryStore, InterventionLedger, NotificationSender,
};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("classifier client: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("notification client: {0}")]
    Notification(#[from] ChannelError),

    #[error("redis: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("redis connection timed out")]
    RedisTimeout,

    #[error("server: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds the application state from configuration.
///
/// Without Redis the ledger and delivery claims live in process memory,
/// which is only correct for a single instance.
pub async fn build_state(config: &AppConfig) -> Result<CheckInAppState, StartupError> {
    let breakers = Arc::new(BreakerRegistry::new());
    let classifier = Arc::new(build_classifier(&config.classifier, &breakers)?);
    let sender = build_sender(&config.notification)?;
    let (deliveries, ledger) = build_stores(config.redis.as_ref()).await?;
    let profiles = Arc::new(InMemoryProfileStore::new());

    let claim_ttl = config
        .redis
        .as_ref()
        .map(RedisConfig::claim_ttl)
        .unwrap_or(DispatcherConfig::default().claim_ttl);
    let dispatcher = AlertDispatcher::new(
        sender,
        deliveries,
        ledger,
        Arc::new(TracingAlertEventPublisher::new()),
        profiles.clone(),
        breakers.clone(),
    )
    .with_config(DispatcherConfig {
        retry: config.notification.retry_policy(),
        send_timeout: config.notification.timeout(),
        claim_ttl,
        channel_breaker: config.notification.breaker(),
    });

    let handler = ProcessCheckInHandler::new(classifier, profiles, dispatcher)
        .with_policy(AlertPolicy::from_thresholds(config.routing.thresholds()));

    Ok(CheckInAppState::new(Arc::new(handler), breakers))
}

fn build_classifier(
    config: &ClassifierConfig,
    breakers: &BreakerRegistry,
) -> Result<ResilientClassifier, StartupError> {
    let breaker = breakers.get_or_create(CLASSIFIER_BREAKER, config.breaker());
    let Some(base_url) = config.base_url.as_deref().filter(|_| config.is_configured()) else {
        warn!("No classifier configured, scoring from crisis patterns only");
        return Ok(ResilientClassifier::not_configured(breaker));
    };

    let mut http = HttpClassifierConfig::new(base_url).with_timeout(config.timeout());
    if let Some(key) = &config.api_key {
        http = http.with_api_key(key.clone());
    }
    let inner = HttpClassifier::new(http)?;
    info!(base_url = %base_url, "Classifier configured");
    Ok(ResilientClassifier::new(Arc::new(inner), breaker, config.timeout()))
}

fn build_sender(config: &NotificationConfig) -> Result<Arc<dyn NotificationSender>, StartupError> {
    let Some(url) = config.webhook_url.as_deref().filter(|u| !u.trim().is_empty()) else {
        warn!("No notification relay configured, alerts are logged only");
        return Ok(Arc::new(LoggingNotificationSender::new()));
    };

    let mut webhook = WebhookConfig::new(url).with_timeout(config.timeout());
    if let Some(key) = &config.api_key {
        webhook = webhook.with_api_key(key.clone());
    }
    info!(url = %url, "Notification relay configured");
    Ok(Arc::new(WebhookNotificationSender::new(webhook)?))
}

async fn build_stores(
    config: Option<&RedisConfig>,
) -> Result<(Arc<dyn DeliveryStore>, Arc<dyn InterventionLedger>), StartupError> {
    let Some(config) = config else {
        warn!("No Redis configured, ledger and delivery claims are process-local");
        return Ok((
            Arc::new(InMemoryDeliveryStore::new()),
            Arc::new(InMemoryInterventionLedger::new()),
        ));
    };

    let conn = connect_redis(config).await?;
    info!("Connected to Redis");
    Ok((
        Arc::new(RedisDeliveryStore::new(conn.clone()).with_prefix(config.delivery_prefix())),
        Arc::new(RedisInterventionLedger::new(conn).with_prefix(config.ledger_prefix())),
    ))
}

async fn connect_redis(config: &RedisConfig) -> Result<MultiplexedConnection, StartupError> {
    let client = redis::Client::open(config.url.as_str())?;
    tokio::time::timeout(config.timeout(), client.get_multiplexed_tokio_connection())
        .await
        .map_err(|_| StartupError::RedisTimeout)?
        .map_err(StartupError::from)
}

/// Router with request tracing, the body limit and the request deadline.
pub fn router(state: CheckInAppState, config: &AppConfig) -> Router {
    checkin_router()
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(TraceLayer::new_for_http())
}

/// Validates configuration, wires adapters, and serves until shutdown.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    config.validate()?;
    let addr = config.server.socket_addr()?;
    let state = build_state(&config).await?;
    let app = router(state, &config);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, environment = ?config.server.environment, "Check-in sentinel listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Check-in sentinel shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn default_config_builds_in_memory_state() {
        let state = build_state(&AppConfig::default()).await.unwrap();
        let names: Vec<String> = state.breakers.metrics().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec![CLASSIFIER_BREAKER.to_string()]);
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_binding() {
        let mut config = AppConfig::default();
        config.routing.crisis_threshold = 10.0;
        assert!(matches!(run(config).await, Err(StartupError::Config(_))));
    }
}

//! Webhook notification sender.
//!
//! Posts each notification as JSON to a relay that owns the real SMS,
//! email and paging transports. The idempotency key travels in the
//! `Idempotency-Key` header so the relay can deduplicate retries.
//!
//! ```text
//! POST {base_url}/notifications
//! Idempotency-Key: <checkin>:<level>:<channel>
//! {"channel": "ops_team", "recipient": {...}, "subject": "...", "body": "...", "userId": "..."}
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

use crate::domain::alert::Channel;
use crate::ports::{ChannelError, Notification, NotificationSender, Recipient};

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub base_url: String,
    api_key: Option<Secret<String>>,
    pub timeout: Duration,
}

impl WebhookConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn with_api_key(mut self, api_key: Secret<String>) -> Self {
        self.api_key = Some(api_key);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", content = "address", rename_all = "snake_case")]
enum WireRecipient<'a> {
    Phone(&'a str),
    Email(&'a str),
    Operations,
    User(&'a str),
}

impl<'a> From<&'a Recipient> for WireRecipient<'a> {
    fn from(recipient: &'a Recipient) -> Self {
        match recipient {
            Recipient::Phone(phone) => WireRecipient::Phone(phone),
            Recipient::Email(email) => WireRecipient::Email(email),
            Recipient::Operations => WireRecipient::Operations,
            Recipient::User(user_id) => WireRecipient::User(user_id.as_str()),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationBody<'a> {
    channel: Channel,
    recipient: WireRecipient<'a>,
    subject: &'a str,
    body: &'a str,
    user_id: &'a str,
}

pub struct WebhookNotificationSender {
    config: WebhookConfig,
    client: Client,
}

impl WebhookNotificationSender {
    pub fn new(config: WebhookConfig) -> Result<Self, ChannelError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ChannelError::unavailable(format!("HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn notifications_url(&self) -> String {
        format!("{}/notifications", self.config.base_url)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ChannelError {
        if e.is_timeout() {
            ChannelError::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else if e.is_connect() {
            ChannelError::Network(format!("Connection failed: {}", e))
        } else {
            ChannelError::Network(e.to_string())
        }
    }
}

fn status_error(status: StatusCode, retry_after: Option<u32>, body: String) -> ChannelError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ChannelError::AuthenticationFailed,
        StatusCode::TOO_MANY_REQUESTS => ChannelError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(1),
        },
        StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            ChannelError::InvalidRecipient(body)
        }
        s if s.is_server_error() => ChannelError::unavailable(format!("Server error {}: {}", s, body)),
        s => ChannelError::rejected(format!("Unexpected status {}: {}", s, body)),
    }
}

#[async_trait]
impl NotificationSender for WebhookNotificationSender {
    async fn send(&self, notification: &Notification) -> Result<(), ChannelError> {
        let payload = NotificationBody {
            channel: notification.channel,
            recipient: (&notification.recipient).into(),
            subject: &notification.message.subject,
            body: &notification.message.body,
            user_id: notification.user_id.as_str(),
        };

        let mut builder = self
            .client
            .post(self.notifications_url())
            .header("Idempotency-Key", notification.idempotency_key.to_string())
            .json(&payload);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        // 409 means the relay already accepted this key.
        if status.is_success() || status == StatusCode::CONFLICT {
            return Ok(());
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok());
        let body = response.text().await.unwrap_or_default();
        Err(status_error(status, retry_after, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    #[test]
    fn status_mapping_separates_transient_from_permanent() {
        assert!(status_error(StatusCode::BAD_GATEWAY, None, String::new()).is_retryable());
        assert_eq!(
            status_error(StatusCode::TOO_MANY_REQUESTS, Some(7), String::new()),
            ChannelError::RateLimited { retry_after_secs: 7 }
        );
        assert!(!status_error(StatusCode::BAD_REQUEST, None, String::new()).is_retryable());
        assert!(matches!(
            status_error(StatusCode::UNPROCESSABLE_ENTITY, None, "bad phone".into()),
            ChannelError::InvalidRecipient(_)
        ));
    }

    #[test]
    fn recipient_wire_format_is_tagged() {
        let user = Recipient::User(UserId::new("u-4").unwrap());
        let json = serde_json::to_value(WireRecipient::from(&user)).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "user", "address": "u-4"}));

        let ops = serde_json::to_value(WireRecipient::from(&Recipient::Operations)).unwrap();
        assert_eq!(ops, serde_json::json!({"kind": "operations"}));
    }

    #[test]
    fn url_is_built_from_trimmed_base() {
        let sender = WebhookNotificationSender::new(WebhookConfig::new("http://relay.local/")).unwrap();
        assert_eq!(sender.notifications_url(), "http://relay.local/notifications");
    }
}

//! HTTP classifier - calls an external sentiment/entity service.
//!
//! ```text
//! POST {base_url}/classify
//! {"text": "...", "userId": "..."}
//! -> {"sentimentLabel": "NEGATIVE", "sentimentScore": -0.7, "entities": [...]}
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::time::Duration;

use crate::domain::checkin::ClassifierResult;
use crate::ports::{ClassificationRequest, Classifier, ClassifierError};

/// Configuration for the HTTP classifier.
#[derive(Debug, Clone)]
pub struct HttpClassifierConfig {
    pub base_url: String,
    api_key: Option<Secret<String>>,
    pub timeout: Duration,
}

impl HttpClassifierConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            timeout: Duration::from_secs(2),
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

pub struct HttpClassifier {
    config: HttpClassifierConfig,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyBody<'a> {
    text: &'a str,
    user_id: &'a str,
}

impl HttpClassifier {
    pub fn new(config: HttpClassifierConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::InvalidRequest(format!("HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    fn classify_url(&self) -> String {
        format!("{}/classify", self.config.base_url)
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClassifierError {
        if e.is_timeout() {
            ClassifierError::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else if e.is_connect() {
            ClassifierError::network(format!("Connection failed: {}", e))
        } else {
            ClassifierError::network(e.to_string())
        }
    }

    async fn check_status(response: Response) -> Result<Response, ClassifierError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u32>().ok());
        let body = response.text().await.unwrap_or_default();

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClassifierError::AuthenticationFailed,
            StatusCode::TOO_MANY_REQUESTS => ClassifierError::RateLimited {
                retry_after_secs: retry_after.unwrap_or(1),
            },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                ClassifierError::InvalidRequest(body)
            }
            s if s.is_server_error() => {
                ClassifierError::unavailable(format!("Server error {}: {}", s, body))
            }
            s => ClassifierError::network(format!("Unexpected status {}: {}", s, body)),
        })
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<ClassifierResult, ClassifierError> {
        let mut builder = self.client.post(self.classify_url()).json(&ClassifyBody {
            text: &request.text,
            user_id: request.user_id.as_str(),
        });
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| self.map_send_error(e))?;
        let response = Self::check_status(response).await?;

        let raw: ClassifierResult = response
            .json()
            .await
            .map_err(|e| ClassifierError::Parse(format!("Failed to parse response: {}", e)))?;

        // Re-validate: the wire format does not enforce the sentiment range.
        ClassifierResult::new(raw.sentiment_label, raw.sentiment_score, raw.entities)
            .map_err(|e| ClassifierError::Parse(e.to_string()))
    }

    fn name(&self) -> &str {
        "http"
    }
}

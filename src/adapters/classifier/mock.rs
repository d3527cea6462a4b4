//! Mock classifier for tests and local runs.
//!
//! Responses are consumed in order; once the queue is empty the default
//! response is returned. Supports error injection, simulated latency and
//! call recording.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::checkin::{ClassifierResult, SentimentLabel};
use crate::ports::{ClassificationRequest, Classifier, ClassifierError};

#[derive(Debug, Clone)]
pub enum MockClassification {
    Result(ClassifierResult),
    Error(ClassifierError),
}

#[derive(Debug, Clone)]
pub struct MockClassifier {
    responses: Arc<Mutex<VecDeque<MockClassification>>>,
    default_response: MockClassification,
    delay: Duration,
    calls: Arc<Mutex<Vec<ClassificationRequest>>>,
}

impl Default for MockClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClassifier {
    /// A classifier that reports neutral sentiment for everything.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            default_response: MockClassification::Result(ClassifierResult {
                sentiment_label: SentimentLabel::Neutral,
                sentiment_score: 0.0,
                entities: Vec::new(),
            }),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a sentiment result. Scores are clamped to [-1, 1].
    pub fn with_sentiment(self, label: SentimentLabel, score: f64) -> Self {
        self.push(MockClassification::Result(ClassifierResult {
            sentiment_label: label,
            sentiment_score: score.clamp(-1.0, 1.0),
            entities: Vec::new(),
        }))
    }

    pub fn with_error(self, error: ClassifierError) -> Self {
        self.push(MockClassification::Error(error))
    }

    /// Response used whenever the queue is empty.
    pub fn with_default(mut self, response: MockClassification) -> Self {
        self.default_response = response;
        self
    }

    /// Every call fails with `error`.
    pub fn always_failing(error: ClassifierError) -> Self {
        Self::new().with_default(MockClassification::Error(error))
    }

    /// Simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn get_calls(&self) -> Vec<ClassificationRequest> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn push(self, response: MockClassification) -> Self {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(response);
        self
    }

    fn next_response(&self) -> MockClassification {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| self.default_response.clone())
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    async fn classify(&self, request: &ClassificationRequest) -> Result<ClassifierResult, ClassifierError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            MockClassification::Result(result) => Ok(result),
            MockClassification::Error(error) => Err(error),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::UserId;

    fn request() -> ClassificationRequest {
        ClassificationRequest::new("hello", UserId::new("u-1").unwrap())
    }

    #[tokio::test]
    async fn returns_queued_then_default() {
        let mock = MockClassifier::new()
            .with_sentiment(SentimentLabel::Negative, -0.8)
            .with_error(ClassifierError::unavailable("down"));

        assert_eq!(mock.classify(&request()).await.unwrap().sentiment_score, -0.8);
        assert!(mock.classify(&request()).await.is_err());
        assert_eq!(mock.classify(&request()).await.unwrap().sentiment_score, 0.0);
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn always_failing_never_succeeds() {
        let mock = MockClassifier::always_failing(ClassifierError::Timeout { timeout_ms: 1 });
        for _ in 0..3 {
            assert!(mock.classify(&request()).await.is_err());
        }
    }
}

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// A single (label, score) pair from a classification.
/// Scores are in [0, 1] but are not guaranteed to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionScore {
    pub label: String,
    pub score: f32,
}

impl EmotionScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Error type for classifier operations.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier unavailable: {0}")]
    Unavailable(String),
    #[error("rate limited")]
    RateLimited,
    #[error("request failed: {0}")]
    RequestFailed(String),
}

/// Trait for emotion classification backends.
///
/// One call per user submission: text in, full score distribution out.
/// The distribution preserves the backend's emission order; callers that
/// need a dominant label resolve it themselves.
pub trait EmotionClassifier: Send + Sync {
    fn name(&self) -> &str;

    fn classify(
        &self,
        text: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<EmotionScore>, ClassifierError>> + Send + '_>>;
}

/// Mock classifier for testing. Returns a fixed distribution.
#[derive(Debug, Clone)]
pub struct MockClassifier {
    pub scores: Vec<EmotionScore>,
}

impl MockClassifier {
    pub fn new(pairs: &[(&str, f32)]) -> Self {
        Self {
            scores: pairs
                .iter()
                .map(|(label, score)| EmotionScore::new(*label, *score))
                .collect(),
        }
    }
}

impl EmotionClassifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    fn classify(
        &self,
        _text: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<EmotionScore>, ClassifierError>> + Send + '_>>
    {
        let scores = self.scores.clone();
        Box::pin(async move { Ok(scores) })
    }
}

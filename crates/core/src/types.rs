use chrono::{DateTime, Utc};
use empath_classifier::provider::EmotionScore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw user submission entering the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputEvent {
    pub id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl InputEvent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// The resolved classification of one submission.
///
/// `confidence` is the dominant label's score when it clears the threshold,
/// and 0.0 when the whole distribution was sub-threshold; in that case
/// `label` is "neutral" and the true maximum is only visible in `scores`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    /// Full distribution, in the classifier's emission order.
    pub scores: Vec<EmotionScore>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_event_carries_content() {
        let a = InputEvent::new("hello");
        let b = InputEvent::new("hello");
        assert_eq!(a.content, "hello");
        // Each submission gets its own identity.
        assert_ne!(a.id, b.id);
    }
}

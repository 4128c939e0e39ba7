//! Emotion detection: dominant-label resolution over a score distribution.
//!
//! The classifier backend returns the full distribution; this module applies
//! the confidence threshold and the tie-break rule. Sub-threshold results
//! collapse to "neutral" with zero confidence, matching the source system's
//! behavior (the true maximum remains visible in `Detection::scores`).

use crate::types::Detection;
use empath_classifier::provider::{ClassifierError, EmotionClassifier, EmotionScore};

/// Dominant score below this resolves to "neutral".
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Label reported for sub-threshold (or empty) distributions.
pub const NEUTRAL_LABEL: &str = "neutral";

/// Resolve a score distribution into a `Detection`.
///
/// The dominant label is the maximum score; equal maxima break toward the
/// FIRST occurrence in the distribution's emission order.
pub fn resolve(scores: Vec<EmotionScore>, threshold: f32) -> Detection {
    // Strict `>` keeps the earliest of equal maxima.
    let mut dominant: Option<usize> = None;
    for (i, candidate) in scores.iter().enumerate() {
        match dominant {
            Some(top) if candidate.score <= scores[top].score => {}
            _ => dominant = Some(i),
        }
    }

    match dominant {
        Some(top) if scores[top].score >= threshold => {
            let label = scores[top].label.clone();
            let confidence = scores[top].score;
            Detection {
                label,
                confidence,
                scores,
            }
        }
        _ => Detection {
            label: NEUTRAL_LABEL.into(),
            confidence: 0.0,
            scores,
        },
    }
}

/// Classify `text` via the given backend and resolve the dominant emotion.
/// Backend failures propagate; no retry, no fallback.
pub async fn detect<C: EmotionClassifier + ?Sized>(
    classifier: &C,
    text: &str,
    threshold: f32,
) -> Result<Detection, ClassifierError> {
    let scores = classifier.classify(text).await?;
    let detection = resolve(scores, threshold);
    tracing::debug!(
        label = %detection.label,
        confidence = detection.confidence,
        "emotion resolved"
    );
    Ok(detection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use empath_classifier::provider::MockClassifier;

    fn dist(pairs: &[(&str, f32)]) -> Vec<EmotionScore> {
        pairs
            .iter()
            .map(|(l, s)| EmotionScore::new(*l, *s))
            .collect()
    }

    #[test]
    fn dominant_above_threshold_keeps_true_score() {
        let d = resolve(
            dist(&[("joy", 0.82), ("sadness", 0.1), ("anger", 0.05), ("neutral", 0.03)]),
            CONFIDENCE_THRESHOLD,
        );
        assert_eq!(d.label, "joy");
        assert!((d.confidence - 0.82).abs() < f32::EPSILON);
        assert_eq!(d.scores.len(), 4);
    }

    #[test]
    fn sub_threshold_collapses_to_neutral_with_zero_confidence() {
        let d = resolve(
            dist(&[("joy", 0.3), ("sadness", 0.25), ("anger", 0.25), ("neutral", 0.2)]),
            CONFIDENCE_THRESHOLD,
        );
        assert_eq!(d.label, "neutral");
        assert_eq!(d.confidence, 0.0);
        // Distribution is returned untouched.
        assert_eq!(d.scores[0].label, "joy");
        assert!((d.scores[0].score - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn exact_threshold_counts_as_detected() {
        let d = resolve(dist(&[("anger", 0.5), ("joy", 0.4)]), CONFIDENCE_THRESHOLD);
        assert_eq!(d.label, "anger");
        assert!((d.confidence - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn tie_breaks_toward_first_occurrence() {
        let d = resolve(dist(&[("sadness", 0.6), ("joy", 0.6)]), CONFIDENCE_THRESHOLD);
        assert_eq!(d.label, "sadness");
    }

    #[test]
    fn empty_distribution_is_neutral() {
        let d = resolve(Vec::new(), CONFIDENCE_THRESHOLD);
        assert_eq!(d.label, "neutral");
        assert_eq!(d.confidence, 0.0);
        assert!(d.scores.is_empty());
    }

    #[test]
    fn model_specific_labels_pass_through() {
        // The pretrained model emits labels outside the response table too.
        let d = resolve(dist(&[("surprise", 0.9), ("joy", 0.1)]), CONFIDENCE_THRESHOLD);
        assert_eq!(d.label, "surprise");
    }

    #[tokio::test]
    async fn detect_uses_backend_distribution() {
        let mock = MockClassifier::new(&[("sadness", 0.71), ("joy", 0.2)]);
        let d = detect(&mock, "rough week", CONFIDENCE_THRESHOLD).await.unwrap();
        assert_eq!(d.label, "sadness");
        assert!((d.confidence - 0.71).abs() < f32::EPSILON);
    }
}

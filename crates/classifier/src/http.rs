//! HTTP-based emotion classifier.
//!
//! Speaks the HuggingFace Inference API shape: `POST {base}/models/{model}`
//! with `{"inputs": text}`, scores back as `[[{label, score}, ...]]`.
//! Any endpoint with the same contract works via `EMPATH_BASE_URL`.

use crate::provider::{ClassifierError, EmotionClassifier, EmotionScore};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;

/// Pretrained checkpoint used when `EMPATH_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "j-hartmann/emotion-english-distilroberta-base";
const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
struct LabelScore {
    label: String,
    score: f32,
}

/// The API returns `[[{label, score}, ...]]` for single-input requests in
/// all-scores mode, or a flat array from some compatible servers. Accept both.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Vec<EmotionScore> {
        let flat = match self {
            Self::Nested(mut outer) => {
                if outer.is_empty() {
                    Vec::new()
                } else {
                    outer.swap_remove(0)
                }
            }
            Self::Flat(inner) => inner,
        };
        flat.into_iter()
            .map(|ls| EmotionScore::new(ls.label, ls.score))
            .collect()
    }
}

/// Map a non-success HTTP status to a classifier error.
/// 429 is rate limiting; 503 means the model is still loading on the server.
fn check_error(status: reqwest::StatusCode, body: String) -> ClassifierError {
    match status.as_u16() {
        429 => ClassifierError::RateLimited,
        503 => ClassifierError::Unavailable(format!("model loading: {body}")),
        _ => ClassifierError::RequestFailed(format!("{status}: {body}")),
    }
}

/// HTTP-backed emotion classifier.
pub struct HttpClassifier {
    model: String,
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpClassifier {
    /// Build from model name + optional bearer token + optional base URL override.
    pub fn new(model: String, api_token: Option<String>, base_url: Option<String>) -> Self {
        let base = base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        Self {
            model,
            client: reqwest::Client::new(),
            base_url: base.trim_end_matches('/').to_owned(),
            api_token,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    async fn classify_inner(&self, text: &str) -> Result<Vec<EmotionScore>, ClassifierError> {
        let body = InferenceRequest { inputs: text };

        let mut req = self.client.post(self.endpoint()).json(&body);
        if let Some(token) = &self.api_token {
            req = req.bearer_auth(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| ClassifierError::RequestFailed(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(check_error(status, text));
        }

        let api: InferenceResponse = resp
            .json()
            .await
            .map_err(|e| ClassifierError::RequestFailed(e.to_string()))?;

        let scores = api.into_scores();
        tracing::debug!(model = %self.model, labels = scores.len(), "classification received");
        Ok(scores)
    }
}

impl EmotionClassifier for HttpClassifier {
    fn name(&self) -> &str {
        &self.model
    }

    fn classify(
        &self,
        text: &str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<EmotionScore>, ClassifierError>> + Send + '_>>
    {
        let text = text.to_owned();
        Box::pin(async move { self.classify_inner(&text).await })
    }
}

/// Build an HttpClassifier from environment variables.
/// Reads `EMPATH_MODEL` (defaults to [`DEFAULT_MODEL`]), `EMPATH_API_TOKEN`
/// (optional), and `EMPATH_BASE_URL` (optional).
pub fn from_env() -> HttpClassifier {
    let model = std::env::var("EMPATH_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_owned());
    let api_token = std::env::var("EMPATH_API_TOKEN").ok();
    let base_url = std::env::var("EMPATH_BASE_URL").ok();
    HttpClassifier::new(model, api_token, base_url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint() {
        let c = HttpClassifier::new(DEFAULT_MODEL.into(), None, None);
        assert_eq!(
            c.endpoint(),
            "https://api-inference.huggingface.co/models/j-hartmann/emotion-english-distilroberta-base"
        );
        assert_eq!(c.name(), DEFAULT_MODEL);
    }

    #[test]
    fn custom_base_url_override() {
        let c = HttpClassifier::new(
            "my-org/my-model".into(),
            Some("hf_test".into()),
            Some("http://localhost:8080/".into()),
        );
        assert_eq!(c.endpoint(), "http://localhost:8080/models/my-org/my-model");
    }

    #[test]
    fn parses_nested_all_scores_payload() {
        let raw = r#"[[
            {"label": "joy", "score": 0.82},
            {"label": "sadness", "score": 0.1},
            {"label": "anger", "score": 0.05},
            {"label": "neutral", "score": 0.03}
        ]]"#;
        let parsed: InferenceResponse = serde_json::from_str(raw).unwrap();
        let scores = parsed.into_scores();
        assert_eq!(scores.len(), 4);
        assert_eq!(scores[0], EmotionScore::new("joy", 0.82));
        assert_eq!(scores[3].label, "neutral");
    }

    #[test]
    fn parses_flat_payload() {
        let raw = r#"[{"label": "sadness", "score": 0.91}]"#;
        let parsed: InferenceResponse = serde_json::from_str(raw).unwrap();
        let scores = parsed.into_scores();
        assert_eq!(scores, vec![EmotionScore::new("sadness", 0.91)]);
    }

    #[test]
    fn empty_nested_payload_yields_no_scores() {
        let parsed: InferenceResponse = serde_json::from_str("[]").unwrap();
        assert!(parsed.into_scores().is_empty());
    }

    #[test]
    fn status_code_error_mapping() {
        assert!(matches!(
            check_error(reqwest::StatusCode::TOO_MANY_REQUESTS, String::new()),
            ClassifierError::RateLimited
        ));
        assert!(matches!(
            check_error(reqwest::StatusCode::SERVICE_UNAVAILABLE, "warming up".into()),
            ClassifierError::Unavailable(_)
        ));
        assert!(matches!(
            check_error(reqwest::StatusCode::BAD_REQUEST, "bad".into()),
            ClassifierError::RequestFailed(_)
        ));
    }
}

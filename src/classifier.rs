//! Gateway to the external sentiment-inference capability.
//!
//! The classifier is a capability dependency, not a library call: any
//! provider that answers `{label, score}` for a piece of text can sit behind
//! [`SentimentClassifier`]. The HTTP implementation talks to a local Python
//! sidecar serving the trained model. Every call hits the sidecar; there is
//! no caching and no retry inside the gateway.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::error::{ApiError, ApiResult};
use crate::models::{Classification, Sentiment};

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Classifies cleaned review text. Any transport failure, timeout, or
    /// malformed prediction surfaces as `ClassificationUnavailable`.
    async fn classify(&self, text: &str) -> ApiResult<Classification>;
}

/// Raw prediction as the sidecar reports it. Field presence and ranges are
/// validated before anything leaves the gateway.
#[derive(Debug, Deserialize)]
struct PredictionPayload {
    #[serde(alias = "sentiment")]
    label: Option<String>,
    #[serde(alias = "confidence")]
    score: Option<f64>,
    model: Option<String>,
}

pub struct HttpSentimentClassifier {
    client: reqwest::Client,
    url: String,
    default_model: String,
}

impl HttpSentimentClassifier {
    pub fn new(url: impl Into<String>, default_model: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build HTTP client");
        Self {
            client,
            url: url.into(),
            default_model: default_model.into(),
        }
    }
}

#[async_trait]
impl SentimentClassifier for HttpSentimentClassifier {
    async fn classify(&self, text: &str) -> ApiResult<Classification> {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| ApiError::ClassificationUnavailable(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ApiError::ClassificationUnavailable(format!(
                "sidecar returned {}",
                response.status()
            )));
        }

        let payload = response
            .json::<PredictionPayload>()
            .await
            .map_err(|e| ApiError::ClassificationUnavailable(format!("malformed prediction: {e}")))?;

        into_classification(payload, &self.default_model)
    }
}

/// Validates a raw prediction. Out-of-range scores are rejected, never
/// clamped; unknown labels are rejected, never coerced.
fn into_classification(payload: PredictionPayload, fallback_model: &str) -> ApiResult<Classification> {
    let label = payload
        .label
        .ok_or_else(|| ApiError::ClassificationUnavailable("prediction missing label".into()))?;
    let sentiment = Sentiment::parse(&label).ok_or_else(|| {
        ApiError::ClassificationUnavailable(format!("unrecognized label: {label}"))
    })?;

    let score = payload
        .score
        .ok_or_else(|| ApiError::ClassificationUnavailable("prediction missing score".into()))?;
    if !(0.0..=1.0).contains(&score) {
        return Err(ApiError::ClassificationUnavailable(format!(
            "score out of range: {score}"
        )));
    }

    Ok(Classification {
        sentiment,
        confidence: score,
        model: payload
            .model
            .unwrap_or_else(|| fallback_model.to_string()),
    })
}


#[cfg(test)]
mod tests {
    use super::*;

    fn payload(label: Option<&str>, score: Option<f64>, model: Option<&str>) -> PredictionPayload {
        PredictionPayload {
            label: label.map(String::from),
            score,
            model: model.map(String::from),
        }
    }

    #[test]
    fn accepts_a_well_formed_prediction() {
        let c = into_classification(payload(Some("positive"), Some(0.95), Some("logreg-v2")), "fallback")
            .unwrap();
        assert_eq!(c.sentiment, Sentiment::Positive);
        assert_eq!(c.confidence, 0.95);
        assert_eq!(c.model, "logreg-v2");
    }

    #[test]
    fn falls_back_to_configured_model_id() {
        let c = into_classification(payload(Some("negative"), Some(0.5), None), "imdb-tfidf-logreg")
            .unwrap();
        assert_eq!(c.model, "imdb-tfidf-logreg");
    }

    #[test]
    fn rejects_missing_label_or_score() {
        assert!(matches!(
            into_classification(payload(None, Some(0.9), None), "m"),
            Err(ApiError::ClassificationUnavailable(_))
        ));
        assert!(matches!(
            into_classification(payload(Some("positive"), None, None), "m"),
            Err(ApiError::ClassificationUnavailable(_))
        ));
    }

    #[test]
    fn rejects_unknown_labels() {
        assert!(matches!(
            into_classification(payload(Some("neutral"), Some(0.5), None), "m"),
            Err(ApiError::ClassificationUnavailable(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_scores_without_clamping() {
        for score in [-0.01, 1.01, 42.0] {
            assert!(matches!(
                into_classification(payload(Some("positive"), Some(score), None), "m"),
                Err(ApiError::ClassificationUnavailable(_))
            ));
        }
        // boundary values are valid
        assert!(into_classification(payload(Some("positive"), Some(0.0), None), "m").is_ok());
        assert!(into_classification(payload(Some("positive"), Some(1.0), None), "m").is_ok());
    }
}

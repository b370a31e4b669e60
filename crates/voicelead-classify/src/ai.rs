//! HTTP client for the semantic classification provider.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::error::ClassifyError;
use crate::fallback::Classifier;
use crate::types::{ClassificationInput, ClassificationResult, LeadType};

const DEFAULT_BASE_URL: &str = "https://api.leadsense.ai/";

/// Client for the semantic classification provider.
///
/// Use [`AiClassifier::new`] for production or
/// [`AiClassifier::with_base_url`] to point at a mock server in tests.
pub struct AiClassifier {
    client: Client,
    api_key: String,
    base_url: Url,
}

/// Provider result shape, minus the provenance flag we stamp ourselves.
#[derive(Debug, Deserialize)]
struct AiClassification {
    lead_type: LeadType,
    confidence: f32,
    reasoning: String,
    routing_suggestion: String,
}

#[derive(Debug, Deserialize)]
struct ClassifyEnvelope {
    classification: AiClassification,
}

impl AiClassifier {
    /// Creates a new client pointed at the production provider.
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, ClassifyError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`ClassifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`ClassifyError::ApiError`] if `base_url`
    /// is not a valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, ClassifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("voicelead/0.1 (lead-intake)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| ClassifyError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    async fn classify_once(
        &self,
        input: &ClassificationInput,
    ) -> Result<ClassificationResult, ClassifyError> {
        let url = self
            .base_url
            .join("v1/classify")
            .map_err(|e| ClassifyError::ApiError(format!("invalid classify URL: {e}")))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(input)
            .send()
            .await?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(ClassifyError::RateLimited);
        }
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let envelope: ClassifyEnvelope =
            serde_json::from_str(&body).map_err(|e| ClassifyError::Deserialize {
                context: "classify".to_string(),
                source: e,
            })?;
        let parsed = envelope.classification;

        if !(0.0..=1.0).contains(&parsed.confidence) {
            return Err(ClassifyError::Invalid(format!(
                "confidence {} outside [0.0, 1.0]",
                parsed.confidence
            )));
        }

        Ok(ClassificationResult {
            lead_type: parsed.lead_type,
            confidence: parsed.confidence,
            reasoning: parsed.reasoning,
            routing_suggestion: parsed.routing_suggestion,
            used_ai: true,
        })
    }
}

impl Classifier for AiClassifier {
    /// Calls the provider's `classify` endpoint and validates the result
    /// structure.
    ///
    /// # Errors
    ///
    /// - [`ClassifyError::RateLimited`] on HTTP 429.
    /// - [`ClassifyError::Http`] on network failure, timeout, or non-2xx.
    /// - [`ClassifyError::Deserialize`] / [`ClassifyError::Invalid`] when
    ///   the response is not a decodable, in-contract result.
    async fn classify(
        &self,
        input: &ClassificationInput,
    ) -> Result<ClassificationResult, ClassifyError> {
        self.classify_once(input).await
    }
}

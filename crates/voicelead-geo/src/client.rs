//! HTTP client for the geocoding/route provider.
//!
//! Wraps `reqwest` with provider-specific error handling, API key management,
//! and typed response deserialization. All endpoints check the `"status"`
//! field in the JSON envelope and surface API-level errors as
//! [`GeoError::ApiError`].

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;

use crate::error::GeoError;
use crate::types::{GeoPoint, RouteSummary};

const DEFAULT_BASE_URL: &str = "https://api.routewise.dev/";

/// Client for the geocoding and driving-route provider.
///
/// Use [`GeocoderClient::new`] for production or
/// [`GeocoderClient::with_base_url`] to point at a mock server in tests.
pub struct GeocoderClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct GeocodeEnvelope {
    result: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
struct RouteEnvelope {
    route: Option<RouteSummary>,
}

impl GeocoderClient {
    /// Creates a new client pointed at the production provider.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, GeoError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::Http`] if the underlying `reqwest::Client` cannot
    /// be constructed, or [`GeoError::ApiError`] if `base_url` is invalid.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeoError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("voicelead/0.1 (lead-intake)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised)
            .map_err(|e| GeoError::ApiError(format!("invalid base URL '{base_url}': {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    /// Resolves a free-text address to coordinates via `/v1/geocode`.
    ///
    /// # Errors
    ///
    /// - [`GeoError::Unresolvable`] if the provider found no match.
    /// - [`GeoError::ApiError`] if the API returns an error status.
    /// - [`GeoError::RateLimited`] on HTTP 429.
    /// - [`GeoError::Http`] on network failure or non-2xx HTTP status.
    /// - [`GeoError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn geocode(&self, address: &str) -> Result<GeoPoint, GeoError> {
        let url = self.build_url("v1/geocode", &[("q", address)]);
        let body = self.request_json(&url).await?;
        Self::check_api_error(&body)?;

        let envelope: GeocodeEnvelope =
            serde_json::from_value(body).map_err(|e| GeoError::Deserialize {
                context: format!("geocode(q={address})"),
                source: e,
            })?;

        envelope
            .result
            .ok_or_else(|| GeoError::Unresolvable(address.to_string()))
    }

    /// Computes driving distance and duration between two points via
    /// `/v1/route`.
    ///
    /// Returns `Ok(None)` when the provider reports that no route exists —
    /// callers preserve this as the unknown-distance case rather than
    /// treating it as a failure.
    ///
    /// # Errors
    ///
    /// - [`GeoError::ApiError`] if the API returns an error status.
    /// - [`GeoError::RateLimited`] on HTTP 429.
    /// - [`GeoError::Http`] on network failure or non-2xx HTTP status.
    /// - [`GeoError::Deserialize`] if the response does not match the
    ///   expected shape.
    pub async fn route(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> Result<Option<RouteSummary>, GeoError> {
        let origin_param = format!("{},{}", origin.latitude, origin.longitude);
        let destination_param = format!("{},{}", destination.latitude, destination.longitude);
        let url = self.build_url(
            "v1/route",
            &[
                ("origin", &origin_param),
                ("destination", &destination_param),
            ],
        );
        let body = self.request_json(&url).await?;
        Self::check_api_error(&body)?;

        let envelope: RouteEnvelope =
            serde_json::from_value(body).map_err(|e| GeoError::Deserialize {
                context: format!("route({origin_param} -> {destination_param})"),
                source: e,
            })?;

        Ok(envelope.route)
    }

    /// Builds the full request URL with properly percent-encoded query
    /// parameters, appending the API key.
    fn build_url(&self, path: &str, extra: &[(&str, &str)]) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the
    /// response body as JSON. HTTP 429 is surfaced as
    /// [`GeoError::RateLimited`] so retry policy can treat it distinctly.
    async fn request_json(&self, url: &Url) -> Result<serde_json::Value, GeoError> {
        let response = self.client.get(url.clone()).send().await?;
        if response.status() == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeoError::RateLimited(url.path().to_string()));
        }
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GeoError::Deserialize {
            context: url.to_string(),
            source: e,
        })
    }

    /// Checks the top-level `"status"` field and returns an error if it
    /// indicates failure.
    fn check_api_error(body: &serde_json::Value) -> Result<(), GeoError> {
        if body.get("status").and_then(serde_json::Value::as_str) == Some("ERROR") {
            let msg = body
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(GeoError::ApiError(msg));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> GeocoderClient {
        GeocoderClient::with_base_url("test-key", 30, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn build_url_constructs_correct_query_string() {
        let client = test_client("https://api.routewise.dev");
        let url = client.build_url("v1/geocode", &[("q", "Austin TX")]);
        assert_eq!(
            url.as_str(),
            "https://api.routewise.dev/v1/geocode?key=test-key&q=Austin+TX"
        );
    }

    #[test]
    fn build_url_strips_trailing_slash() {
        let client = test_client("https://api.routewise.dev/");
        let url = client.build_url("v1/route", &[("origin", "30.1,-97.7")]);
        assert!(url.as_str().starts_with("https://api.routewise.dev/v1/route?"));
    }

    #[test]
    fn build_url_encodes_special_characters() {
        let client = test_client("https://api.routewise.dev");
        let url = client.build_url("v1/geocode", &[("q", "1600 Amphitheatre Pkwy, Mountain View")]);
        assert!(
            !url.as_str().contains(' '),
            "query param should be percent-encoded: {url}"
        );
    }
}

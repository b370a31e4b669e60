use thiserror::Error;

/// Errors returned by the AI classification client.
#[derive(Debug, Error)]
pub enum ClassifyError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider throttled the request (HTTP 429).
    #[error("classification provider rate limited")]
    RateLimited,

    /// The provider returned an application-level error.
    #[error("classification API error: {0}")]
    ApiError(String),

    /// The response body could not be deserialized into the expected type.
    /// Structurally invalid output is a failure, never a usable result.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The decoded result violates its own contract (confidence range).
    #[error("invalid classification result: {0}")]
    Invalid(String),

    /// The result decoded but its confidence is under the configured floor.
    #[error("confidence {confidence} below threshold {threshold}")]
    BelowThreshold { confidence: f32, threshold: f32 },
}

impl ClassifyError {
    /// Transient failures worth one retry: network timeout/connect errors,
    /// HTTP 5xx, and provider throttling. Decided by error kind, never by
    /// message sniffing.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ClassifyError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            ClassifyError::RateLimited => true,
            ClassifyError::ApiError(_)
            | ClassifyError::Deserialize { .. }
            | ClassifyError::Invalid(_)
            | ClassifyError::BelowThreshold { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_is_transient() {
        assert!(ClassifyError::RateLimited.is_transient());
    }

    #[test]
    fn structural_invalidity_is_not_transient() {
        let src = serde_json::from_str::<()>("nope").unwrap_err();
        let err = ClassifyError::Deserialize {
            context: "classify".to_owned(),
            source: src,
        };
        assert!(!err.is_transient());
    }

    #[test]
    fn below_threshold_is_not_transient() {
        let err = ClassifyError::BelowThreshold {
            confidence: 0.3,
            threshold: 0.55,
        };
        assert!(!err.is_transient());
    }
}

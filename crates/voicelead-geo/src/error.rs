use thiserror::Error;

/// Errors returned by the geocoding client and location resolver.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider returned `"status": "ERROR"` with a message.
    #[error("geocoding API error: {0}")]
    ApiError(String),

    /// The provider throttled the request (HTTP 429).
    #[error("geocoding provider rate limited: {0}")]
    RateLimited(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The address could not be resolved to coordinates.
    #[error("address could not be geocoded: {0}")]
    Unresolvable(String),

    /// The delivery address was empty after normalization.
    #[error("delivery address is empty")]
    EmptyAddress,

    /// A failure shared with other waiters of the same cached computation.
    #[error("{0}")]
    Shared(std::sync::Arc<GeoError>),

    /// Internal invariant violation (aborted cache task, empty branch set).
    #[error("internal error: {0}")]
    Internal(String),
}

use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub branches_path: PathBuf,
    pub geocoder_api_key: String,
    pub geocoder_base_url: Option<String>,
    pub geocode_timeout_secs: u64,
    pub geocode_max_retries: u32,
    pub geocode_retry_backoff_base_ms: u64,
    pub classifier_api_key: Option<String>,
    pub classifier_base_url: Option<String>,
    pub classify_timeout_secs: u64,
    pub classify_max_retries: u32,
    pub classify_confidence_threshold: f32,
    pub location_cache_ttl_secs: u64,
    pub quote_cache_ttl_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("branches_path", &self.branches_path)
            .field("geocoder_api_key", &"[redacted]")
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("geocode_timeout_secs", &self.geocode_timeout_secs)
            .field("geocode_max_retries", &self.geocode_max_retries)
            .field(
                "geocode_retry_backoff_base_ms",
                &self.geocode_retry_backoff_base_ms,
            )
            .field(
                "classifier_api_key",
                &self.classifier_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("classifier_base_url", &self.classifier_base_url)
            .field("classify_timeout_secs", &self.classify_timeout_secs)
            .field("classify_max_retries", &self.classify_max_retries)
            .field(
                "classify_confidence_threshold",
                &self.classify_confidence_threshold,
            )
            .field("location_cache_ttl_secs", &self.location_cache_ttl_secs)
            .field("quote_cache_ttl_secs", &self.quote_cache_ttl_secs)
            .finish()
    }
}

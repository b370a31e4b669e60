use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_f32 = |var: &str, default: &str| -> Result<f32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<f32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let geocoder_api_key = require("VOICELEAD_GEOCODER_API_KEY")?;

    let env = parse_environment(&or_default("VOICELEAD_ENV", "development"));
    let bind_addr = parse_addr("VOICELEAD_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("VOICELEAD_LOG_LEVEL", "info");
    let branches_path = PathBuf::from(or_default(
        "VOICELEAD_BRANCHES_PATH",
        "./config/branches.yaml",
    ));

    let geocoder_base_url = lookup("VOICELEAD_GEOCODER_BASE_URL").ok();
    let geocode_timeout_secs = parse_u64("VOICELEAD_GEOCODE_TIMEOUT_SECS", "10")?;
    let geocode_max_retries = parse_u32("VOICELEAD_GEOCODE_MAX_RETRIES", "1")?;
    let geocode_retry_backoff_base_ms = parse_u64("VOICELEAD_GEOCODE_RETRY_BACKOFF_BASE_MS", "500")?;

    let classifier_api_key = lookup("VOICELEAD_CLASSIFIER_API_KEY").ok();
    let classifier_base_url = lookup("VOICELEAD_CLASSIFIER_BASE_URL").ok();
    let classify_timeout_secs = parse_u64("VOICELEAD_CLASSIFY_TIMEOUT_SECS", "20")?;
    let classify_max_retries = parse_u32("VOICELEAD_CLASSIFY_MAX_RETRIES", "1")?;
    let classify_confidence_threshold =
        parse_f32("VOICELEAD_CLASSIFY_CONFIDENCE_THRESHOLD", "0.55")?;

    if !(0.0..=1.0).contains(&classify_confidence_threshold) {
        return Err(ConfigError::InvalidEnvVar {
            var: "VOICELEAD_CLASSIFY_CONFIDENCE_THRESHOLD".to_string(),
            reason: format!("must be within [0.0, 1.0], got {classify_confidence_threshold}"),
        });
    }

    let location_cache_ttl_secs = parse_u64("VOICELEAD_LOCATION_CACHE_TTL_SECS", "900")?;
    let quote_cache_ttl_secs = parse_u64("VOICELEAD_QUOTE_CACHE_TTL_SECS", "900")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        branches_path,
        geocoder_api_key,
        geocoder_base_url,
        geocode_timeout_secs,
        geocode_max_retries,
        geocode_retry_backoff_base_ms,
        classifier_api_key,
        classifier_base_url,
        classify_timeout_secs,
        classify_max_retries,
        classify_confidence_threshold,
        location_cache_ttl_secs,
        quote_cache_ttl_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

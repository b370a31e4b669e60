mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use voicelead_classify::{AiClassifier, FallbackClassifier};
use voicelead_geo::{GeocoderClient, LocationResolver};
use voicelead_pipeline::{Pipeline, QuotePricer};

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = voicelead_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let branches = voicelead_core::load_branches(&config.branches_path)?;
    tracing::info!(count = branches.len(), "service branches loaded");

    let geocoder = match config.geocoder_base_url.as_deref() {
        Some(base) => GeocoderClient::with_base_url(
            &config.geocoder_api_key,
            config.geocode_timeout_secs,
            base,
        )?,
        None => GeocoderClient::new(&config.geocoder_api_key, config.geocode_timeout_secs)?,
    };
    let resolver = Arc::new(LocationResolver::new(
        geocoder,
        branches,
        Duration::from_secs(config.location_cache_ttl_secs),
        config.geocode_max_retries,
        config.geocode_retry_backoff_base_ms,
    ));

    let ai = match config.classifier_api_key.as_deref() {
        Some(key) => Some(match config.classifier_base_url.as_deref() {
            Some(base) => AiClassifier::with_base_url(key, config.classify_timeout_secs, base)?,
            None => AiClassifier::new(key, config.classify_timeout_secs)?,
        }),
        None => {
            tracing::warn!(
                "no classifier API key configured; every lead takes the rule-based path"
            );
            None
        }
    };
    let classifier = Arc::new(FallbackClassifier::new(
        ai,
        config.classify_confidence_threshold,
        config.classify_max_retries,
    ));

    let pipeline = Arc::new(Pipeline::new(Arc::clone(&resolver), classifier));
    let pricer = Arc::new(QuotePricer::new(
        resolver,
        Duration::from_secs(config.quote_cache_ttl_secs),
    ));

    let auth = AuthState::from_env(matches!(
        config.env,
        voicelead_core::Environment::Development
    ))?;
    let app = build_app(AppState { pipeline, pricer }, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}

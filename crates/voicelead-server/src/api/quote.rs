//! Quote pricing endpoint.

use std::time::Instant;

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Serialize;

use voicelead_pipeline::{QuoteBreakdown, QuoteError, QuoteRequest};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub success: bool,
    pub data: QuoteData,
}

#[derive(Debug, Serialize)]
pub struct QuoteData {
    pub quote: QuoteBreakdown,
    pub processing_time_ms: u64,
    pub message: &'static str,
}

/// `POST /api/v1/quotes`
pub async fn create_quote(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<QuoteRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();

    let outcome = state
        .pricer
        .quote(&request)
        .await
        .map_err(|e| map_quote_error(req_id.0, &e))?;

    let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(Json(QuoteResponse {
        success: true,
        data: QuoteData {
            quote: outcome.breakdown,
            processing_time_ms,
            message: if outcome.was_cached {
                "served from cache"
            } else {
                "computed"
            },
        },
    }))
}

fn map_quote_error(request_id: String, error: &QuoteError) -> ApiError {
    match error {
        QuoteError::UnknownTrailerType(_) | QuoteError::ZeroDuration => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        QuoteError::Location(geo) => super::location::map_geo_error(request_id, geo),
        QuoteError::Shared(inner) => map_quote_error(request_id, inner),
        QuoteError::Internal(_) => {
            tracing::error!(error = %error, "quote pricing failed");
            ApiError::new(request_id, "internal_error", "quote pricing failed")
        }
    }
}

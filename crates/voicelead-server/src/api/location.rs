//! Standalone location lookup endpoint.

use std::time::Instant;

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};

use voicelead_geo::{DistanceResult, GeoError};

use super::{ApiError, AppState};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub struct LocationLookupRequest {
    pub delivery_location: String,
}

#[derive(Debug, Serialize)]
pub struct LocationLookupResponse {
    pub success: bool,
    pub data: LocationLookupData,
}

#[derive(Debug, Serialize)]
pub struct LocationLookupData {
    pub distance_result: DistanceResult,
    pub processing_time_ms: u64,
    /// `"served from cache"` or `"computed"`; clients use this together with
    /// `processing_time_ms` to demonstrate cache effectiveness.
    pub message: &'static str,
}

/// `POST /api/v1/location/lookup`
pub async fn lookup_location(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<LocationLookupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let started = Instant::now();

    let resolved = state
        .pipeline
        .resolve_location(&request.delivery_location)
        .await
        .map_err(|e| map_geo_error(req_id.0, &e))?;

    let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    Ok(Json(LocationLookupResponse {
        success: true,
        data: LocationLookupData {
            distance_result: resolved.distance_result,
            processing_time_ms,
            message: if resolved.was_cached {
                "served from cache"
            } else {
                "computed"
            },
        },
    }))
}

pub(super) fn map_geo_error(request_id: String, error: &GeoError) -> ApiError {
    match error {
        GeoError::EmptyAddress | GeoError::Unresolvable(_) => {
            ApiError::new(request_id, "validation_error", error.to_string())
        }
        GeoError::RateLimited(_) => ApiError::new(request_id, "rate_limited", error.to_string()),
        GeoError::Shared(inner) => map_geo_error(request_id, inner),
        _ => {
            tracing::error!(error = %error, "location lookup failed");
            ApiError::new(request_id, "internal_error", "location lookup failed")
        }
    }
}

//! Call-webhook ingestion endpoint.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};

use voicelead_intake::WebhookPayload;

use super::AppState;
use crate::middleware::RequestId;

/// `POST /api/v1/webhooks/call`
///
/// Always answers 200 with the comprehensive result, even for
/// partial/degraded outcomes — error detail rides in the body so the calling
/// platform's retry behavior stays predictable. Only a structurally
/// undecodable payload is rejected, with 400 from the JSON extractor.
pub async fn process_call(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(payload): Json<WebhookPayload>,
) -> impl IntoResponse {
    tracing::debug!(
        request_id = %req_id.0,
        call_id = payload.call_id.as_deref().unwrap_or("unknown"),
        "processing call webhook"
    );
    let result = state.pipeline.process_webhook(&payload).await;
    (StatusCode::OK, Json(result))
}

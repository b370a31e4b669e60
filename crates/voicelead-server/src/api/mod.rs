mod location;
mod quote;
mod webhook;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use voicelead_classify::AiClassifier;
use voicelead_pipeline::{Pipeline, QuotePricer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline<AiClassifier>>,
    pub pricer: Arc<QuotePricer>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/webhooks/call", post(webhook::process_call))
        .route("/api/v1/location/lookup", post(location::lookup_location))
        .route("/api/v1/quotes", post(quote::create_quote))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData { status: "ok" },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::collections::HashSet;
    use tower::ServiceExt;
    use voicelead_classify::FallbackClassifier;
    use voicelead_core::Branch;
    use voicelead_geo::{GeocoderClient, LocationResolver};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_state(geocoder_base: &str) -> AppState {
        let client = GeocoderClient::with_base_url("test-key", 5, geocoder_base)
            .expect("client construction");
        let resolver = Arc::new(LocationResolver::new(
            client,
            vec![Branch {
                id: "austin".to_string(),
                name: "Austin Yard".to_string(),
                address: "9600 Burnet Rd, Austin, TX 78758".to_string(),
                latitude: 30.3772,
                longitude: -97.7156,
                service_radius_miles: 60.0,
            }],
            Duration::from_secs(900),
            1,
            1,
        ));
        let classifier = Arc::new(FallbackClassifier::new(None::<AiClassifier>, 0.55, 1));
        AppState {
            pipeline: Arc::new(Pipeline::new(Arc::clone(&resolver), classifier)),
            pricer: Arc::new(QuotePricer::new(resolver, Duration::from_secs(900))),
        }
    }

    fn open_app(state: AppState) -> Router {
        build_app(
            state,
            AuthState::from_keys(HashSet::new()),
            default_rate_limit_state(),
        )
    }

    async fn mount_provider(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v1/geocode"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "result": { "latitude": 30.1950, "longitude": -98.0867 }
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/route"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "OK",
                "route": { "distance_meters": 48280.3, "duration_seconds": 2400 }
            })))
            .mount(server)
            .await;
    }

    fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json parse")
    }

    #[tokio::test]
    async fn health_is_public() {
        let server = MockServer::start().await;
        let app = build_app(
            test_state(&server.uri()),
            AuthState::from_keys(HashSet::from(["secret".to_string()])),
            default_rate_limit_state(),
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn protected_route_rejects_missing_token() {
        let server = MockServer::start().await;
        let app = build_app(
            test_state(&server.uri()),
            AuthState::from_keys(HashSet::from(["secret".to_string()])),
            default_rate_limit_state(),
        );

        let response = app
            .oneshot(json_post(
                "/api/v1/location/lookup",
                serde_json::json!({ "delivery_location": "Austin, TX" }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_route_accepts_valid_token() {
        let server = MockServer::start().await;
        mount_provider(&server).await;
        let app = build_app(
            test_state(&server.uri()),
            AuthState::from_keys(HashSet::from(["secret".to_string()])),
            default_rate_limit_state(),
        );

        let mut request = json_post(
            "/api/v1/location/lookup",
            serde_json::json!({ "delivery_location": "901 Ranch Rd, Dripping Springs, TX" }),
        );
        request.headers_mut().insert(
            header::AUTHORIZATION,
            "Bearer secret".parse().expect("header"),
        );
        let response = app.oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn webhook_returns_ok_with_degraded_result() {
        let server = MockServer::start().await;
        // Geocoder down: the webhook must still answer 200 with the error
        // carried in-body.
        Mock::given(method("GET"))
            .and(path("/v1/geocode"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let app = open_app(test_state(&server.uri()));
        let response = app
            .oneshot(json_post(
                "/api/v1/webhooks/call",
                serde_json::json!({
                    "call_id": "call-1",
                    "variables": {
                        "usage_type": "wedding",
                        "delivery_location": "901 Ranch Rd, Dripping Springs, TX"
                    }
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(json["error"].is_object(), "error detail carried in-body");
        assert!(json["partial"]["classification"].is_object());
    }

    #[tokio::test]
    async fn webhook_rejects_undecodable_body() {
        let server = MockServer::start().await;
        let app = open_app(test_state(&server.uri()));

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/webhooks/call")
                    .header("content-type", "application/json")
                    .body(Body::from("{ not json"))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn location_lookup_reports_cache_on_second_call() {
        let server = MockServer::start().await;
        mount_provider(&server).await;
        let state = test_state(&server.uri());

        let body = serde_json::json!({
            "delivery_location": "901 Ranch Rd, Dripping Springs, TX"
        });
        let first = open_app(state.clone())
            .oneshot(json_post("/api/v1/location/lookup", body.clone()))
            .await
            .expect("first response");
        let first = body_json(first).await;
        assert_eq!(first["success"], true);
        assert_eq!(first["data"]["distance_result"]["nearest_branch"]["id"], "austin");
        assert_eq!(first["data"]["message"], "computed");

        let second = open_app(state)
            .oneshot(json_post("/api/v1/location/lookup", body))
            .await
            .expect("second response");
        let second = body_json(second).await;
        assert_eq!(second["data"]["message"], "served from cache");
        assert_eq!(
            second["data"]["distance_result"]["distance_miles"],
            first["data"]["distance_result"]["distance_miles"]
        );
    }

    #[tokio::test]
    async fn location_lookup_rejects_blank_address() {
        let server = MockServer::start().await;
        let app = open_app(test_state(&server.uri()));

        let response = app
            .oneshot(json_post(
                "/api/v1/location/lookup",
                serde_json::json!({ "delivery_location": "   " }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn quote_returns_pricing_breakdown() {
        let server = MockServer::start().await;
        mount_provider(&server).await;
        let app = open_app(test_state(&server.uri()));

        let response = app
            .oneshot(json_post(
                "/api/v1/quotes",
                serde_json::json!({
                    "delivery_location": "901 Ranch Rd, Dripping Springs, TX",
                    "trailer_type": "standard",
                    "rental_start_date": "2026-09-12",
                    "rental_days": 3,
                    "usage_type": "wedding",
                    "extras": ["generator"]
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        let quote = &json["data"]["quote"];
        assert_eq!(quote["rental_days"], 3);
        assert!(quote["total"].is_string(), "decimal serialized as string");
    }

    #[tokio::test]
    async fn quote_rejects_unknown_trailer_type() {
        let server = MockServer::start().await;
        let app = open_app(test_state(&server.uri()));

        let response = app
            .oneshot(json_post(
                "/api/v1/quotes",
                serde_json::json!({
                    "delivery_location": "901 Ranch Rd, Dripping Springs, TX",
                    "trailer_type": "submarine",
                    "rental_start_date": "2026-09-12",
                    "rental_days": 3
                }),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

//! Integration tests for `LocationResolver` using wiremock HTTP mocks.

use std::time::Duration;

use voicelead_core::Branch;
use voicelead_geo::{GeoError, GeocoderClient, LocationResolver};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn branch(id: &str, lat: f64, lon: f64, radius: f64) -> Branch {
    Branch {
        id: id.to_string(),
        name: format!("Branch {id}"),
        address: format!("{id} yard"),
        latitude: lat,
        longitude: lon,
        service_radius_miles: radius,
    }
}

fn resolver(server_uri: &str, branches: Vec<Branch>) -> LocationResolver {
    let client = GeocoderClient::with_base_url("test-key", 5, server_uri).expect("client");
    LocationResolver::new(client, branches, Duration::from_secs(300), 0, 0)
}

fn geocode_ok(lat: f64, lon: f64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "status": "OK",
        "result": { "latitude": lat, "longitude": lon }
    }))
}

fn route_ok(distance_meters: f64, duration_seconds: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "status": "OK",
        "route": {
            "distance_meters": distance_meters,
            "duration_seconds": duration_seconds
        }
    }))
}

fn route_none() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "status": "OK",
        "route": null
    }))
}

#[tokio::test]
async fn resolve_picks_branch_with_minimum_driving_distance() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/geocode"))
        .respond_with(geocode_ok(30.19, -98.08))
        .mount(&server)
        .await;

    // Austin yard is the closer origin; the mock keys on the origin param.
    Mock::given(method("GET"))
        .and(path("/v1/route"))
        .and(query_param("origin", "30.2521,-97.7055"))
        .respond_with(route_ok(40_233.6, 2100)) // 25 miles
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/route"))
        .and(query_param("origin", "32.7936,-96.8352"))
        .respond_with(route_ok(321_868.8, 11_000)) // 200 miles
        .mount(&server)
        .await;

    let resolver = resolver(
        &server.uri(),
        vec![
            branch("austin", 30.2521, -97.7055, 90.0),
            branch("dallas", 32.7936, -96.8352, 100.0),
        ],
    );

    let resolved = resolver
        .resolve("901 Ranch Rd, Dripping Springs, TX 78620")
        .await
        .expect("resolve");
    let result = &resolved.distance_result;

    assert_eq!(result.nearest_branch.id, "austin");
    assert!((result.distance_miles.expect("distance") - 25.0).abs() < 0.01);
    assert_eq!(result.duration_seconds, Some(2100));
    assert_eq!(result.within_service_area, Some(true));
    assert!(!resolved.was_cached);
}

#[tokio::test]
async fn repeat_resolution_is_served_from_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/geocode"))
        .respond_with(geocode_ok(30.19, -98.08))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/route"))
        .respond_with(route_ok(40_000.0, 2000))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(&server.uri(), vec![branch("austin", 30.2521, -97.7055, 90.0)]);

    let first = resolver.resolve("901 ranch rd, dripping springs, tx").await.expect("first");
    // Same address with different whitespace/case must hit the same key.
    let second = resolver
        .resolve("  901 Ranch   Rd, Dripping Springs, TX ")
        .await
        .expect("second");

    assert!(!first.was_cached);
    assert!(second.was_cached);
    assert_eq!(
        first.distance_result.nearest_branch.id,
        second.distance_result.nearest_branch.id
    );
    assert_eq!(
        first.distance_result.distance_miles,
        second.distance_result.distance_miles
    );
}

#[tokio::test]
async fn outside_radius_is_false_not_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/geocode"))
        .respond_with(geocode_ok(36.16, -115.15))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/route"))
        .respond_with(route_ok(2_011_680.0, 72_000)) // 1250 miles
        .mount(&server)
        .await;

    let resolver = resolver(&server.uri(), vec![branch("austin", 30.2521, -97.7055, 90.0)]);
    let resolved = resolver.resolve("Las Vegas, NV").await.expect("resolve");

    assert_eq!(resolved.distance_result.within_service_area, Some(false));
}

#[tokio::test]
async fn unroutable_address_preserves_tri_state_null() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/geocode"))
        .respond_with(geocode_ok(21.31, -157.86))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/route"))
        .respond_with(route_none())
        .mount(&server)
        .await;

    let resolver = resolver(&server.uri(), vec![branch("austin", 30.2521, -97.7055, 90.0)]);
    let resolved = resolver.resolve("Honolulu, HI").await.expect("resolve");
    let result = &resolved.distance_result;

    assert_eq!(result.within_service_area, None, "must stay null, not false");
    assert_eq!(result.distance_miles, None);
    assert_eq!(result.nearest_branch.id, "austin");
}

#[tokio::test]
async fn unresolvable_address_raises_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/geocode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "result": null
        })))
        .mount(&server)
        .await;

    let resolver = resolver(&server.uri(), vec![branch("austin", 30.2521, -97.7055, 90.0)]);
    let err = resolver.resolve("asdfqwerty").await.expect_err("should fail");
    assert!(matches!(
        err,
        GeoError::Unresolvable(_) | GeoError::Shared(_)
    ));
}

#[tokio::test]
async fn empty_address_is_rejected_before_any_call() {
    let server = MockServer::start().await;
    let resolver = resolver(&server.uri(), vec![branch("austin", 30.2521, -97.7055, 90.0)]);
    let err = resolver.resolve("   ").await.expect_err("should fail");
    assert!(matches!(err, GeoError::EmptyAddress));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn geocode_api_error_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/geocode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "ERROR",
            "message": "invalid api key"
        })))
        .mount(&server)
        .await;

    let resolver = resolver(&server.uri(), vec![branch("austin", 30.2521, -97.7055, 90.0)]);
    let err = resolver.resolve("Austin, TX").await.expect_err("should fail");
    let message = err.to_string();
    assert!(message.contains("invalid api key"), "got: {message}");
}

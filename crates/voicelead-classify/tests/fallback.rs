//! Integration tests for the AI classifier and its fallback wiring, using
//! wiremock HTTP mocks.

use voicelead_classify::{
    AiClassifier, ClassificationInput, FallbackClassifier, LeadType, RULE_CONFIDENCE,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_classifier(base_url: &str) -> AiClassifier {
    AiClassifier::with_base_url("test-key", 5, base_url)
        .expect("client construction should not fail")
}

fn wedding_input() -> ClassificationInput {
    ClassificationInput {
        intended_use: Some("wedding".to_string()),
        stall_count: Some(6),
        event_duration_days: Some(2),
        within_service_area: Some(true),
        distance_miles: Some(18.4),
        product_interest: vec!["luxury restroom trailer".to_string()],
        transcript_summary: Some("caller planning a June wedding".to_string()),
    }
}

#[tokio::test]
async fn accepted_ai_result_carries_provenance() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/classify"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({ "intended_use": "wedding" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "classification": {
                "lead_type": "hot",
                "confidence": 0.93,
                "reasoning": "sized wedding request with confirmed location",
                "routing_suggestion": "assign to event sales"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let classifier = FallbackClassifier::new(Some(test_classifier(&server.uri())), 0.55, 1);
    let result = classifier.classify_with_fallback(&wedding_input()).await;

    assert!(result.used_ai);
    assert_eq!(result.lead_type, LeadType::Hot);
    assert!((result.confidence - 0.93).abs() < f32::EPSILON);
    assert_eq!(result.routing_suggestion, "assign to event sales");
}

#[tokio::test]
async fn server_error_falls_back_to_rules() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/classify"))
        .respond_with(ResponseTemplate::new(500))
        // One original attempt plus one retry for a transient failure.
        .expect(2)
        .mount(&server)
        .await;

    let classifier = FallbackClassifier::new(Some(test_classifier(&server.uri())), 0.55, 1);
    let result = classifier.classify_with_fallback(&wedding_input()).await;

    assert!(!result.used_ai);
    assert_eq!(result.lead_type, LeadType::Hot);
    assert!((result.confidence - RULE_CONFIDENCE).abs() < f32::EPSILON);
}

#[tokio::test]
async fn undecodable_body_falls_back_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/classify"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let classifier = FallbackClassifier::new(Some(test_classifier(&server.uri())), 0.55, 3);
    let result = classifier.classify_with_fallback(&wedding_input()).await;

    assert!(!result.used_ai);
}

#[tokio::test]
async fn out_of_range_confidence_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/classify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "classification": {
                "lead_type": "hot",
                "confidence": 3.2,
                "reasoning": "overconfident",
                "routing_suggestion": "assign to event sales"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let classifier = FallbackClassifier::new(Some(test_classifier(&server.uri())), 0.55, 1);
    let result = classifier.classify_with_fallback(&wedding_input()).await;

    assert!(!result.used_ai);
}

//! Router-level tests for the inference and health endpoints.
//!
//! Requests are driven through the router in-process with `oneshot`; the
//! model is replaced by the recording mock.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;
use vertexai_gateway::services::providers::mock::{MockContentProvider, RecordedCall};
use vertexai_gateway::services::GenerationParams;
use vertexai_gateway::startup::{build_router, AppState};

fn app(provider: Arc<MockContentProvider>) -> Router {
    build_router(AppState::new(provider))
}

fn post_json(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}

#[tokio::test]
async fn inference_returns_generated_text() {
    let provider = Arc::new(MockContentProvider::replying("Hello!"));

    let response = app(provider.clone())
        .oneshot(post_json(
            "/v1/inference",
            r#"{"prompt":"Hi","model":"demo-model","temperature":0.5,"max_tokens":100}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"text": "Hello!"}));
}

#[tokio::test]
async fn inference_forwards_parameters_unchanged() {
    let provider = Arc::new(MockContentProvider::replying("Hello!"));

    app(provider.clone())
        .oneshot(post_json(
            "/v1/inference",
            r#"{"prompt":"Hi","model":"demo-model","temperature":0.5,"max_tokens":100}"#,
        ))
        .await
        .unwrap();

    assert_eq!(
        provider.calls(),
        vec![RecordedCall {
            model: "demo-model".to_string(),
            prompt: "Hi".to_string(),
            params: GenerationParams {
                temperature: Some(0.5),
                max_output_tokens: Some(100),
            },
        }]
    );
}

#[tokio::test]
async fn out_of_range_values_are_not_validated_locally() {
    let provider = Arc::new(MockContentProvider::replying("ok"));

    let response = app(provider.clone())
        .oneshot(post_json(
            "/v1/inference",
            r#"{"prompt":"","model":"no-such-model","temperature":7.5,"max_tokens":-1}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].prompt, "");
    assert_eq!(calls[0].model, "no-such-model");
    assert_eq!(calls[0].params.temperature, Some(7.5));
    assert_eq!(calls[0].params.max_output_tokens, Some(-1));
}

#[tokio::test]
async fn missing_sampling_parameters_are_left_unset() {
    let provider = Arc::new(MockContentProvider::replying("ok"));

    let response = app(provider.clone())
        .oneshot(post_json("/v1/inference", r#"{"prompt":"Hi","model":"m"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(provider.calls()[0].params, GenerationParams::default());
}

#[tokio::test]
async fn malformed_body_is_rejected_without_calling_model() {
    let provider = Arc::new(MockContentProvider::replying("Hello!"));

    let response = app(provider.clone())
        .oneshot(post_json("/v1/inference", "not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    let error = body["error"].as_str().expect("error field missing");
    assert!(!error.is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn wrong_field_type_is_rejected_without_calling_model() {
    let provider = Arc::new(MockContentProvider::replying("Hello!"));

    let response = app(provider.clone())
        .oneshot(post_json(
            "/v1/inference",
            r#"{"prompt":"Hi","model":"m","temperature":"hot"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn missing_content_type_is_a_bad_request() {
    let provider = Arc::new(MockContentProvider::replying("Hello!"));

    let response = app(provider.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/inference")
                .body(Body::from(r#"{"prompt":"Hi","model":"m"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn upstream_failure_maps_to_bad_gateway() {
    let provider = Arc::new(MockContentProvider::failing(404, "model not found"));

    let response = app(provider.clone())
        .oneshot(post_json(
            "/v1/inference",
            r#"{"prompt":"Hi","model":"missing","temperature":0.5,"max_tokens":100}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let body = body_json(response).await;
    let error = body["error"].as_str().unwrap();
    assert!(error.contains("model not found"));
    assert!(body.get("text").is_none());
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn health_does_not_call_model() {
    let provider = Arc::new(MockContentProvider::failing(500, "down"));

    let response = app(provider.clone())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"status": "healthy", "service": "vertexai-gateway"})
    );
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn unknown_route_is_json_not_found() {
    let provider = Arc::new(MockContentProvider::replying("unused"));

    let response = app(provider)
        .oneshot(Request::builder().uri("/v2/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());
}


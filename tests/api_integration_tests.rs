//! HTTP API integration tests using tower's oneshot against the full
//! router with an in-memory database.

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use base64::Engine;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use smartcert::{build_router, AppState};

use helpers::{test_config, test_state, InstantAnalyzer};

const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

async fn test_app() -> (axum::Router, AppState) {
    let state = test_state(
        test_config(),
        Arc::new(InstantAnalyzer { local_score: 95.0 }),
    )
    .await;
    (build_router(state.clone()), state)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn submit_body() -> Value {
    json!({
        "document": base64::engine::general_purpose::STANDARD.encode(PNG_BYTES),
        "mime_type": "image/png",
    })
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let (app, _state) = test_app().await;

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "smartcert");
}

#[tokio::test]
async fn submit_rejects_invalid_base64() {
    let (app, _state) = test_app().await;

    let body = json!({"document": "not-base64!!!", "mime_type": "image/png"});
    let response = app
        .oneshot(json_request(Method::POST, "/verify/submit", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn submit_rejects_unsupported_mime_type() {
    let (app, _state) = test_app().await;

    let body = json!({
        "document": base64::engine::general_purpose::STANDARD.encode(PNG_BYTES),
        "mime_type": "text/html",
    });
    let response = app
        .oneshot(json_request(Method::POST, "/verify/submit", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_rejects_oversized_document() {
    let mut config = test_config();
    config.max_document_bytes = 16;
    let state = test_state(config, Arc::new(InstantAnalyzer { local_score: 95.0 })).await;
    let app = build_router(state);

    let body = json!({
        "document": base64::engine::general_purpose::STANDARD.encode(vec![0u8; 64]),
        "mime_type": "image/png",
    });
    let response = app
        .oneshot(json_request(Method::POST, "/verify/submit", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn submit_then_poll_result_to_completion() {
    let (app, _state) = test_app().await;

    let response = app
        .clone()
        .oneshot(json_request(Method::POST, "/verify/submit", submit_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = response_json(response).await;
    let request_id = body["request_id"].as_str().unwrap().to_string();
    assert_eq!(body["state"], "STAGED");

    // Poll the result endpoint until the pipeline finishes
    let mut completed = None;
    for _ in 0..200 {
        let response = app
            .clone()
            .oneshot(get_request(&format!("/verify/result/{}", request_id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        match body["outcome"].as_str().unwrap() {
            "pending" => tokio::time::sleep(Duration::from_millis(10)).await,
            "completed" => {
                completed = Some(body);
                break;
            }
            other => panic!("Unexpected outcome: {}", other),
        }
    }
    let body = completed.expect("Pipeline should complete");

    let result = &body["result"];
    assert_eq!(result["status"], "GENUINE");
    assert_eq!(result["confidence_score"], 95);
    assert_eq!(result["extracted_data"]["candidate_name"], "Jane Doe");

    // The completed result is visible in history
    let response = app.clone().oneshot(get_request("/history")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let history = response_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["id"], result["id"]);

    // Toggle favorite through the API
    let result_id = result["id"].as_str().unwrap();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(format!("/favorites/{}/toggle", result_id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let toggle = response_json(response).await;
    assert_eq!(toggle["favorite"], true);

    let response = app.oneshot(get_request("/favorites")).await.unwrap();
    let favorites = response_json(response).await;
    assert_eq!(favorites.as_array().unwrap().len(), 1);
    assert_eq!(favorites[0]["id"].as_str().unwrap(), result_id);
}

#[tokio::test]
async fn progress_for_unknown_request_is_not_found() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(get_request(&format!(
            "/verify/progress/{}",
            uuid::Uuid::new_v4()
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn toggle_favorite_for_unknown_result_is_not_found() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(format!("/favorites/{}/toggle", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cancel_for_unknown_request_is_not_found() {
    let (app, _state) = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(format!("/verify/cancel/{}", uuid::Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

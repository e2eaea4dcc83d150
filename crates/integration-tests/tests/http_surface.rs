//! Status endpoints, error shapes, CORS and request IDs.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use popup_relay_integration_tests::{STOREFRONT_ORIGIN, TestApp, body_json};
use serde_json::json;

#[tokio::test]
async fn test_root_status_message() {
    let app = TestApp::spawn().await;

    let response = app
        .request(Request::get("/").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"message": "Waldoch rebate popup API running"})
    );
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;

    let response = app
        .request(Request::get("/health").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_unknown_path_is_json_404() {
    let app = TestApp::spawn().await;

    let response = app
        .request(Request::get("/api/nope").body(Body::empty()).unwrap())
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await, json!({"error": "Not found"}));
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            Request::post("/api/send-rebate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"email\": "))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await,
        json!({"error": "Invalid request body"})
    );
    assert_eq!(app.outbound_calls().await, (0, 0));
}

#[tokio::test]
async fn test_cors_preflight_for_storefront() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/quote")
                .header(header::ORIGIN, STOREFRONT_ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        STOREFRONT_ORIGIN
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
}

#[tokio::test]
async fn test_cors_rejects_other_origins() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            Request::get("/")
                .header(header::ORIGIN, "https://evil.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert!(
        !response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}

#[tokio::test]
async fn test_request_id_echoed() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            Request::get("/health")
                .header("x-request-id", "render-abc123")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.headers()["x-request-id"], "render-abc123");
}

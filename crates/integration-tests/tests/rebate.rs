//! End-to-end tests for `POST /api/send-rebate`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use popup_relay_integration_tests::{CUSTOMER_CREATE, TestApp, customer};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

const PDF_URL: &str = "https://cdn.shopify.com/s/files/superwinch-rebate.pdf";

#[tokio::test]
async fn test_new_customer_gets_email_and_rebate_tag() {
    let app = TestApp::spawn().await;
    app.mail_accepts().await;
    app.search_returns(json!([])).await;

    Mock::given(method("POST"))
        .and(path(CUSTOMER_CREATE))
        .and(body_json(json!({
            "customer": {
                "email": "jane@x.com",
                "first_name": "Rebate",
                "last_name": "User",
                "tags": "rebate",
                "verified_email": true
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "customer": customer(7, "jane@x.com", "rebate")
        })))
        .expect(1)
        .mount(&app.shopify)
        .await;

    let (status, body) = app
        .post_json(
            "/api/send-rebate",
            &json!({"email": "jane@x.com", "pdfUrl": PDF_URL}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["emailSent"], true);
    assert_eq!(body["shopifySuccess"], true);
    assert_eq!(body["shopifyData"]["id"], 7);
    assert_eq!(body["shopifyData"]["tags"], "rebate");
    assert_eq!(app.mail_recipients().await, vec!["jane@x.com"]);
}

#[tokio::test]
async fn test_missing_fields_make_no_outbound_calls() {
    let app = TestApp::spawn().await;

    for payload in [
        json!({}),
        json!({"email": "jane@x.com"}),
        json!({"pdfUrl": PDF_URL}),
        json!({"email": "", "pdfUrl": PDF_URL}),
    ] {
        let (status, body) = app.post_json("/api/send-rebate", &payload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "payload: {payload}");
        assert_eq!(body, json!({"error": "Missing email or pdfUrl"}));
    }

    assert_eq!(app.outbound_calls().await, (0, 0));
}

#[tokio::test]
async fn test_already_tagged_customer_is_left_unchanged() {
    let app = TestApp::spawn().await;
    app.mail_accepts().await;
    app.search_returns(json!([customer(42, "jane@x.com", "vip, rebate")]))
        .await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.shopify)
        .await;

    let (status, body) = app
        .post_json(
            "/api/send-rebate",
            &json!({"email": "jane@x.com", "pdfUrl": PDF_URL}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shopifySuccess"], true);
    assert_eq!(body["shopifyData"]["tags"], "vip, rebate");
}

#[tokio::test]
async fn test_existing_customer_gains_one_rebate_tag() {
    let app = TestApp::spawn().await;
    app.mail_accepts().await;
    app.search_returns(json!([customer(42, "jane@x.com", "vip")]))
        .await;

    Mock::given(method("PUT"))
        .and(path("/admin/api/2025-07/customers/42.json"))
        .and(body_json(json!({"customer": {"tags": "vip,rebate"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "customer": customer(42, "jane@x.com", "vip, rebate")
        })))
        .expect(1)
        .mount(&app.shopify)
        .await;

    let (status, body) = app
        .post_json(
            "/api/send-rebate",
            &json!({"email": "Jane@X.com", "pdfUrl": PDF_URL}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["shopifySuccess"], true);
    assert_eq!(body["shopifyData"]["tags"], "vip, rebate");
}

#[tokio::test]
async fn test_mail_failure_is_partial_success() {
    let app = TestApp::spawn().await;
    app.mail_fails().await;
    app.search_returns(json!([customer(42, "jane@x.com", "rebate")]))
        .await;

    let (status, body) = app
        .post_json(
            "/api/send-rebate",
            &json!({"email": "jane@x.com", "pdfUrl": PDF_URL}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["emailSent"], false);
    assert_eq!(body["shopifySuccess"], true);
}

#[tokio::test]
async fn test_shopify_outage_still_sends_email() {
    let app = TestApp::spawn().await;
    app.mail_accepts().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&app.shopify)
        .await;
    Mock::given(method("POST"))
        .and(path(CUSTOMER_CREATE))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.shopify)
        .await;

    let (status, body) = app
        .post_json(
            "/api/send-rebate",
            &json!({"email": "jane@x.com", "pdfUrl": PDF_URL}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"emailSent": true, "shopifySuccess": false, "shopifyData": null})
    );
}

#[tokio::test]
async fn test_url_encoded_form_post() {
    let app = TestApp::spawn().await;
    app.mail_accepts().await;
    app.search_returns(json!([customer(42, "jane@x.com", "rebate")]))
        .await;

    let (status, body) = app
        .post_form(
            "/api/send-rebate",
            "email=Jane%40x.com&pdfUrl=https%3A%2F%2Fcdn.shopify.com%2Fs%2Ffiles%2Fsuperwinch-rebate.pdf",
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["emailSent"], true);
    assert_eq!(body["shopifySuccess"], true);
    assert_eq!(app.mail_recipients().await, vec!["jane@x.com"]);
}

#[tokio::test]
async fn test_url_encoded_form_missing_fields() {
    let app = TestApp::spawn().await;

    let (status, body) = app.post_form("/api/send-rebate", "email=jane%40x.com").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Missing email or pdfUrl"}));
    assert_eq!(app.outbound_calls().await, (0, 0));
}

//! Order tracking API and tracking page.

#![allow(clippy::unwrap_used)]

use axum::http::{StatusCode, header};
use serde_json::json;

use pulp_integration_tests::{
    DELIVERED_ORDER_ID, NO_ETA_ORDER_ID, PACKING_ORDER_ID, TestContext,
};

// ============================================================================
// JSON API
// ============================================================================

#[tokio::test]
async fn test_track_order_found() {
    let ctx = TestContext::new().await;

    let response = ctx
        .get(&format!("/rest/track-order/{PACKING_ORDER_ID}"), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let json = response.json();
    assert_eq!(json["status"], "success");
    let order = &json["data"][0];
    assert_eq!(order["orderId"], PACKING_ORDER_ID);
    assert_eq!(order["email"], "*dm*n@p*lp-sh.*p");
    assert_eq!(order["eta"], 3);
    assert_eq!(order["delivered"], false);
    assert_eq!(order["products"].as_array().unwrap().len(), 2);
    assert!((order["totalPrice"].as_f64().unwrap() - 8.96).abs() < 1e-9);
}

#[tokio::test]
async fn test_track_order_unknown_echoes_id() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/rest/track-order/does-not-exist", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "status": "success", "data": [{ "orderId": "does-not-exist" }] })
    );
}

#[tokio::test]
async fn test_track_order_sanitizes_id() {
    let ctx = TestContext::new().await;

    let response = ctx
        .get("/rest/track-order/%3Cb%3E5267-f9cd5882f54c75a3%3C%2Fb%3E", None)
        .await;

    let json = response.json();
    assert_eq!(json["data"][0]["orderId"], "b5267-f9cd5882f54c75a3b");
    assert!(json["data"][0].get("email").is_none());
}

// ============================================================================
// Tracking page
// ============================================================================

#[tokio::test]
async fn test_track_result_renders_order() {
    let ctx = TestContext::new().await;

    let response = ctx
        .get(&format!("/track-result?id={PACKING_ORDER_ID}"), None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let content_type = response.headers[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let html = response.text();
    assert!(html.contains(&format!("<code>{PACKING_ORDER_ID}</code>")));
    assert!(html.contains("3 days"));
    assert!(html.contains("*dm*n@p*lp-sh.*p"));
    assert!(html.contains("Apple Juice (1000ml)"));
    assert!(html.contains("8.96¤"));
    assert!(html.contains(r#"data-status="Packing""#));
}

#[tokio::test]
async fn test_track_result_status_variants() {
    let ctx = TestContext::new().await;

    let cases = [
        (format!("/track-result?id={DELIVERED_ORDER_ID}"), "Delivered"),
        (format!("/track-result/new?id={DELIVERED_ORDER_ID}"), "Delivered"),
        (format!("/track-result/new?id={PACKING_ORDER_ID}"), "Order placed"),
        (format!("/track-result?id={NO_ETA_ORDER_ID}"), "In transit"),
    ];

    for (uri, label) in &cases {
        let html = ctx.get(uri, None).await.text();
        assert!(
            html.contains(&format!(r#"data-status="{label}""#)),
            "{uri} should render {label}"
        );
    }
}

#[tokio::test]
async fn test_track_result_unknown_eta_shows_question_mark() {
    let ctx = TestContext::new().await;

    let html = ctx
        .get(&format!("/track-result?id={NO_ETA_ORDER_ID}"), None)
        .await
        .text();

    assert!(html.contains("? days"));
}

#[tokio::test]
async fn test_track_result_unknown_order() {
    let ctx = TestContext::new().await;

    let response = ctx
        .get("/track-result?id=%3Cscript%3Ealert(1)%3C%2Fscript%3E", None)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let html = response.text();
    assert!(html.contains("<code>scriptalert1script</code>"));
    assert!(!html.contains("<script>"));
}

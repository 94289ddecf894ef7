//! Version reporting, challenges, health checks and request IDs.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use pulp_integration_tests::{
    TestContext, WURSTBROT_EMAIL, WURSTBROT_PASSWORD, WURSTBROT_SECRET, current_code, test_config,
};

#[tokio::test]
async fn test_version_shown_by_default() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/rest/admin/application-version", None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json(),
        json!({ "version": pulp_server::routes::version::VERSION })
    );
}

#[tokio::test]
async fn test_version_hidden_when_disabled() {
    let mut config = test_config();
    config.application.show_version_number = false;
    let ctx = TestContext::with_config(config).await;

    let response = ctx.get("/rest/admin/application-version", None).await;

    assert_eq!(response.json(), json!({ "version": "" }));
}

#[tokio::test]
async fn test_challenge_listed_as_solved_after_wurstbrot_login() {
    let ctx = TestContext::new().await;

    let before = ctx.get("/rest/challenges", None).await.json();
    assert_eq!(before[0]["solved"], false);

    let tmp_token = ctx.tmp_token(WURSTBROT_EMAIL, WURSTBROT_PASSWORD).await;
    ctx.post_json(
        "/rest/2fa/verify",
        &json!({ "tmpToken": tmp_token, "totpToken": current_code(WURSTBROT_SECRET) }),
        None,
    )
    .await;

    let after = ctx.get("/rest/challenges", None).await.json();
    assert_eq!(after[0]["key"], "twoFactorAuthUnsafeSecretStorageChallenge");
    assert_eq!(after[0]["solved"], true);
}

#[tokio::test]
async fn test_challenge_follows_configured_domain() {
    let mut config = test_config();
    config.application.domain = "other-shop.test".to_owned();
    let ctx = TestContext::with_config(config).await;

    // Seed accounts take the configured domain.
    let tmp_token = ctx
        .tmp_token("wurstbrot@other-shop.test", WURSTBROT_PASSWORD)
        .await;
    let response = ctx
        .post_json(
            "/rest/2fa/verify",
            &json!({ "tmpToken": tmp_token, "totpToken": current_code(WURSTBROT_SECRET) }),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let challenges = ctx.get("/rest/challenges", None).await.json();
    assert_eq!(challenges[0]["solved"], true);
}

#[tokio::test]
async fn test_health_checks() {
    let ctx = TestContext::new().await;

    let live = ctx.get("/health", None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.text(), "ok");

    let ready = ctx.get("/health/ready", None).await;
    assert_eq!(ready.status, StatusCode::OK);
}

#[tokio::test]
async fn test_every_response_has_request_id() {
    let ctx = TestContext::new().await;

    for uri in ["/health", "/rest/2fa/status", "/rest/track-order/x"] {
        let response = ctx.get(uri, None).await;
        assert!(
            response.headers.contains_key("x-request-id"),
            "{uri} missing x-request-id"
        );
    }
}

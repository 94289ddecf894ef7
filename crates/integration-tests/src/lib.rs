//! Integration tests for Pulp Shop.
//!
//! The tests drive the real router in-process with
//! `tower::ServiceExt::oneshot`, backed by an in-memory store seeded from
//! `crates/server/data`. No database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p pulp-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

use pulp_server::config::ShopConfig;
use pulp_server::db::{MemoryStore, seed};
use pulp_server::routes;
use pulp_server::services::totp::Totp;
use pulp_server::state::AppState;

/// Signing secret used by every test server.
pub const TEST_JWT_SECRET: &str = "k3Jq9vXz2LmPw8RtYb6NcHd4FgAs7EuQ";

/// Seeded account without 2FA.
pub const JIM_EMAIL: &str = "jim@pulp-sh.op";
pub const JIM_PASSWORD: &str = "ncc-1701";

/// Seeded account with 2FA.
pub const WURSTBROT_EMAIL: &str = "wurstbrot@pulp-sh.op";
pub const WURSTBROT_PASSWORD: &str = "EinBelegtesBrotMitSchinkenSCHINKEN!";
pub const WURSTBROT_SECRET: &str = "IFTXE3SPOEYVURT2MRYGI52TKJ4HC3KH";

/// A seeded order that is being packed.
pub const PACKING_ORDER_ID: &str = "5267-f9cd5882f54c75a3";
/// A seeded order that has been delivered.
pub const DELIVERED_ORDER_ID: &str = "5267-7ecb8f8a5b1d9e2c";
/// A seeded order without an ETA.
pub const NO_ETA_ORDER_ID: &str = "5267-0a3c9f61e2b84d57";

/// The seed data shipped with the server.
#[must_use]
pub fn seed_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../server/data")
}

/// Configuration for a test server.
#[must_use]
pub fn test_config() -> ShopConfig {
    let mut config = ShopConfig::in_memory(SecretString::from(TEST_JWT_SECRET));
    config.seed_dir = seed_dir();
    config
}

/// The current TOTP code for `secret`.
#[must_use]
pub fn current_code(secret: &str) -> String {
    Totp::default()
        .current_code(secret)
        .expect("valid TOTP secret")
}

/// A response with its body read.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    /// The body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is JSON")
    }

    /// The body as UTF-8 text.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8(self.body.to_vec()).expect("response body is UTF-8")
    }
}

/// An in-process shop server.
pub struct TestContext {
    pub state: AppState,
    app: Router,
}

impl TestContext {
    /// A server with the default test configuration.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// A server with `config`, seeded from `config.seed_dir`.
    pub async fn with_config(config: ShopConfig) -> Self {
        let store = MemoryStore::new();
        seed::seed_from_dir(&store, &config.seed_dir, &config.application.domain)
            .await
            .expect("seed data loads");

        let state = AppState::new(config, Arc::new(store));
        let app = routes::app(state.clone());
        Self { state, app }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body can be read");

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// `GET uri`, optionally with a bearer token.
    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(build(Method::GET, uri, token, Body::empty())).await
    }

    /// `POST uri` with a JSON body, optionally with a bearer token.
    pub async fn post_json(&self, uri: &str, body: &Value, token: Option<&str>) -> TestResponse {
        let request = build(Method::POST, uri, token, Body::from(body.to_string()));
        self.send(request).await
    }

    /// `POST uri` with a raw body sent as JSON.
    pub async fn post_raw(
        &self,
        uri: &str,
        body: &'static str,
        token: Option<&str>,
    ) -> TestResponse {
        self.send(build(Method::POST, uri, token, Body::from(body)))
            .await
    }

    /// Log in with email and password.
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post_json(
            "/rest/user/login",
            &serde_json::json!({ "email": email, "password": password }),
            None,
        )
        .await
    }

    /// Log in an account without 2FA and return its session token.
    pub async fn session_token(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status, StatusCode::OK, "login failed: {response:?}");
        token_of(&response.json())
    }

    /// Log in an account with 2FA up to the second factor and return the
    /// temporary token.
    pub async fn tmp_token(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        let json = response.json();
        assert_eq!(json["status"], "totp_token_required");
        json["data"]["tmpToken"]
            .as_str()
            .expect("tmpToken present")
            .to_owned()
    }
}

/// The session token of an `{ authentication: { token } }` body.
#[must_use]
pub fn token_of(json: &Value) -> String {
    json["authentication"]["token"]
        .as_str()
        .expect("authentication token present")
        .to_owned()
}

fn build(method: Method, uri: &str, token: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body).expect("valid request")
}

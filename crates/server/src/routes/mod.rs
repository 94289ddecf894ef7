//! HTTP route handlers for the shop.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (store ping)
//!
//! # Auth
//! POST /rest/user/login                 - Password login
//! POST /rest/2fa/verify                 - Exchange tmpToken + TOTP code for a session
//! GET  /rest/2fa/status                 - 2FA state of the session user (also POST)
//! POST /rest/2fa/setup                  - Enable 2FA (requires session)
//! POST /rest/2fa/disable                - Disable 2FA (requires session)
//!
//! # Orders
//! GET  /rest/track-order/{id}           - Order lookup (JSON)
//! GET  /track-result?id=                - Tracking page
//! GET  /track-result/new?id=            - Tracking page after checkout
//!
//! # Misc
//! GET  /rest/admin/application-version  - Version number
//! GET  /rest/challenges                 - Training challenge progress
//! ```

pub mod auth;
pub mod challenges;
pub mod health;
pub mod orders;
pub mod track_result;
pub mod two_factor;
pub mod version;

use axum::{
    Router,
    extract::Request,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Create the two-factor routes router.
pub fn two_factor_routes() -> Router<AppState> {
    Router::new()
        .route("/verify", post(two_factor::verify))
        .route("/status", get(two_factor::status).post(two_factor::status))
        .route("/setup", post(two_factor::setup))
        .route("/disable", post(two_factor::disable))
}

/// Create the REST API router.
pub fn rest_routes() -> Router<AppState> {
    Router::new()
        .route("/user/login", post(auth::login))
        .nest("/2fa", two_factor_routes())
        .route(
            "/admin/application-version",
            get(version::application_version),
        )
        .route("/track-order/{id}", get(orders::track_order))
        .route("/challenges", get(challenges::list))
}

/// Create all routes for the shop.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/rest", rest_routes())
        .route("/track-result", get(track_result::track_result))
        .route("/track-result/new", get(track_result::track_new_order))
}

/// Build the complete application with health checks, tracing and request IDs.
///
/// Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .with_state(state)
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
}

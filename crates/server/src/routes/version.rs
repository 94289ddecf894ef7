//! Application version reporting.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::state::AppState;

/// The crate version, reported when enabled.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}

/// `GET /rest/admin/application-version`
///
/// Reports an empty version when `PULP_SHOW_VERSION` is off.
pub async fn application_version(State(state): State<AppState>) -> Json<VersionResponse> {
    let version = if state.config().application.show_version_number {
        VERSION
    } else {
        ""
    };
    Json(VersionResponse { version })
}

//! TOTP two-factor authentication endpoints.
//!
//! Every failure, whatever its cause, is a bare `401`.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use super::auth::AuthenticationResponse;
use crate::error::Result;
use crate::middleware::RequireUser;
use crate::services::auth::{AuthService, TwoFactorStatus};
use crate::state::AppState;

type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// `POST /rest/2fa/verify` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub tmp_token: String,
    pub totp_token: String,
}

/// `POST /rest/2fa/setup` body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupRequest {
    pub password: String,
    pub setup_token: String,
    pub initial_token: String,
}

/// `POST /rest/2fa/disable` body.
#[derive(Debug, Deserialize)]
pub struct DisableRequest {
    pub password: String,
}

/// `POST /rest/2fa/verify`
///
/// Exchanges the temporary login token and a TOTP code for a session.
#[instrument(skip_all)]
pub async fn verify(
    State(state): State<AppState>,
    body: JsonBody<VerifyRequest>,
) -> Result<Json<AuthenticationResponse>> {
    let Json(request) = body?;

    let authentication = AuthService::new(&state)
        .verify_second_factor(&request.tmp_token, &request.totp_token)
        .await?;

    Ok(Json(AuthenticationResponse { authentication }))
}

/// `GET|POST /rest/2fa/status`
#[instrument(skip_all)]
pub async fn status(
    State(state): State<AppState>,
    RequireUser { user, .. }: RequireUser,
) -> Result<Json<TwoFactorStatus>> {
    Ok(Json(AuthService::new(&state).two_factor_status(&user)?))
}

/// `POST /rest/2fa/setup`
#[instrument(skip_all)]
pub async fn setup(
    State(state): State<AppState>,
    RequireUser { token, user }: RequireUser,
    body: JsonBody<SetupRequest>,
) -> Result<StatusCode> {
    let Json(request) = body?;

    AuthService::new(&state)
        .setup_two_factor(
            &token,
            &user,
            &request.password,
            &request.setup_token,
            &request.initial_token,
        )
        .await?;

    Ok(StatusCode::OK)
}

/// `POST /rest/2fa/disable`
#[instrument(skip_all)]
pub async fn disable(
    State(state): State<AppState>,
    RequireUser { token, user }: RequireUser,
    body: JsonBody<DisableRequest>,
) -> Result<StatusCode> {
    let Json(request) = body?;

    AuthService::new(&state)
        .disable_two_factor(&token, &user, &request.password)
        .await?;

    Ok(StatusCode::OK)
}

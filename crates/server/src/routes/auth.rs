//! Password login.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::services::auth::{AuthError, AuthService, Authentication, LoginOutcome};
use crate::state::AppState;

/// Body shown when the email or password is wrong.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

/// Status reported when the password was right but a TOTP code is needed.
pub const TOTP_TOKEN_REQUIRED: &str = "totp_token_required";

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of a successful login or second-factor verification.
#[derive(Debug, Serialize)]
pub struct AuthenticationResponse {
    pub authentication: Authentication,
}

/// Body of a login that needs the second factor.
#[derive(Debug, Serialize)]
pub struct SecondFactorRequired {
    pub status: &'static str,
    pub data: PendingLogin,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingLogin {
    pub tmp_token: String,
}

/// `POST /rest/user/login`
///
/// Users with 2FA get a `401` carrying a temporary token to exchange, with a
/// TOTP code, at `/rest/2fa/verify`.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Response> {
    let Json(request) = body?;

    match AuthService::new(&state)
        .login(&request.email, &request.password)
        .await
    {
        Ok(LoginOutcome::Authenticated(authentication)) => {
            Ok(Json(AuthenticationResponse { authentication }).into_response())
        }
        Ok(LoginOutcome::SecondFactorRequired { tmp_token }) => Ok((
            StatusCode::UNAUTHORIZED,
            Json(SecondFactorRequired {
                status: TOTP_TOKEN_REQUIRED,
                data: PendingLogin { tmp_token },
            }),
        )
            .into_response()),
        Err(AuthError::InvalidCredentials) => {
            Ok((StatusCode::UNAUTHORIZED, INVALID_CREDENTIALS_MESSAGE).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

//! Authentication extractor.
//!
//! A request is authenticated when it carries `Authorization: Bearer <token>`
//! where the token is a valid session token that is still present in the
//! authenticated-session cache.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::{AppError, set_sentry_user};
use crate::models::SessionUser;
use crate::services::auth::AuthError;
use crate::services::sessions::bearer_token;
use crate::services::tokens::{SESSION, TokenPayload};
use crate::state::AppState;

/// Extractor that requires an authenticated session.
///
/// Rejects with a bare `401` otherwise.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser { user, .. }: RequireUser) -> String {
///     format!("Hello, {}!", user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireUser {
    /// The session token, needed to update the cached user.
    pub token: String,
    /// The cached session user.
    pub user: SessionUser,
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::NotAuthenticated)?;

        let payload = state.tokens().verify(token).map_err(AuthError::from)?;
        if !matches!(payload, TokenPayload::Session { .. }) {
            return Err(AuthError::WrongTokenType {
                expected: SESSION,
                actual: payload.kind(),
            }
            .into());
        }

        let user = state
            .sessions()
            .get(token)
            .await
            .ok_or(AuthError::NotAuthenticated)?;

        set_sentry_user(&user.id, Some(user.email.as_str()));

        Ok(Self {
            token: token.to_owned(),
            user,
        })
    }
}

//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::tokens::TokenError;

/// Errors that can occur during authentication operations.
///
/// Every variant is reported to clients as a bare `401`.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password at login.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password re-entered for a 2FA change did not match.
    #[error("wrong password")]
    WrongPassword,

    /// Token failed signature or expiry checks.
    #[error("invalid token: {0}")]
    Token(#[from] TokenError),

    /// Token verified but carries the wrong payload type.
    #[error("unexpected token type: expected {expected}, got {actual}")]
    WrongTokenType {
        expected: &'static str,
        actual: &'static str,
    },

    /// User not found.
    #[error("user not found")]
    UserNotFound,

    /// TOTP code did not match.
    #[error("invalid TOTP code")]
    InvalidTotpCode,

    /// Two-factor authentication is already configured.
    #[error("two-factor authentication already configured")]
    AlreadyConfigured,

    /// No authenticated session for the request.
    #[error("not authenticated")]
    NotAuthenticated,

    /// Request body could not be read.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Whether this is a server-side failure rather than a rejected request.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Repository(_) | Self::PasswordHash | Self::Token(TokenError::Encode(_))
        )
    }
}

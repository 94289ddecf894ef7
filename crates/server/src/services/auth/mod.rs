//! Authentication service.
//!
//! Provides password login, the TOTP second factor and session issuance.

mod error;
mod two_factor;

pub use error::AuthError;
pub use two_factor::{PendingSetup, TwoFactorStatus};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Serialize;
use tracing::{debug, instrument};

use pulp_core::{BasketId, Email};

use crate::models::{SessionUser, User};
use crate::services::tokens::TokenPayload;
use crate::state::AppState;

/// Credentials handed to the client once fully authenticated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Authentication {
    /// Session token for the `Authorization: Bearer` header.
    pub token: String,
    /// The user's basket.
    pub bid: BasketId,
    /// The user's email.
    pub umail: Email,
}

/// Result of a password login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// No second factor configured; the session is ready.
    Authenticated(Authentication),
    /// The password was right; exchange `tmp_token` and a TOTP code at
    /// `/rest/2fa/verify`.
    SecondFactorRequired { tmp_token: String },
}

/// Authentication service.
///
/// Borrowed from the application state per request.
pub struct AuthService<'a> {
    state: &'a AppState,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .state
            .store()
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)
            .map_err(|_| AuthError::InvalidCredentials)?;

        if user.has_two_factor() {
            debug!(user_id = %user.id, "Password valid, second factor required");
            let tmp_token = self
                .state
                .tokens()
                .authorize(TokenPayload::SecondFactorPending { user_id: user.id })?;
            return Ok(LoginOutcome::SecondFactorRequired { tmp_token });
        }

        self.issue_session(&user).await.map(LoginOutcome::Authenticated)
    }

    /// Start a full session for `user`.
    ///
    /// Assigns the user's basket, signs a session token and caches the
    /// session user under it.
    ///
    /// # Errors
    ///
    /// Returns an error if the basket cannot be loaded or the token cannot be
    /// signed.
    pub async fn issue_session(&self, user: &User) -> Result<Authentication, AuthError> {
        let basket = self.state.store().find_or_create_basket(user.id).await?;

        let mut session_user = SessionUser::from_user(user);
        session_user.basket_id = Some(basket.id);

        let token = self.state.tokens().authorize(TokenPayload::Session {
            data: session_user.claims(),
        })?;
        self.state.sessions().put(token.clone(), session_user).await;

        debug!(user_id = %user.id, basket_id = %basket.id, "Session issued");
        Ok(Authentication {
            token,
            bid: basket.id,
            umail: user.email.clone(),
        })
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::WrongPassword` if the password does not match or the
/// stored hash is unreadable.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::WrongPassword)?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::WrongPassword)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("ncc-1701").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("ncc-1701", &hash).is_ok());
        assert!(matches!(
            verify_password("ncc-1702", &hash),
            Err(AuthError::WrongPassword)
        ));
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }
}

//! Signed tokens handed to clients.
//!
//! Every token is an HS256 JWT. The payload's `type` claim says what the
//! token proves, so a token minted for one step of a flow cannot be replayed
//! at another.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pulp_core::{Email, UserId};

/// Token type marking a password check that still needs the second factor.
pub const SECOND_FACTOR_PENDING: &str = "password_valid_needs_second_factor_token";

/// Token type carrying a TOTP secret that is being set up.
pub const TOTP_SETUP_SECRET: &str = "totp_setup_secret";

/// Token type for a fully authenticated session.
pub const SESSION: &str = "session";

/// Errors from issuing or verifying tokens.
#[derive(Debug, Error)]
pub enum TokenError {
    /// Signing failed.
    #[error("failed to sign token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    /// Signature, expiry or payload shape is invalid.
    #[error("invalid token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
}

/// Identity embedded in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: UserId,
    pub email: Email,
}

/// What a token proves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TokenPayload {
    /// The password was correct; a TOTP code is still required.
    #[serde(rename = "password_valid_needs_second_factor_token")]
    SecondFactorPending {
        #[serde(rename = "userId")]
        user_id: UserId,
    },

    /// A freshly generated TOTP secret awaiting confirmation.
    #[serde(rename = "totp_setup_secret")]
    TotpSetup { secret: String },

    /// A fully authenticated session.
    #[serde(rename = "session")]
    Session { data: SessionClaims },
}

impl TokenPayload {
    /// The `type` claim value.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SecondFactorPending { .. } => SECOND_FACTOR_PENDING,
            Self::TotpSetup { .. } => TOTP_SETUP_SECRET,
            Self::Session { .. } => SESSION,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    payload: TokenPayload,
    iat: i64,
    exp: i64,
}

/// Issues and verifies signed tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenIssuer {
    /// Create an issuer signing with `secret`; tokens live for `ttl`.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            ttl,
        }
    }

    /// Token lifetime.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Sign `payload` into a token.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn authorize(&self, payload: TokenPayload) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            payload,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Encode)
    }

    /// Verify the signature and expiry of `token` and return its payload.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Invalid` for tampered, expired or malformed tokens.
    pub fn verify(&self, token: &str) -> Result<TokenPayload, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.payload)
            .map_err(TokenError::Invalid)
    }
}

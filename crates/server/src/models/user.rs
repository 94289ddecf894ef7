//! User and basket domain types.

use chrono::{DateTime, Utc};

use pulp_core::{BasketId, Email, UserId};

/// A shop account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login email address.
    pub email: Email,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Base32 TOTP secret; empty when two-factor authentication is off.
    pub totp_secret: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether a second factor is required at login.
    #[must_use]
    pub fn has_two_factor(&self) -> bool {
        !self.totp_secret.is_empty()
    }
}

/// Data for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub password_hash: String,
    pub totp_secret: String,
}

/// A user's shopping basket. Each user has at most one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Basket {
    pub id: BasketId,
    pub user_id: UserId,
}

//! Session-related types.

use pulp_core::{BasketId, Email, UserId};

use super::user::User;
use crate::services::tokens::SessionClaims;

/// The account snapshot kept for an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: UserId,
    pub email: Email,
    pub password_hash: String,
    pub totp_secret: String,
    /// The basket assigned at login.
    pub basket_id: Option<BasketId>,
}

impl SessionUser {
    /// Snapshot `user` with no basket assigned yet.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            totp_secret: user.totp_secret.clone(),
            basket_id: None,
        }
    }

    /// The identity claims embedded in this user's session token.
    #[must_use]
    pub fn claims(&self) -> SessionClaims {
        SessionClaims {
            id: self.id,
            email: self.email.clone(),
        }
    }
}

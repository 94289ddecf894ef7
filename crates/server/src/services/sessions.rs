//! Cache of authenticated sessions, keyed by session token.
//!
//! Handlers read the current user from here rather than from the database, so
//! a session sees the account as it was at login, updated only by the
//! two-factor setup and disable operations.

use std::time::Duration;

use axum::http::{HeaderMap, header};
use moka::future::Cache;

use crate::models::session::SessionUser;

/// Upper bound on concurrently cached sessions.
const MAX_SESSIONS: u64 = 10_000;

/// Token → session user map with token-lifetime expiry.
#[derive(Clone)]
pub struct AuthenticatedUsers {
    cache: Cache<String, SessionUser>,
}

impl AuthenticatedUsers {
    /// Create a cache whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_live(ttl)
            .build();
        Self { cache }
    }

    /// Remember `user` as the owner of `token`.
    pub async fn put(&self, token: impl Into<String>, user: SessionUser) {
        self.cache.insert(token.into(), user).await;
    }

    /// The session user for `token`, if any.
    pub async fn get(&self, token: &str) -> Option<SessionUser> {
        self.cache.get(token).await
    }

    /// Replace the cached user for `token` after an account change.
    ///
    /// The basket association is carried over because it is not part of the
    /// stored account.
    pub async fn update(&self, token: &str, mut user: SessionUser) {
        if let Some(previous) = self.cache.get(token).await {
            user.basket_id = user.basket_id.or(previous.basket_id);
        }
        self.cache.insert(token.to_owned(), user).await;
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively and anything other than exactly
/// two space-separated parts is rejected.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let mut parts = value.split(' ');
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}

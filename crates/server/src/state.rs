//! Application state shared across handlers.

use std::sync::Arc;

use crate::challenges::ChallengeTracker;
use crate::config::ShopConfig;
use crate::db::Store;
use crate::services::sessions::AuthenticatedUsers;
use crate::services::tokens::TokenIssuer;
use crate::services::totp::Totp;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ShopConfig,
    store: Arc<dyn Store>,
    tokens: TokenIssuer,
    sessions: AuthenticatedUsers,
    totp: Totp,
    challenges: ChallengeTracker,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Token and session lifetimes both come from `config.token_ttl_secs`.
    #[must_use]
    pub fn new(config: ShopConfig, store: Arc<dyn Store>) -> Self {
        let ttl_secs = config.token_ttl_secs.max(1);
        let tokens = TokenIssuer::new(&config.jwt_secret, chrono::Duration::seconds(ttl_secs));
        let sessions =
            AuthenticatedUsers::new(std::time::Duration::from_secs(ttl_secs.unsigned_abs()));
        let totp = Totp::with_window(config.totp_window);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                tokens,
                sessions,
                totp,
                challenges: ChallengeTracker::new(),
            }),
        }
    }

    /// Get a reference to the shop configuration.
    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.inner.config
    }

    /// Get a reference to the backing store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    /// Get a reference to the token issuer.
    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.inner.tokens
    }

    /// Get a reference to the authenticated-session cache.
    #[must_use]
    pub fn sessions(&self) -> &AuthenticatedUsers {
        &self.inner.sessions
    }

    /// Get a reference to the TOTP verifier.
    #[must_use]
    pub fn totp(&self) -> &Totp {
        &self.inner.totp
    }

    /// Get a reference to the challenge tracker.
    #[must_use]
    pub fn challenges(&self) -> &ChallengeTracker {
        &self.inner.challenges
    }
}

//! Persistence for the shop.
//!
//! # Tables
//!
//! - `users` - Accounts with password hash and TOTP secret
//! - `baskets` - One shopping basket per user
//! - `orders` - Placed orders, products kept as JSONB
//!
//! # Stores
//!
//! Handlers only ever see `Arc<dyn Store>`. [`PgStore`] talks to `PostgreSQL`;
//! [`MemoryStore`] keeps everything in process and is used when no database
//! URL is configured, and by the tests.
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and are embedded in the
//! binary. Run them with:
//! ```bash
//! cargo run -p pulp-cli -- migrate
//! ```

pub mod memory;
pub mod postgres;
pub mod seed;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use pulp_core::{Email, UserId};

use crate::models::{Basket, NewUser, Order, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Storage operations needed by the shop's handlers.
#[async_trait]
pub trait Store: Send + Sync {
    /// Check the backend is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;

    /// Get a user by their ID.
    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError>;

    /// Get a user by their email address.
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError>;

    /// Create a user.
    ///
    /// Fails with [`RepositoryError::Conflict`] if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError>;

    /// Replace a user's TOTP secret. An empty secret turns 2FA off.
    ///
    /// Returns the updated user, or `None` if no such user exists.
    async fn set_totp_secret(
        &self,
        id: UserId,
        secret: &str,
    ) -> Result<Option<User>, RepositoryError>;

    /// Return the user's basket, creating it on first use.
    async fn find_or_create_basket(&self, user_id: UserId) -> Result<Basket, RepositoryError>;

    /// Get an order by its public order number.
    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, RepositoryError>;

    /// Store an order.
    ///
    /// Fails with [`RepositoryError::Conflict`] if the order number is taken.
    async fn create_order(&self, order: &Order) -> Result<(), RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

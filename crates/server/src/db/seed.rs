//! Load seed accounts and orders from YAML.
//!
//! ## YAML Format
//!
//! `users.yml`:
//! ```yaml
//! - email: jim            # local part; the application domain is appended
//!   password: ncc-1701    # plaintext, hashed while seeding
//!   totpSecret: ...       # optional base32 secret
//! ```
//!
//! `orders.yml`:
//! ```yaml
//! - orderId: 5267-f9cd5882f54c75a3
//!   email: admin
//!   totalPrice: 8.96
//!   eta: 3                # optional, days
//!   delivered: false      # optional
//!   products:
//!     - { quantity: 3, id: 1, name: Apple Juice (1000ml), price: 1.99, total: 5.97 }
//! ```
//!
//! Entries that already exist are skipped, so seeding is repeatable.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info, instrument};

use pulp_core::{Email, EmailError, Price};

use super::{RepositoryError, Store};
use crate::models::{NewUser, Order, OrderLine};
use crate::services::auth::{AuthError, hash_password};

/// File name of the account seed inside the seed directory.
pub const USERS_FILE: &str = "users.yml";
/// File name of the order seed inside the seed directory.
pub const ORDERS_FILE: &str = "orders.yml";

/// Errors that can occur while seeding.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid seed email: {0}")]
    Email(#[from] EmailError),

    #[error("password hashing failed")]
    PasswordHash(#[from] AuthError),

    #[error("password hashing task failed")]
    Task(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// A seeded account.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedUser {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub totp_secret: String,
}

/// A seeded order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedOrder {
    pub order_id: String,
    pub email: String,
    pub total_price: Price,
    pub products: Vec<OrderLine>,
    #[serde(default)]
    pub bonus: i32,
    #[serde(default)]
    pub eta: Option<u32>,
    #[serde(default)]
    pub delivered: bool,
}

/// Counts from a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedResult {
    pub inserted: u64,
    pub skipped: u64,
}

impl std::ops::AddAssign for SeedResult {
    fn add_assign(&mut self, rhs: Self) {
        self.inserted += rhs.inserted;
        self.skipped += rhs.skipped;
    }
}

/// Seed users and orders from `users.yml` and `orders.yml` in `dir`.
///
/// # Errors
///
/// Returns an error if a file cannot be read or parsed, or if the store fails.
#[instrument(skip(store), fields(dir = %dir.display()))]
pub async fn seed_from_dir(
    store: &dyn Store,
    dir: &Path,
    domain: &str,
) -> Result<SeedResult, SeedError> {
    let users: Vec<SeedUser> = serde_yaml::from_str(&read(&dir.join(USERS_FILE)).await?)?;
    let orders: Vec<SeedOrder> = serde_yaml::from_str(&read(&dir.join(ORDERS_FILE)).await?)?;

    let mut result = seed_users(store, users, domain).await?;
    result += seed_orders(store, orders, domain).await?;

    info!(
        inserted = result.inserted,
        skipped = result.skipped,
        "Seeding complete"
    );
    Ok(result)
}

/// Insert accounts, hashing their passwords.
///
/// # Errors
///
/// Returns an error if an email is invalid, hashing fails, or the store fails.
pub async fn seed_users(
    store: &dyn Store,
    users: Vec<SeedUser>,
    domain: &str,
) -> Result<SeedResult, SeedError> {
    let mut result = SeedResult::default();

    for user in users {
        let email = Email::with_domain(&user.email, domain)?;
        let password = user.password;
        let password_hash =
            tokio::task::spawn_blocking(move || hash_password(&password)).await??;

        let new_user = NewUser {
            email,
            password_hash,
            totp_secret: user.totp_secret,
        };
        match store.create_user(new_user).await {
            Ok(created) => {
                debug!(email = %created.email, "Seeded user");
                result.inserted += 1;
            }
            Err(RepositoryError::Conflict(_)) => result.skipped += 1,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(result)
}

/// Insert orders.
///
/// # Errors
///
/// Returns an error if an email is invalid or the store fails.
pub async fn seed_orders(
    store: &dyn Store,
    orders: Vec<SeedOrder>,
    domain: &str,
) -> Result<SeedResult, SeedError> {
    let mut result = SeedResult::default();

    for seed in orders {
        let order = Order {
            email: Email::with_domain(&seed.email, domain)?.into_inner(),
            order_id: seed.order_id,
            total_price: seed.total_price,
            products: seed.products,
            bonus: seed.bonus,
            eta: seed.eta,
            delivered: seed.delivered,
        };
        match store.create_order(&order).await {
            Ok(()) => {
                debug!(order_id = %order.order_id, "Seeded order");
                result.inserted += 1;
            }
            Err(RepositoryError::Conflict(_)) => result.skipped += 1,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(result)
}

async fn read(path: &Path) -> Result<String, SeedError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    const USERS: &str = r"
- email: jim
  password: ncc-1701
- email: wurstbrot
  password: EinBelegtesBrotMitSchinkenSCHINKEN!
  totpSecret: IFTXE3SPOEYVURT2MRYGI52TKJ4HC3KH
";

    const ORDERS: &str = r"
- orderId: 5267-f9cd5882f54c75a3
  email: jim
  totalPrice: 1.99
  eta: 3
  products:
    - quantity: 1
      id: 1
      name: Apple Juice (1000ml)
      price: 1.99
      total: 1.99
";

    #[test]
    fn test_parse_seed_files() {
        let users: Vec<SeedUser> = serde_yaml::from_str(USERS).unwrap();
        assert_eq!(users.len(), 2);
        assert!(users[0].totp_secret.is_empty());
        assert_eq!(users[1].totp_secret, "IFTXE3SPOEYVURT2MRYGI52TKJ4HC3KH");

        let orders: Vec<SeedOrder> = serde_yaml::from_str(ORDERS).unwrap();
        assert_eq!(orders[0].eta, Some(3));
        assert!(!orders[0].delivered);
        assert_eq!(orders[0].products[0].bonus, 0);
    }

    #[tokio::test]
    async fn test_seeding_twice_skips_existing() {
        let store = MemoryStore::new();
        let users = || serde_yaml::from_str::<Vec<SeedUser>>(USERS).unwrap();
        let orders = || serde_yaml::from_str::<Vec<SeedOrder>>(ORDERS).unwrap();

        let first = seed_users(&store, users(), "pulp-sh.op").await.unwrap();
        assert_eq!(first, SeedResult { inserted: 2, skipped: 0 });
        let second = seed_users(&store, users(), "pulp-sh.op").await.unwrap();
        assert_eq!(second, SeedResult { inserted: 0, skipped: 2 });

        seed_orders(&store, orders(), "pulp-sh.op").await.unwrap();
        let order = store
            .find_order("5267-f9cd5882f54c75a3")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.email, "jim@pulp-sh.op");
    }

    #[tokio::test]
    async fn test_seeded_password_is_hashed() {
        let store = MemoryStore::new();
        let users = serde_yaml::from_str::<Vec<SeedUser>>(USERS).unwrap();
        seed_users(&store, users, "pulp-sh.op").await.unwrap();

        let email = Email::parse("jim@pulp-sh.op").unwrap();
        let jim = store.find_user_by_email(&email).await.unwrap().unwrap();
        assert!(jim.password_hash.starts_with("$argon2"));
        assert!(crate::services::auth::verify_password("ncc-1701", &jim.password_hash).is_ok());
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let store = MemoryStore::new();
        let err = seed_from_dir(&store, Path::new("/nonexistent"), "pulp-sh.op")
            .await
            .unwrap_err();
        let SeedError::Io { path, source } = err else {
            panic!("expected io error");
        };
        assert_eq!(path, Path::new("/nonexistent/users.yml"));
        assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn test_hashing_error_keeps_source() {
        let err = SeedError::from(AuthError::PasswordHash);
        assert!(matches!(err, SeedError::PasswordHash(AuthError::PasswordHash)));
        assert!(std::error::Error::source(&err).is_some());
    }
}

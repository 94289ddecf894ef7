//! In-process store.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use pulp_core::{BasketId, Email, UserId};

use super::{RepositoryError, Store};
use crate::models::{Basket, NewUser, Order, User};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<UserId, User>,
    baskets: HashMap<UserId, Basket>,
    orders: HashMap<String, Order>,
    last_user_id: i32,
    last_basket_id: i32,
}

/// A [`Store`] backed by maps behind a single lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| &u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        tables.last_user_id += 1;
        let now = Utc::now();
        let created = User {
            id: UserId::new(tables.last_user_id),
            email: user.email,
            password_hash: user.password_hash,
            totp_secret: user.totp_secret,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn set_totp_secret(
        &self,
        id: UserId,
        secret: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(&id).map(|user| {
            secret.clone_into(&mut user.totp_secret);
            user.updated_at = Utc::now();
            user.clone()
        }))
    }

    async fn find_or_create_basket(&self, user_id: UserId) -> Result<Basket, RepositoryError> {
        let mut tables = self.tables.write().await;
        if let Some(basket) = tables.baskets.get(&user_id) {
            return Ok(*basket);
        }

        tables.last_basket_id += 1;
        let basket = Basket {
            id: BasketId::new(tables.last_basket_id),
            user_id,
        };
        tables.baskets.insert(user_id, basket);
        Ok(basket)
    }

    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, RepositoryError> {
        Ok(self.tables.read().await.orders.get(order_id).cloned())
    }

    async fn create_order(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if tables.orders.contains_key(&order.order_id) {
            return Err(RepositoryError::Conflict("order already exists".to_owned()));
        }
        tables.orders.insert(order.order_id.clone(), order.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
            totp_secret: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = MemoryStore::new();
        let created = store.create_user(new_user("jim@pulp-sh.op")).await.unwrap();

        let by_id = store.find_user(created.id).await.unwrap().unwrap();
        let by_email = store
            .find_user_by_email(&created.email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_id, created);
        assert_eq!(by_email, created);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("jim@pulp-sh.op")).await.unwrap();

        let err = store
            .create_user(new_user("jim@pulp-sh.op"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_set_totp_secret() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("jim@pulp-sh.op")).await.unwrap();

        let updated = store
            .set_totp_secret(user.id, "IFTXE3SPOEYVURT2")
            .await
            .unwrap()
            .unwrap();
        assert!(updated.has_two_factor());

        let missing = store.set_totp_secret(UserId::new(99), "").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_basket_is_created_once() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("jim@pulp-sh.op")).await.unwrap();

        let first = store.find_or_create_basket(user.id).await.unwrap();
        let second = store.find_or_create_basket(user.id).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.user_id, user.id);
    }
}

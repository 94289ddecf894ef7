//! `PostgreSQL` store.
//!
//! Queries are checked at runtime so the crate builds without a live
//! database; rows are decoded into `*Row` structs and validated into domain
//! types here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use pulp_core::{BasketId, Email, Price, UserId};

use super::{RepositoryError, Store};
use crate::models::{Basket, NewUser, Order, OrderLine, User};

/// A [`Store`] backed by a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    email: String,
    password_hash: String,
    totp_secret: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            email,
            password_hash: row.password_hash,
            totp_secret: row.totp_secret,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BasketRow {
    id: BasketId,
    user_id: UserId,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    order_id: String,
    email: String,
    total_price: Price,
    products: Json<Vec<OrderLine>>,
    bonus: i32,
    eta: Option<i32>,
    delivered: bool,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let eta = row
            .eta
            .map(u32::try_from)
            .transpose()
            .map_err(|_| RepositoryError::DataCorruption("negative eta in database".to_owned()))?;

        Ok(Self {
            order_id: row.order_id,
            email: row.email,
            total_price: row.total_price,
            products: row.products.0,
            bonus: row.bonus,
            eta,
            delivered: row.delivered,
        })
    }
}

fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

const USER_COLUMNS: &str = "id, email, password_hash, totp_secret, created_at, updated_at";

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
                .bind(email.as_str())
                .fetch_optional(&self.pool)
                .await?;

        row.map(User::try_from).transpose()
    }

    async fn create_user(&self, user: NewUser) -> Result<User, RepositoryError> {
        let row: UserRow = sqlx::query_as(&format!(
            r"
            INSERT INTO users (email, password_hash, totp_secret)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.totp_secret)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "email"))?;

        User::try_from(row)
    }

    async fn set_totp_secret(
        &self,
        id: UserId,
        secret: &str,
    ) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            r"
            UPDATE users
            SET totp_secret = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(id)
        .bind(secret)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn find_or_create_basket(&self, user_id: UserId) -> Result<Basket, RepositoryError> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let row: BasketRow = sqlx::query_as(
            r"
            INSERT INTO baskets (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
            RETURNING id, user_id
            ",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Basket {
            id: row.id,
            user_id: row.user_id,
        })
    }

    async fn find_order(&self, order_id: &str) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(
            r"
            SELECT order_id, email, total_price, products, bonus, eta, delivered
            FROM orders
            WHERE order_id = $1
            ",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Order::try_from).transpose()
    }

    async fn create_order(&self, order: &Order) -> Result<(), RepositoryError> {
        let eta = order
            .eta
            .map(i32::try_from)
            .transpose()
            .map_err(|_| RepositoryError::DataCorruption("eta out of range".to_owned()))?;

        sqlx::query(
            r"
            INSERT INTO orders (order_id, email, total_price, products, bonus, eta, delivered)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(&order.order_id)
        .bind(&order.email)
        .bind(order.total_price)
        .bind(Json(&order.products))
        .bind(order.bonus)
        .bind(eta)
        .bind(order.delivered)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "order"))?;

        Ok(())
    }
}

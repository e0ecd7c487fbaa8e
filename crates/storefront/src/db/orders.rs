//! Order and line item repository.
//!
//! Orders are insert-only. The insert functions take a connection because
//! they only ever run inside the checkout transaction.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};

use cafego_core::{LineItemId, OrderId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{LineItem, Order};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    created_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct LineItemRow {
    id: LineItemId,
    order_id: OrderId,
    product_id: ProductId,
    product_name: String,
    quantity: i64,
}

impl From<LineItemRow> for LineItem {
    fn from(row: LineItemRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
        }
    }
}

/// Repository for order history.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List a user's orders, newest first, with their line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        let orders = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, created_at
            FROM orders
            WHERE user_id = ?
            ORDER BY id DESC
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        let lines = sqlx::query_as::<_, LineItemRow>(
            r"
            SELECT l.id, l.order_id, l.product_id, p.name AS product_name, l.quantity
            FROM line_items l
            INNER JOIN orders o ON o.id = l.order_id
            INNER JOIN products p ON p.id = l.product_id
            WHERE o.user_id = ?
            ORDER BY l.id
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<LineItem>> = HashMap::new();
        for line in lines {
            by_order
                .entry(line.order_id)
                .or_default()
                .push(LineItem::from(line));
        }

        Ok(orders
            .into_iter()
            .map(|row| Order {
                line_items: by_order.remove(&row.id).unwrap_or_default(),
                id: row.id,
                user_id: row.user_id,
                created_at: row.created_at,
            })
            .collect())
    }

    /// Get one order owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;

        let order = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, user_id, created_at
            FROM orders
            WHERE id = ? AND user_id = ?
            ",
        )
        .bind(order_id)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, LineItemRow>(
            r"
            SELECT l.id, l.order_id, l.product_id, p.name AS product_name, l.quantity
            FROM line_items l
            INNER JOIN products p ON p.id = l.product_id
            WHERE l.order_id = ?
            ORDER BY l.id
            ",
        )
        .bind(order.id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(Some(Order {
            id: order.id,
            user_id: order.user_id,
            created_at: order.created_at,
            line_items: lines.into_iter().map(LineItem::from).collect(),
        }))
    }

    /// Count every order in the database.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert an order header on the given connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_order(
        conn: &mut SqliteConnection,
        user_id: UserId,
        created_at: DateTime<Utc>,
    ) -> Result<OrderId, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO orders (user_id, created_at)
            VALUES (?, ?)
            ",
        )
        .bind(user_id)
        .bind(created_at)
        .execute(&mut *conn)
        .await?;

        Ok(OrderId::new(result.last_insert_rowid()))
    }

    /// Insert a line item on the given connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_line_item(
        conn: &mut SqliteConnection,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<LineItemId, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO line_items (order_id, product_id, quantity)
            VALUES (?, ?, ?)
            ",
        )
        .bind(order_id)
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

        Ok(LineItemId::new(result.last_insert_rowid()))
    }
}

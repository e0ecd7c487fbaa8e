//! Cart line repository.
//!
//! Every add creates a new row; nothing here merges lines for the same
//! product. Reads and deletes used by checkout take a connection so they run
//! inside the checkout transaction.

use sqlx::{SqliteConnection, SqlitePool};

use cafego_core::{CartItemId, ProductId, UserId};

use super::RepositoryError;
use crate::models::CartItem;

#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    id: CartItemId,
    user_id: UserId,
    product_id: ProductId,
    quantity: i64,
    product_name: String,
}

impl From<CartItemRow> for CartItem {
    fn from(row: CartItemRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            quantity: row.quantity,
            product_name: row.product_name,
        }
    }
}

/// Repository for cart lines.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a cart line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product or user does not exist
    /// (foreign key violation).
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartItemId, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO cart_items (user_id, product_id, quantity)
            VALUES (?, ?, ?)
            ",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(CartItemId::new(result.last_insert_rowid()))
    }

    /// List a user's cart lines in the order they were added.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<CartItem>, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::list_for_user_in(&mut conn, user_id).await
    }

    /// Delete the given lines owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a delete fails.
    pub async fn delete_lines(
        &self,
        user_id: UserId,
        ids: &[CartItemId],
    ) -> Result<u64, RepositoryError> {
        let mut tx = super::begin_immediate(self.pool).await?;
        let removed = Self::delete_lines_in(&mut tx, user_id, ids).await?;
        tx.commit().await?;
        Ok(removed)
    }

    /// List a user's cart lines on the given connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user_in(
        conn: &mut SqliteConnection,
        user_id: UserId,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r"
            SELECT c.id, c.user_id, c.product_id, c.quantity, p.name AS product_name
            FROM cart_items c
            INNER JOIN products p ON p.id = c.product_id
            WHERE c.user_id = ?
            ORDER BY c.id
            ",
        )
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    /// Delete lines by id on the given connection.
    ///
    /// Ids that are already gone, or that belong to another user, are
    /// skipped. Returns the number of rows actually removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a delete fails.
    pub async fn delete_lines_in(
        conn: &mut SqliteConnection,
        user_id: UserId,
        ids: &[CartItemId],
    ) -> Result<u64, RepositoryError> {
        let mut removed = 0;
        for &id in ids {
            let result = sqlx::query("DELETE FROM cart_items WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .execute(&mut *conn)
                .await?;
            removed += result.rows_affected();
        }
        Ok(removed)
    }
}

//! Cart ledger.
//!
//! A user's cart is a list of independent lines. Adding a product that is
//! already in the cart appends another line instead of bumping the first
//! one's quantity.

use sqlx::{SqliteConnection, SqlitePool};
use thiserror::Error;
use tracing::instrument;

use cafego_core::{CartItemId, ProductId, UserId};

use crate::db::RepositoryError;
use crate::db::cart::CartRepository;
use crate::models::{CartItem, User};
use crate::services::catalog::Catalog;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product id does not name a catalog entry.
    #[error("unknown product: {0}")]
    InvalidReference(ProductId),

    /// Quantity was zero or negative.
    #[error("quantity must be positive (got {0})")]
    InvalidQuantity(i64),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Per-user cart ledger.
pub struct CartLedger<'a> {
    catalog: Catalog<'a>,
    lines: CartRepository<'a>,
}

impl<'a> CartLedger<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            catalog: Catalog::new(pool),
            lines: CartRepository::new(pool),
        }
    }

    /// Append a new line for `product_id` to the user's cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `quantity <= 0`.
    /// Returns `CartError::InvalidReference` if the product does not exist.
    /// Returns `CartError::Repository` if storage fails.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn add_item(
        &self,
        user: &User,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<CartItem, CartError> {
        if quantity <= 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or(CartError::InvalidReference(product_id))?;

        let id = self
            .lines
            .insert(user.id, product.id, quantity)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CartError::InvalidReference(product_id),
                other => CartError::Repository(other),
            })?;

        tracing::debug!(cart_item_id = %id, "cart line added");

        Ok(CartItem {
            id,
            user_id: user.id,
            product_id: product.id,
            quantity,
            product_name: product.name,
        })
    }

    /// The user's cart lines in the order they were added.
    ///
    /// An empty cart is an empty list.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if storage fails.
    pub async fn list_items(&self, user: &User) -> Result<Vec<CartItem>, CartError> {
        Ok(self.lines.list_for_user(user.id).await?)
    }

    /// Remove the given lines from the user's cart.
    ///
    /// Ids that are already gone are skipped, so repeating a call is harmless.
    /// Returns how many lines were actually removed.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if storage fails.
    #[instrument(skip(self, user, item_ids), fields(user_id = %user.id, count = item_ids.len()))]
    pub async fn remove_all(&self, user: &User, item_ids: &[CartItemId]) -> Result<u64, CartError> {
        Ok(self.lines.delete_lines(user.id, item_ids).await?)
    }

    /// Read the user's cart inside the caller's transaction.
    pub(crate) async fn snapshot(
        conn: &mut SqliteConnection,
        user_id: UserId,
    ) -> Result<Vec<CartItem>, RepositoryError> {
        CartRepository::list_for_user_in(conn, user_id).await
    }

    /// Remove lines inside the caller's transaction.
    pub(crate) async fn remove_all_in(
        conn: &mut SqliteConnection,
        user_id: UserId,
        item_ids: &[CartItemId],
    ) -> Result<u64, RepositoryError> {
        CartRepository::delete_lines_in(conn, user_id, item_ids).await
    }
}

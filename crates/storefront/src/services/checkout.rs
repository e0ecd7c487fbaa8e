//! Checkout engine.
//!
//! Turns a user's cart into an order. Snapshotting the cart, writing the
//! order and its line items, and removing the snapshotted lines all happen in
//! one transaction: either every effect commits or none does. Dropping the
//! transaction on an error path rolls it back.
//!
//! Line items are built from the snapshot, not re-read, and lines are removed
//! by their own id, so a line added after the snapshot stays in the cart.
//! The transaction takes the write lock before the snapshot, so a concurrent
//! add lands wholly before or wholly after it, and a second checkout for the
//! same user waits for the first and then finds an empty cart.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;

use cafego_core::{CartItemId, OrderId};

use crate::db::{self, RepositoryError};
use crate::db::orders::OrderRepository;
use crate::models::{Order, User};
use crate::services::cart::CartLedger;

/// Result of a checkout that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// An order was created and the cart emptied of its lines.
    Placed(OrderId),
    /// The cart was empty; nothing was written.
    NoItems,
}

impl CheckoutOutcome {
    /// The new order id, if one was created.
    #[must_use]
    pub const fn order_id(self) -> Option<OrderId> {
        match self {
            Self::Placed(id) => Some(id),
            Self::NoItems => None,
        }
    }
}

/// Errors that abort a checkout. Nothing is committed when one is returned.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The database could not be reached (pool exhausted or closed, I/O failure).
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] RepositoryError),

    /// A statement or the commit failed; the transaction was rolled back.
    #[error("checkout transaction failed: {0}")]
    TransactionFailed(#[source] RepositoryError),
}

impl From<RepositoryError> for CheckoutError {
    fn from(e: RepositoryError) -> Self {
        if e.is_unavailable() {
            Self::StorageUnavailable(e)
        } else {
            Self::TransactionFailed(e)
        }
    }
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self {
        Self::from(RepositoryError::from(e))
    }
}

/// Checkout engine and order history.
pub struct CheckoutEngine<'a> {
    pool: &'a SqlitePool,
    orders: OrderRepository<'a>,
}

impl<'a> CheckoutEngine<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            pool,
            orders: OrderRepository::new(pool),
        }
    }

    /// Convert the user's current cart into an order.
    ///
    /// Returns `CheckoutOutcome::NoItems` for an empty cart without creating
    /// an order, so a second checkout right after the first is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::StorageUnavailable` or
    /// `CheckoutError::TransactionFailed`; in both cases no order exists and
    /// the cart is untouched.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn checkout(&self, user: &User) -> Result<CheckoutOutcome, CheckoutError> {
        let mut tx = db::begin_immediate(self.pool).await?;

        let snapshot = CartLedger::snapshot(&mut tx, user.id).await?;
        if snapshot.is_empty() {
            tx.rollback().await?;
            tracing::debug!("cart empty, nothing to check out");
            return Ok(CheckoutOutcome::NoItems);
        }

        let order_id = OrderRepository::insert_order(&mut tx, user.id, Utc::now()).await?;

        for line in &snapshot {
            OrderRepository::insert_line_item(&mut tx, order_id, line.product_id, line.quantity)
                .await?;
        }

        let ids: Vec<CartItemId> = snapshot.iter().map(|line| line.id).collect();
        let removed = CartLedger::remove_all_in(&mut tx, user.id, &ids).await?;
        if usize::try_from(removed).ok() != Some(ids.len()) {
            // Rolled back on drop.
            return Err(CheckoutError::TransactionFailed(RepositoryError::Conflict(
                format!(
                    "cart changed during checkout: removed {removed} of {} lines",
                    ids.len()
                ),
            )));
        }

        tx.commit().await?;

        tracing::info!(order_id = %order_id, lines = snapshot.len(), "order placed");
        Ok(CheckoutOutcome::Placed(order_id))
    }

    /// The user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn orders_for(&self, user: &User) -> Result<Vec<Order>, RepositoryError> {
        self.orders.list_for_user(user.id).await
    }

    /// One of the user's orders. Orders of other users are `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn order(
        &self,
        user: &User,
        order_id: OrderId,
    ) -> Result<Option<Order>, RepositoryError> {
        self.orders.get_for_user(user.id, order_id).await
    }
}

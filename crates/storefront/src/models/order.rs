//! Order history types.
//!
//! Orders and their line items are written once by checkout and never
//! updated or deleted.

use chrono::{DateTime, Utc};
use serde::Serialize;

use cafego_core::{LineItemId, OrderId, ProductId, UserId};

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub line_items: Vec<LineItem>,
}

impl Order {
    /// Total number of units across all line items.
    #[must_use]
    pub fn total_quantity(&self) -> i64 {
        self.line_items.iter().map(|line| line.quantity).sum()
    }
}

/// Snapshot of a cart line captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: LineItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
}

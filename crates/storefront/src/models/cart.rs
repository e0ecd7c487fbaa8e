//! Cart line types.

use serde::Serialize;

use cafego_core::{CartItemId, ProductId, UserId};

/// One line in a user's cart, joined with the product name for display.
///
/// Adding the same product twice yields two lines; lines are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(skip)]
    pub user_id: UserId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub product_name: String,
}

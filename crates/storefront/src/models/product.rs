//! Catalog product.

use serde::Serialize;

use cafego_core::{Price, ProductId};

/// A catalog entry. Seeded at startup, read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Price in cents.
    pub price: Price,
    pub description: String,
}

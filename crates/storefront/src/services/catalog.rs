//! Read-only product catalog.

use sqlx::SqlitePool;

use cafego_core::ProductId;

use crate::db::RepositoryError;
use crate::db::products::ProductRepository;
use crate::models::Product;

/// Catalog of products for sale.
pub struct Catalog<'a> {
    products: ProductRepository<'a>,
}

impl<'a> Catalog<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            products: ProductRepository::new(pool),
        }
    }

    /// All products in seed order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.products.list().await
    }

    /// One product, or `None` if the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        self.products.get(id).await
    }
}

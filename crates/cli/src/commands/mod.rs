//! Command implementations.
//!
//! Every command opens the database named by the storefront configuration
//! and applies pending migrations before doing its work.

pub mod migrate;
pub mod orders;
pub mod seed;
pub mod sessions;
pub mod users;

use sqlx::SqlitePool;
use thiserror::Error;

use cafego_storefront::config::{ConfigError, StorefrontConfig};
use cafego_storefront::db::{self, RepositoryError};
use cafego_storefront::services::{AuthError, SeedError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Storage error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("User error: {0}")]
    Auth(#[from] AuthError),

    #[error("Seed error: {0}")]
    Seed(#[from] SeedError),
}

/// Open the configured database and bring its schema up to date.
async fn connect() -> Result<SqlitePool, CommandError> {
    let config = StorefrontConfig::from_env()?;

    tracing::debug!("Connecting to database...");
    let pool = db::create_pool(&config.database_url, config.pool).await?;
    db::migrate(&pool).await?;

    Ok(pool)
}

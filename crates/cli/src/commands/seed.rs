//! Seed command.

use cafego_storefront::services::seed_defaults;

use super::{CommandError, connect};

/// Insert the default users and products into empty tables.
///
/// Tables that already hold rows are left alone.
///
/// # Errors
///
/// Returns `CommandError` if the database cannot be opened or seeding fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;
    let report = seed_defaults(&pool).await?;

    if report.is_empty() {
        tracing::info!("Database already seeded; nothing to do");
    } else {
        tracing::info!(
            users = report.users,
            products = report.products,
            "Seed complete"
        );
    }

    pool.close().await;
    Ok(())
}

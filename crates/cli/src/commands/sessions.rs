//! Session maintenance commands.

use cafego_storefront::services::SessionRegistry;

use super::{CommandError, connect};

/// Delete sessions whose expiry has passed.
///
/// Sessions without an expiry are never removed.
///
/// # Errors
///
/// Returns `CommandError::Repository` if the delete fails.
pub async fn prune() -> Result<(), CommandError> {
    let pool = connect().await?;
    let removed = SessionRegistry::new(&pool).prune_expired().await?;
    tracing::info!(removed, "Expired sessions pruned");

    pool.close().await;
    Ok(())
}

//! User management commands.

use cafego_storefront::services::CredentialStore;

use super::{CommandError, connect};

/// Create a new user.
///
/// # Errors
///
/// Returns `CommandError::Auth` if the username is invalid or taken, or the
/// password is empty.
pub async fn add(username: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let user = CredentialStore::new(&pool)
        .register(username, password)
        .await?;

    tracing::info!(user_id = %user.id, username = %user.username, "User created");

    pool.close().await;
    Ok(())
}

//! Database operations for the storefront SQLite database.
//!
//! ## Tables
//!
//! - `users` - Login credentials (Argon2 password hashes)
//! - `products` - Read-only catalog, seeded on first boot
//! - `sessions` - Session tokens issued at login
//! - `cart_items` - Per-user cart lines
//! - `orders` - Placed orders
//! - `line_items` - Cart line snapshots captured at checkout
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/`, embedded at
//! compile time, and run on startup or via:
//! ```bash
//! cargo run -p cafego-cli -- migrate
//! ```
//!
//! # Transactions
//!
//! Repository methods taking `&self` run against the pool. Associated
//! functions taking `&mut SqliteConnection` run inside whatever transaction
//! the caller holds; checkout is built from those.
//!
//! Transactions that read and then write start with [`begin_immediate`].

pub mod cart;
pub mod orders;
pub mod products;
pub mod sessions;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::{Sqlite, SqlitePool, Transaction};
use sqlx::migrate::MigrateError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use cart::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use sessions::SessionRepository;
pub use users::UserRepository;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Whether the storage itself could not be reached, as opposed to a
    /// statement failing against a live database.
    #[must_use]
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Database(
                sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::Io(_)
                    | sqlx::Error::WorkerCrashed
            )
        )
    }
}

/// Connection pool settings.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

/// Create a SQLite connection pool.
///
/// The database file is created if missing. Connections use WAL journaling
/// and enforce foreign keys.
///
/// # Arguments
///
/// * `database_url` - SQLite connection string (wrapped in `SecretString`)
/// * `settings` - Pool size and acquire timeout
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is invalid or the connection cannot be established.
pub async fn create_pool(
    database_url: &SecretString,
    settings: PoolSettings,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);

    SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_with(options)
        .await
}

/// Create a pool backed by a private in-memory database.
///
/// An in-memory database lives and dies with its connection, so the pool
/// holds exactly one connection and never reaps it.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
}

/// Run the embedded migrations.
///
/// # Errors
///
/// Returns `MigrateError` if a migration fails or the applied history
/// does not match the embedded files.
pub async fn migrate(pool: &SqlitePool) -> Result<(), MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Start a transaction that holds the write lock from its first statement.
///
/// A deferred transaction that reads before it writes cannot wait for the
/// lock: under WAL the upgrade fails with `SQLITE_BUSY` as soon as another
/// writer got there first. Taking the lock up front queues competing writers
/// on `busy_timeout` instead, so they run one after the other.
///
/// # Errors
///
/// Returns `sqlx::Error` if no connection is available or the lock is not
/// granted within the busy timeout.
pub async fn begin_immediate(
    pool: &SqlitePool,
) -> Result<Transaction<'static, Sqlite>, sqlx::Error> {
    pool.begin_with("BEGIN IMMEDIATE").await
}

/// Check that the database answers queries.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the ping fails.
pub async fn ping(pool: &SqlitePool) -> Result<(), RepositoryError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Map a sqlx error, turning unique violations into `Conflict`.
fn conflict_on_unique(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_unavailable() {
        assert!(RepositoryError::Database(sqlx::Error::PoolTimedOut).is_unavailable());
        assert!(RepositoryError::Database(sqlx::Error::PoolClosed).is_unavailable());
    }

    #[test]
    fn test_statement_errors_are_not_unavailable() {
        assert!(!RepositoryError::Database(sqlx::Error::RowNotFound).is_unavailable());
        assert!(!RepositoryError::NotFound.is_unavailable());
        assert!(!RepositoryError::Conflict("x".to_owned()).is_unavailable());
    }

    #[tokio::test]
    async fn test_in_memory_pool_migrates() {
        let pool = connect_in_memory().await.expect("pool");
        migrate(&pool).await.expect("migrations");
        ping(&pool).await.expect("ping");
    }
}

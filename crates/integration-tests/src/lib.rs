//! Shared fixtures for CafeGo integration tests.
//!
//! Every test gets its own private in-memory database, migrated and seeded
//! with the default users and catalog:
//!
//! | id | user      | password  |
//! |----|-----------|-----------|
//! | 1  | `zagreus` | `cerberus`|
//! | 2  | `melinoe` | `b4d3ec1` |
//!
//! | id | product    | price |
//! |----|------------|-------|
//! | 1  | Americano  | 100   |
//! | 2  | Cappuccino | 110   |
//! | 3  | Espresso   | 90    |
//! | 4  | Macchiato  | 120   |
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p cafego-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::path::PathBuf;

use axum::Router;
use secrecy::SecretString;
use sqlx::SqlitePool;

use cafego_storefront::config::StorefrontConfig;
use cafego_storefront::db::{self, PoolSettings};
use cafego_storefront::models::User;
use cafego_storefront::services::{CredentialStore, SessionRegistry, seed_defaults};
use cafego_storefront::state::AppState;

/// Migrated and seeded in-memory pool.
pub async fn test_pool() -> SqlitePool {
    let pool = db::connect_in_memory()
        .await
        .expect("failed to open in-memory database");
    prepare(&pool).await;
    pool
}

/// A file-backed database with several connections, for tests that need
/// real concurrent access. The files are removed when the guard drops.
pub struct FileDatabase {
    pub pool: SqlitePool,
    path: PathBuf,
}

impl FileDatabase {
    pub async fn open(max_connections: u32) -> Self {
        let path = std::env::temp_dir().join(format!("cafego-test-{}.db", uuid::Uuid::new_v4()));
        let url = format!("sqlite://{}", path.display());
        let settings = PoolSettings {
            max_connections,
            ..PoolSettings::default()
        };

        let pool = db::create_pool(&SecretString::from(url), settings)
            .await
            .expect("failed to open file database");
        prepare(&pool).await;

        Self { pool, path }
    }
}

impl Drop for FileDatabase {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let mut file = self.path.clone().into_os_string();
            file.push(suffix);
            let _ = std::fs::remove_file(file);
        }
    }
}

async fn prepare(pool: &SqlitePool) {
    db::migrate(pool).await.expect("failed to migrate");
    seed_defaults(pool).await.expect("failed to seed");
}

/// Look up a seeded user by name.
pub async fn user(pool: &SqlitePool, username: &str) -> User {
    CredentialStore::new(pool)
        .get_user_by_username(username)
        .await
        .expect("seeded user missing")
}

/// Configuration for router tests. Nothing is read from the environment.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig::from_lookup(|key| match key {
        "CAFEGO_DATABASE_URL" => Some("sqlite::memory:".to_string()),
        _ => None,
    })
    .expect("test config is valid")
}

/// Router over a fresh seeded database, plus the pool behind it.
pub async fn test_app() -> (Router, SqlitePool) {
    let pool = test_pool().await;
    let state = AppState::new(test_config(), pool.clone());
    (cafego_storefront::app(state), pool)
}

/// A `Cookie` header value carrying a fresh session for `username`.
pub async fn session_cookie(pool: &SqlitePool, username: &str) -> String {
    let user = user(pool, username).await;
    let token = SessionRegistry::new(pool)
        .create_session(&user)
        .await
        .expect("failed to create session");
    format!("cafego_session={}", token.as_str())
}

//! User repository for database operations.
//!
//! Password hashes are only ever returned alongside the user by
//! [`UserRepository::get_password_hash`]; every other query leaves them out.

use sqlx::{SqliteConnection, SqlitePool};

use cafego_core::{UserId, Username};

use super::{RepositoryError, conflict_on_unique};
use crate::models::User;

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: row.id,
            username,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CredentialRow {
    id: UserId,
    username: String,
    password_hash: String,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username
            FROM users
            WHERE id = ?
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user by exact (case-sensitive) username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT id, username
            FROM users
            WHERE username = ?
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user together with their stored password hash.
    ///
    /// If several rows share the username the oldest one wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            r"
            SELECT id, username, password_hash
            FROM users
            WHERE username = ?
            ORDER BY id
            LIMIT 1
            ",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|r| {
            let user = User::try_from(UserRow {
                id: r.id,
                username: r.username,
            })?;
            Ok((user, r.password_hash))
        })
        .transpose()
    }

    /// Create a new user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::insert(&mut conn, username, password_hash).await
    }

    /// Count stored users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let mut conn = self.pool.acquire().await?;
        Self::count_in(&mut conn).await
    }

    /// Insert a user on the given connection (usually inside a transaction).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    pub async fn insert(
        conn: &mut SqliteConnection,
        username: &Username,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO users (username, password_hash)
            VALUES (?, ?)
            ",
        )
        .bind(username.as_str())
        .bind(password_hash)
        .execute(&mut *conn)
        .await
        .map_err(|e| conflict_on_unique(e, "username"))?;

        Ok(User {
            id: UserId::new(result.last_insert_rowid()),
            username: username.clone(),
        })
    }

    /// Count stored users on the given connection.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_in(conn: &mut SqliteConnection) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }
}

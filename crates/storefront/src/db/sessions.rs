//! Session repository.
//!
//! Sessions are permanent unless an expiry was recorded when they were
//! issued. Expired rows are filtered by the caller and can be pruned here.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use cafego_core::{SessionToken, UserId};

use super::RepositoryError;
use crate::models::{Session, User};

#[derive(Debug, sqlx::FromRow)]
struct SessionUserRow {
    token: String,
    user_id: UserId,
    username: String,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

/// Repository for session token storage.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    /// Create a new session repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a newly issued session.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the token already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn insert(&self, session: &Session) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO sessions (token, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            ",
        )
        .bind(session.token.as_str())
        .bind(session.user_id)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(self.pool)
        .await
        .map_err(|e| super::conflict_on_unique(e, "session token"))?;

        Ok(())
    }

    /// Look up a session and the user it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored username is invalid.
    pub async fn find_with_user(
        &self,
        token: &str,
    ) -> Result<Option<(Session, User)>, RepositoryError> {
        let row = sqlx::query_as::<_, SessionUserRow>(
            r"
            SELECT s.token, s.user_id, u.username, s.created_at, s.expires_at
            FROM sessions s
            INNER JOIN users u ON u.id = s.user_id
            WHERE s.token = ?
            LIMIT 1
            ",
        )
        .bind(token)
        .fetch_optional(self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let username = cafego_core::Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        let session = Session {
            token: SessionToken::new(row.token),
            user_id: row.user_id,
            created_at: row.created_at,
            expires_at: row.expires_at,
        };
        let user = User {
            id: row.user_id,
            username,
        };

        Ok(Some((session, user)))
    }

    /// Delete a session.
    ///
    /// Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, token: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete every session that expired at or before `now`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM sessions
            WHERE expires_at IS NOT NULL AND expires_at <= ?
            ",
        )
        .bind(now)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Count sessions held by a user, expired or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_for_user(&self, user_id: UserId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}

//! Session registry.
//!
//! Issues opaque bearer tokens at login and resolves them back to a user.
//! Tokens carry 128 bits from the thread CSPRNG; collisions are left to the
//! birthday bound rather than checked, though the primary key would reject one.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::SqlitePool;
use tracing::instrument;

use cafego_core::SessionToken;

use crate::db::RepositoryError;
use crate::db::sessions::SessionRepository;
use crate::models::{Identity, Session, User};

/// Random bytes per token.
const TOKEN_BYTES: usize = 16;

/// Generate a new session token: 16 random bytes, URL-safe base64 without padding.
#[must_use]
pub fn generate_token() -> SessionToken {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    SessionToken::new(URL_SAFE_NO_PAD.encode(bytes))
}

/// Session registry.
pub struct SessionRegistry<'a> {
    sessions: SessionRepository<'a>,
    ttl: Option<Duration>,
}

impl<'a> SessionRegistry<'a> {
    /// Create a registry whose sessions never expire.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            sessions: SessionRepository::new(pool),
            ttl: None,
        }
    }

    /// Create a registry that stamps new sessions with an expiry.
    #[must_use]
    pub const fn with_ttl(pool: &'a SqlitePool, ttl: Option<Duration>) -> Self {
        Self {
            sessions: SessionRepository::new(pool),
            ttl,
        }
    }

    /// Issue a new session for `user`.
    ///
    /// Earlier sessions of the same user stay valid.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the session cannot be stored.
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn create_session(&self, user: &User) -> Result<SessionToken, RepositoryError> {
        let now = Utc::now();
        let session = Session {
            token: generate_token(),
            user_id: user.id,
            created_at: now,
            expires_at: self.ttl.map(|ttl| now + ttl),
        };

        self.sessions.insert(&session).await?;
        tracing::info!(token = %session.token.redacted(), "session created");

        Ok(session.token)
    }

    /// Resolve a token to the identity behind it.
    ///
    /// An empty, unknown or expired token is `Identity::Anonymous`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` only if the lookup itself fails.
    pub async fn resolve(&self, token: &str) -> Result<Identity, RepositoryError> {
        if token.is_empty() {
            return Ok(Identity::Anonymous);
        }

        let Some((session, user)) = self.sessions.find_with_user(token).await? else {
            return Ok(Identity::Anonymous);
        };

        if session.is_expired_at(Utc::now()) {
            tracing::debug!(token = %session.token.redacted(), "session expired");
            return Ok(Identity::Anonymous);
        }

        Ok(Identity::User(user))
    }

    /// End a session (logout). Unknown tokens are ignored.
    ///
    /// Returns `true` if a session was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    pub async fn end_session(&self, token: &str) -> Result<bool, RepositoryError> {
        if token.is_empty() {
            return Ok(false);
        }
        self.sessions.delete(token).await
    }

    /// Remove sessions whose expiry has passed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the delete fails.
    pub async fn prune_expired(&self) -> Result<u64, RepositoryError> {
        let removed = self.sessions.delete_expired(Utc::now()).await?;
        if removed > 0 {
            tracing::info!(removed, "pruned expired sessions");
        }
        Ok(removed)
    }
}

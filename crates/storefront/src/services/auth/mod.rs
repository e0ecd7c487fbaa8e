//! Credential store.
//!
//! Validates username/password pairs against stored Argon2id hashes.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::SqlitePool;
use tracing::instrument;

use cafego_core::{UserId, Username};

use crate::db::RepositoryError;
use crate::db::users::UserRepository;
use crate::models::User;

/// Credential store.
///
/// Handles user registration and password login.
pub struct CredentialStore<'a> {
    users: UserRepository<'a>,
}

impl<'a> CredentialStore<'a> {
    /// Create a new credential store.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Check a username/password pair.
    ///
    /// Matching is exact on both fields: no trimming, no case folding.
    /// Returns `Ok(None)` when no stored credential matches; the caller
    /// decides what to show the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    /// Returns `AuthError::PasswordHash` if the stored hash is unreadable.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AuthError> {
        let Ok(username) = Username::parse(username) else {
            return Ok(None);
        };

        let Some((user, password_hash)) = self.users.get_password_hash(&username).await? else {
            tracing::debug!("no such user");
            return Ok(None);
        };

        if verify_password(password, &password_hash)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Register a new user with a username and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::WeakPassword` if the password is empty.
    /// Returns `AuthError::UserAlreadyExists` if the username is taken.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.users
            .create(&username, &password_hash)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidUsername` if the username format is invalid.
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user_by_username(&self, username: &str) -> Result<User, AuthError> {
        let username = Username::parse(username)?;
        self.users
            .get_by_username(&username)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Validate password requirements.
///
/// Seeded passwords are short, so the only rule is that one is present.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::WeakPassword(
            "password cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Hash a password using Argon2id.
pub(crate) fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// Returns `Ok(false)` on mismatch.
fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| {
        tracing::error!(error = %e, "stored password hash is unreadable");
        AuthError::PasswordHash
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

//! Session-related types.

use chrono::{DateTime, Utc};

use cafego_core::{SessionToken, UserId};

use super::User;

/// A stored login session.
///
/// One user may hold any number of live sessions.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    /// `None` means the session never expires.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Whether the session has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Who is making a request.
///
/// A missing, unknown or expired token resolves to `Anonymous`; that is a
/// normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    #[default]
    Anonymous,
    User(User),
}

impl Identity {
    /// The authenticated user, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user),
        }
    }

    /// Consume the identity, yielding the authenticated user if any.
    #[must_use]
    pub fn into_user(self) -> Option<User> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user),
        }
    }

    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

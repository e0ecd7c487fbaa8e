//! User domain types.

use serde::Serialize;

use cafego_core::{UserId, Username};

/// A storefront user.
///
/// The stored credential is never part of this type; it only leaves the
/// database inside [`crate::services::auth`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name, unique and case-sensitive.
    pub username: Username,
}

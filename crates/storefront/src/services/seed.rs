//! First-boot seed data.
//!
//! Users and products are only inserted into empty tables, so running the
//! seed on every startup is harmless.

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::instrument;

use cafego_core::{Price, Username};

use crate::db::{self, RepositoryError};
use crate::db::products::ProductRepository;
use crate::db::users::UserRepository;
use crate::services::auth::{AuthError, hash_password};

/// Default accounts as `(username, password)`.
pub const SEED_USERS: &[(&str, &str)] = &[("zagreus", "cerberus"), ("melinoe", "b4d3ec1")];

/// Default catalog as `(name, price in cents, description)`, in id order.
pub const SEED_PRODUCTS: &[(&str, i64, &str)] = &[
    (
        "Americano",
        100,
        "Espresso, diluted for a lighter experience",
    ),
    ("Cappuccino", 110, "Espresso with steamed milk"),
    ("Espresso", 90, "A strong shot of coffee"),
    ("Macchiato", 120, "Espresso with a small amount of milk"),
];

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<sqlx::Error> for SeedError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::from(e))
    }
}

/// What a seed run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub products: usize,
}

impl SeedReport {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.users == 0 && self.products == 0
    }
}

/// Insert the default users and products into empty tables.
///
/// Each table is seeded in its own transaction.
///
/// # Errors
///
/// Returns `SeedError` if hashing or storage fails; nothing from the failing
/// table is committed.
#[instrument(skip(pool))]
pub async fn seed_defaults(pool: &SqlitePool) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::default();

    // Hash before taking the write lock, and only when it will be used.
    if UserRepository::new(pool).count().await? == 0 {
        let mut hashed = Vec::with_capacity(SEED_USERS.len());
        for &(name, password) in SEED_USERS {
            let username = Username::parse(name).map_err(AuthError::from)?;
            hashed.push((username, hash_password(password)?));
        }

        let mut tx = db::begin_immediate(pool).await?;
        if UserRepository::count_in(&mut tx).await? == 0 {
            for (username, hash) in &hashed {
                UserRepository::insert(&mut tx, username, hash).await?;
            }
            report.users = hashed.len();
        }
        tx.commit().await?;
    }

    let mut tx = db::begin_immediate(pool).await?;
    if ProductRepository::count_in(&mut tx).await? == 0 {
        for &(name, cents, description) in SEED_PRODUCTS {
            ProductRepository::insert(&mut tx, name, Price::from_cents(cents), description)
                .await?;
        }
        report.products = SEED_PRODUCTS.len();
    }
    tx.commit().await?;

    if report.is_empty() {
        tracing::debug!("seed data already present");
    } else {
        tracing::info!(
            users = report.users,
            products = report.products,
            "seeded default data"
        );
    }

    Ok(report)
}

//! Shared handler state: configuration and the `SQLite` pool.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::StorefrontConfig;
use crate::services::{Catalog, CartLedger, CheckoutEngine, CredentialStore, SessionRegistry};

/// Handler state.
///
/// Clones share one `Arc`. Each accessor below builds a service that borrows
/// the pool for the duration of a call; nothing is cached between requests.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: SqlitePool,
    session_ttl: Option<chrono::Duration>,
}

impl AppState {
    /// Wrap a loaded configuration and an open pool.
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: SqlitePool) -> Self {
        let session_ttl = config.session_ttl_chrono();
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                session_ttl,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    #[must_use]
    pub fn credentials(&self) -> CredentialStore<'_> {
        CredentialStore::new(self.pool())
    }

    /// Session registry honouring the configured TTL.
    #[must_use]
    pub fn sessions(&self) -> SessionRegistry<'_> {
        SessionRegistry::with_ttl(self.pool(), self.inner.session_ttl)
    }

    #[must_use]
    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(self.pool())
    }

    #[must_use]
    pub fn cart(&self) -> CartLedger<'_> {
        CartLedger::new(self.pool())
    }

    #[must_use]
    pub fn checkout(&self) -> CheckoutEngine<'_> {
        CheckoutEngine::new(self.pool())
    }
}

//! CafeGo Storefront.
//!
//! This binary serves the storefront on port 5000 by default.
//!
//! # Startup
//!
//! 1. Load configuration (`.env` supported)
//! 2. Initialise Sentry (when `SENTRY_DSN` is set) and tracing
//! 3. Open the `SQLite` pool, apply migrations, seed an empty database
//! 4. Serve until Ctrl+C or SIGTERM, then drain in-flight requests
//!
//! Only startup failures end the process; request-time storage failures are
//! returned to the single request that hit them.

#![cfg_attr(not(test), forbid(unsafe_code))]

use cafego_storefront::config::StorefrontConfig;
use cafego_storefront::state::AppState;
use cafego_storefront::{app, db, services};
use sentry::integrations::tracing as sentry_tracing;
use sqlx::SqlitePool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Start Sentry when a DSN is configured. The guard flushes events on drop.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Warnings and errors become Sentry events; info and debug become breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Text or JSON fmt output behind an `EnvFilter`, plus the Sentry layer.
fn init_tracing(config: &StorefrontConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cafego_storefront=info,tower_http=debug".into());

    let json_layer = config
        .log_json
        .then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!config.log_json).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

/// Open the pool and bring the schema and seed data up to date.
async fn open_database(config: &StorefrontConfig) -> SqlitePool {
    let pool = db::create_pool(&config.database_url, config.pool)
        .await
        .expect("Failed to open database");

    db::migrate(&pool)
        .await
        .expect("Failed to apply database migrations");

    services::seed_defaults(&pool)
        .await
        .expect("Failed to seed database");
    tracing::info!(
        max_connections = config.pool.max_connections,
        "database ready"
    );

    pool
}

#[tokio::main]
async fn main() {
    let config = StorefrontConfig::from_env().expect("Failed to load configuration");

    // Sentry before the subscriber so its tracing layer has a client.
    let _sentry_guard = init_sentry(&config);
    init_tracing(&config);

    let pool = open_database(&config).await;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, base_url = %config.base_url, "storefront listening");

    let router = app(AppState::new(config, pool.clone()));
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // Checkpoint the WAL before exit.
    pool.close().await;
    tracing::info!("storefront stopped");
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutting down, draining in-flight requests");
}

//! HTTP route handlers for storefront.
//!
//! Handlers are thin: they resolve identity, call one service and turn the
//! result into JSON or a redirect.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Current user and product list
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (database ping)
//!
//! # Products
//! GET  /products/{id}          - Product detail
//! POST /products/{id}          - Add to cart (form: quantity), requires session
//!
//! # Auth
//! POST /login                  - Login (form: username, password)
//! POST /logout                 - End the session
//!
//! # Cart (requires session)
//! GET  /cart                   - Cart contents
//! POST /cart                   - Checkout
//!
//! # Orders (requires session)
//! GET  /orders                 - Order history, newest first
//! GET  /orders/{id}            - One order
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod home;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(products::show).post(products::add_to_cart))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/{id}", get(orders::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/products", product_routes())
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/cart", get(cart::show).post(cart::checkout))
        .nest("/orders", order_routes())
}

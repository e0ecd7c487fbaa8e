//! Home page handler.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::Product;
use crate::state::AppState;

/// Home page payload. `username` is absent for anonymous visitors.
#[derive(Debug, Serialize)]
pub struct HomeView {
    pub username: Option<String>,
    pub products: Vec<Product>,
}

/// Display the home page.
pub async fn home(
    State(state): State<AppState>,
    OptionalAuth(identity): OptionalAuth,
) -> Result<Json<HomeView>> {
    let products = state.catalog().list_products().await?;

    Ok(Json(HomeView {
        username: identity.user().map(|u| u.username.to_string()),
        products,
    }))
}

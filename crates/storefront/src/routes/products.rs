//! Product route handlers.

use axum::{
    Form, Json,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use tracing::instrument;

use cafego_core::ProductId;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::Product;
use crate::state::AppState;

/// Add-to-cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub quantity: i64,
}

/// Display a single product.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Product>> {
    let id = ProductId::new(id);
    state
        .catalog()
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}

/// Add a line for this product to the caller's cart.
#[instrument(skip(state, user, form), fields(user_id = %user.id))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<i64>,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let item = state
        .cart()
        .add_item(&user, ProductId::new(id), form.quantity)
        .await?;

    let product_id = item.product_id.to_string();
    let quantity = item.quantity.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[
            ("product_id", product_id.as_str()),
            ("quantity", quantity.as_str()),
        ]),
    );

    Ok(Redirect::to("/"))
}

//! Cart and checkout handlers.

use axum::{Json, extract::State, response::Redirect};
use serde::Serialize;
use tracing::{Instrument, Span, instrument};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAuth;
use crate::models::{CartItem, User};
use crate::services::CheckoutOutcome;
use crate::state::AppState;

/// Cart page payload.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub user: User,
    pub items: Vec<CartItem>,
}

/// Display the caller's cart.
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<CartView>> {
    let items = state.cart().list_items(&user).await?;
    Ok(Json(CartView { user, items }))
}

/// Check out the caller's cart and send them home.
///
/// The checkout runs on its own task so a client that disconnects mid-request
/// does not cancel a transaction that is about to commit. The task keeps
/// the request span, so its logs still carry the request id.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Redirect> {
    let task_state = state.clone();
    let task = async move { task_state.checkout().checkout(&user).await };
    let outcome = tokio::spawn(task.instrument(Span::current()))
        .await
        .map_err(|e| AppError::Internal(format!("checkout task failed: {e}")))??;

    match outcome {
        CheckoutOutcome::Placed(order_id) => {
            let order_id = order_id.to_string();
            add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order_id.as_str())]));
        }
        CheckoutOutcome::NoItems => {
            tracing::debug!("checkout with empty cart");
        }
    }

    Ok(Redirect::to("/"))
}

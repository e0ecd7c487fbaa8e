//! Order history command.

use cafego_storefront::models::Order;
use cafego_storefront::services::{CheckoutEngine, CredentialStore};

use super::{CommandError, connect};

/// Print a user's orders, newest first.
///
/// # Errors
///
/// Returns `CommandError::Auth` if the user does not exist.
pub async fn print(username: &str) -> Result<(), CommandError> {
    let pool = connect().await?;
    let user = CredentialStore::new(&pool)
        .get_user_by_username(username)
        .await?;
    let orders = CheckoutEngine::new(&pool).orders_for(&user).await?;

    #[allow(clippy::print_stdout)]
    {
        if orders.is_empty() {
            println!("{} has no orders", user.username);
        }
        for order in &orders {
            print!("{}", format_order(order));
        }
    }

    pool.close().await;
    Ok(())
}

fn format_order(order: &Order) -> String {
    use std::fmt::Write;

    let mut out = format!(
        "Order #{} ({}) - {} items\n",
        order.id,
        order.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
        order.total_quantity()
    );
    for line in &order.line_items {
        let _ = writeln!(out, "  {} x {}", line.quantity, line.product_name);
    }
    out
}

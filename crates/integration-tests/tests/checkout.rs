//! Checkout: atomicity, empty carts, repeated and concurrent checkouts.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use cafego_core::ProductId;
use cafego_integration_tests::{FileDatabase, test_pool, user};
use cafego_storefront::db::OrderRepository;
use cafego_storefront::models::User;
use cafego_storefront::services::{CartLedger, CheckoutEngine, CheckoutError, CheckoutOutcome};
use sqlx::SqlitePool;
use tokio::sync::Barrier;

async fn order_count(pool: &SqlitePool) -> i64 {
    OrderRepository::new(pool).count().await.unwrap()
}

#[tokio::test]
async fn test_zagreus_scenario() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    let ledger = CartLedger::new(&pool);
    let engine = CheckoutEngine::new(&pool);

    ledger.add_item(&zagreus, ProductId::new(1), 2).await.unwrap();
    ledger.add_item(&zagreus, ProductId::new(3), 1).await.unwrap();
    assert_eq!(ledger.list_items(&zagreus).await.unwrap().len(), 2);

    let CheckoutOutcome::Placed(order_id) = engine.checkout(&zagreus).await.unwrap() else {
        panic!("expected an order");
    };

    let order = engine.order(&zagreus, order_id).await.unwrap().unwrap();
    let lines: Vec<(i64, i64)> = order
        .line_items
        .iter()
        .map(|l| (l.product_id.as_i64(), l.quantity))
        .collect();
    assert_eq!(lines, vec![(1, 2), (3, 1)]);
    assert_eq!(order.line_items[0].product_name, "Americano");
    assert_eq!(order.total_quantity(), 3);

    assert!(ledger.list_items(&zagreus).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_order_matches_cart_at_call_time() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    let ledger = CartLedger::new(&pool);

    for (product, quantity) in [(4, 1), (4, 1), (2, 5)] {
        ledger
            .add_item(&zagreus, ProductId::new(product), quantity)
            .await
            .unwrap();
    }
    let before = ledger.list_items(&zagreus).await.unwrap();

    let engine = CheckoutEngine::new(&pool);
    let order_id = engine.checkout(&zagreus).await.unwrap().order_id().unwrap();
    let order = engine.order(&zagreus, order_id).await.unwrap().unwrap();

    let expected: Vec<(i64, i64)> = before
        .iter()
        .map(|i| (i.product_id.as_i64(), i.quantity))
        .collect();
    let actual: Vec<(i64, i64)> = order
        .line_items
        .iter()
        .map(|l| (l.product_id.as_i64(), l.quantity))
        .collect();
    assert_eq!(actual, expected);
    assert_eq!(order.user_id, zagreus.id);
}

#[tokio::test]
async fn test_empty_cart_creates_no_order() {
    let pool = test_pool().await;
    let melinoe = user(&pool, "melinoe").await;

    let outcome = CheckoutEngine::new(&pool).checkout(&melinoe).await.unwrap();
    assert_eq!(outcome, CheckoutOutcome::NoItems);
    assert_eq!(order_count(&pool).await, 0);
}

#[tokio::test]
async fn test_second_checkout_is_no_items() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    CartLedger::new(&pool)
        .add_item(&zagreus, ProductId::new(1), 1)
        .await
        .unwrap();

    let engine = CheckoutEngine::new(&pool);
    assert!(matches!(
        engine.checkout(&zagreus).await.unwrap(),
        CheckoutOutcome::Placed(_)
    ));
    assert_eq!(
        engine.checkout(&zagreus).await.unwrap(),
        CheckoutOutcome::NoItems
    );
    assert_eq!(order_count(&pool).await, 1);
}

#[tokio::test]
async fn test_checkout_leaves_other_users_alone() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    let melinoe = user(&pool, "melinoe").await;
    let ledger = CartLedger::new(&pool);

    ledger.add_item(&zagreus, ProductId::new(1), 1).await.unwrap();
    let theirs = ledger.add_item(&melinoe, ProductId::new(2), 2).await.unwrap();

    CheckoutEngine::new(&pool).checkout(&zagreus).await.unwrap();

    assert_eq!(ledger.list_items(&melinoe).await.unwrap(), vec![theirs]);
}

#[tokio::test]
async fn test_failed_line_item_rolls_everything_back() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    let ledger = CartLedger::new(&pool);

    ledger.add_item(&zagreus, ProductId::new(1), 2).await.unwrap();
    ledger.add_item(&zagreus, ProductId::new(3), 1).await.unwrap();
    let before = ledger.list_items(&zagreus).await.unwrap();

    // Fail the second line item, after the order row and first line exist.
    sqlx::query(
        r"
        CREATE TRIGGER reject_espresso BEFORE INSERT ON line_items
        WHEN NEW.product_id = 3
        BEGIN
            SELECT RAISE(ABORT, 'line item rejected');
        END
        ",
    )
    .execute(&pool)
    .await
    .unwrap();

    let engine = CheckoutEngine::new(&pool);
    let result = engine.checkout(&zagreus).await;
    assert!(matches!(result, Err(CheckoutError::TransactionFailed(_))));

    assert_eq!(order_count(&pool).await, 0);
    let line_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM line_items")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(line_items, 0);
    assert_eq!(ledger.list_items(&zagreus).await.unwrap(), before);

    // The same cart checks out once the fault is gone.
    sqlx::query("DROP TRIGGER reject_espresso")
        .execute(&pool)
        .await
        .unwrap();
    assert!(matches!(
        engine.checkout(&zagreus).await.unwrap(),
        CheckoutOutcome::Placed(_)
    ));
    assert!(ledger.list_items(&zagreus).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_closed_storage_is_unavailable() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    pool.close().await;

    let result = CheckoutEngine::new(&pool).checkout(&zagreus).await;
    assert!(matches!(result, Err(CheckoutError::StorageUnavailable(_))));
}

#[tokio::test]
async fn test_order_history_newest_first_and_scoped() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    let melinoe = user(&pool, "melinoe").await;
    let ledger = CartLedger::new(&pool);
    let engine = CheckoutEngine::new(&pool);

    ledger.add_item(&zagreus, ProductId::new(1), 1).await.unwrap();
    let first = engine.checkout(&zagreus).await.unwrap().order_id().unwrap();
    ledger.add_item(&zagreus, ProductId::new(2), 2).await.unwrap();
    let second = engine.checkout(&zagreus).await.unwrap().order_id().unwrap();

    let orders = engine.orders_for(&zagreus).await.unwrap();
    let ids: Vec<_> = orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![second, first]);

    assert!(engine.orders_for(&melinoe).await.unwrap().is_empty());
    assert!(engine.order(&melinoe, first).await.unwrap().is_none());
}

/// Preload `preloaded` lines, then race `adds` add-item calls against
/// `checkouts` checkouts for the same user. Every line must end up in exactly
/// one place: one order, or the cart.
///
/// Quantities are unique per line so each line can be traced.
async fn race_adds_against_checkouts(
    pool: &SqlitePool,
    user: &User,
    preloaded: i64,
    adds: i64,
    checkouts: usize,
) {
    let ledger = CartLedger::new(pool);
    for quantity in 1..=preloaded {
        ledger
            .add_item(user, ProductId::new(1), quantity)
            .await
            .unwrap();
    }

    let mut add_tasks = Vec::new();
    for quantity in preloaded + 1..=preloaded + adds {
        let pool = pool.clone();
        let user = user.clone();
        add_tasks.push(tokio::spawn(async move {
            CartLedger::new(&pool)
                .add_item(&user, ProductId::new(2), quantity)
                .await
                .map(|item| item.quantity)
        }));
    }

    let mut checkout_tasks = Vec::new();
    for _ in 0..checkouts {
        let pool = pool.clone();
        let user = user.clone();
        checkout_tasks.push(tokio::spawn(async move {
            CheckoutEngine::new(&pool).checkout(&user).await
        }));
    }

    let mut expected: Vec<i64> = (1..=preloaded).collect();
    for task in add_tasks {
        // Adds wait on the write lock; none should fail outright.
        expected.push(task.await.unwrap().unwrap());
    }

    let mut placed = 0;
    for task in checkout_tasks {
        match task.await.unwrap() {
            Ok(CheckoutOutcome::Placed(_)) => placed += 1,
            Ok(CheckoutOutcome::NoItems) => {}
            Err(e) => panic!("checkout failed: {e}"),
        }
    }

    let engine = CheckoutEngine::new(pool);
    let orders = engine.orders_for(user).await.unwrap();
    assert_eq!(orders.len(), placed);

    let mut seen: Vec<i64> = Vec::new();
    for order in &orders {
        assert!(!order.line_items.is_empty(), "empty order {}", order.id);
        seen.extend(order.line_items.iter().map(|l| l.quantity));
    }
    seen.extend(
        ledger
            .list_items(user)
            .await
            .unwrap()
            .iter()
            .map(|i| i.quantity),
    );

    seen.sort_unstable();
    expected.sort_unstable();
    assert_eq!(seen, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_and_checkouts_in_memory() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;

    race_adds_against_checkouts(&pool, &zagreus, 5, 20, 3).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_and_checkouts_on_disk() {
    let db = FileDatabase::open(4).await;
    let zagreus = user(&db.pool, "zagreus").await;

    race_adds_against_checkouts(&db.pool, &zagreus, 5, 20, 3).await;
    db.pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simultaneous_checkouts_run_one_after_the_other() {
    let db = FileDatabase::open(4).await;
    let zagreus = user(&db.pool, "zagreus").await;
    let ledger = CartLedger::new(&db.pool);

    for _ in 0..20 {
        ledger.add_item(&zagreus, ProductId::new(1), 2).await.unwrap();
        ledger.add_item(&zagreus, ProductId::new(3), 1).await.unwrap();

        let barrier = Arc::new(Barrier::new(2));
        let tasks: Vec<_> = (0..2)
            .map(|_| {
                let pool = db.pool.clone();
                let user = zagreus.clone();
                let barrier = Arc::clone(&barrier);
                tokio::spawn(async move {
                    barrier.wait().await;
                    CheckoutEngine::new(&pool).checkout(&user).await
                })
            })
            .collect();

        let mut placed = 0;
        let mut empty = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(CheckoutOutcome::Placed(_)) => placed += 1,
                Ok(CheckoutOutcome::NoItems) => empty += 1,
                Err(e) => panic!("checkout failed: {e}"),
            }
        }
        assert_eq!((placed, empty), (1, 1));
        assert!(ledger.list_items(&zagreus).await.unwrap().is_empty());
    }

    let orders = CheckoutEngine::new(&db.pool).orders_for(&zagreus).await.unwrap();
    assert_eq!(orders.len(), 20);
    assert!(orders.iter().all(|order| order.line_items.len() == 2));
    db.pool.close().await;
}

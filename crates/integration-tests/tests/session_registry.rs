//! Session registry: issue, resolve, expire, end.

#![allow(clippy::unwrap_used)]

use chrono::Duration;

use cafego_integration_tests::{test_pool, user};
use cafego_storefront::db::SessionRepository;
use cafego_storefront::models::Identity;
use cafego_storefront::services::SessionRegistry;

#[tokio::test]
async fn test_created_session_resolves_to_user() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    let registry = SessionRegistry::new(&pool);

    let token = registry.create_session(&zagreus).await.unwrap();
    let identity = registry.resolve(token.as_str()).await.unwrap();

    assert_eq!(identity, Identity::User(zagreus));
}

#[tokio::test]
async fn test_unknown_or_absent_token_is_anonymous() {
    let pool = test_pool().await;
    let registry = SessionRegistry::new(&pool);

    for token in ["", "nope", "AAAAAAAAAAAAAAAAAAAAAA", "' OR 1=1 --"] {
        let identity = registry.resolve(token).await.unwrap();
        assert!(identity.is_anonymous(), "{token:?} should be anonymous");
    }
}

#[tokio::test]
async fn test_users_may_hold_several_sessions() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    let registry = SessionRegistry::new(&pool);

    let first = registry.create_session(&zagreus).await.unwrap();
    let second = registry.create_session(&zagreus).await.unwrap();
    assert_ne!(first, second);

    assert_eq!(
        SessionRepository::new(&pool)
            .count_for_user(zagreus.id)
            .await
            .unwrap(),
        2
    );
    assert!(!registry.resolve(first.as_str()).await.unwrap().is_anonymous());
    assert!(!registry.resolve(second.as_str()).await.unwrap().is_anonymous());
}

#[tokio::test]
async fn test_sessions_resolve_to_their_own_user() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    let melinoe = user(&pool, "melinoe").await;
    let registry = SessionRegistry::new(&pool);

    let z = registry.create_session(&zagreus).await.unwrap();
    let m = registry.create_session(&melinoe).await.unwrap();

    assert_eq!(registry.resolve(z.as_str()).await.unwrap().user(), Some(&zagreus));
    assert_eq!(registry.resolve(m.as_str()).await.unwrap().user(), Some(&melinoe));
}

#[tokio::test]
async fn test_end_session() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    let registry = SessionRegistry::new(&pool);

    let ended = registry.create_session(&zagreus).await.unwrap();
    let kept = registry.create_session(&zagreus).await.unwrap();

    assert!(registry.end_session(ended.as_str()).await.unwrap());
    assert!(!registry.end_session(ended.as_str()).await.unwrap());

    assert!(registry.resolve(ended.as_str()).await.unwrap().is_anonymous());
    assert!(!registry.resolve(kept.as_str()).await.unwrap().is_anonymous());
}

#[tokio::test]
async fn test_default_sessions_never_expire() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;
    let registry = SessionRegistry::new(&pool);

    registry.create_session(&zagreus).await.unwrap();

    let expires_at: Option<String> = sqlx::query_scalar("SELECT expires_at FROM sessions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(expires_at.is_none());
    assert_eq!(registry.prune_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn test_expired_session_is_anonymous_and_pruned() {
    let pool = test_pool().await;
    let zagreus = user(&pool, "zagreus").await;

    let expired = SessionRegistry::with_ttl(&pool, Some(Duration::seconds(-1)));
    let live = SessionRegistry::with_ttl(&pool, Some(Duration::hours(1)));

    let stale = expired.create_session(&zagreus).await.unwrap();
    let fresh = live.create_session(&zagreus).await.unwrap();

    assert!(live.resolve(stale.as_str()).await.unwrap().is_anonymous());
    assert!(!live.resolve(fresh.as_str()).await.unwrap().is_anonymous());

    assert_eq!(live.prune_expired().await.unwrap(), 1);
    assert!(!live.resolve(fresh.as_str()).await.unwrap().is_anonymous());
}

//! Credential store against a seeded database.

#![allow(clippy::unwrap_used)]

use cafego_integration_tests::test_pool;
use cafego_storefront::services::{AuthError, CredentialStore};

#[tokio::test]
async fn test_seeded_users_authenticate() {
    let pool = test_pool().await;
    let store = CredentialStore::new(&pool);

    let zagreus = store.authenticate("zagreus", "cerberus").await.unwrap();
    assert_eq!(zagreus.unwrap().username.as_str(), "zagreus");

    let melinoe = store.authenticate("melinoe", "b4d3ec1").await.unwrap();
    assert_eq!(melinoe.unwrap().username.as_str(), "melinoe");
}

#[tokio::test]
async fn test_mismatches_are_not_found() {
    let pool = test_pool().await;
    let store = CredentialStore::new(&pool);

    // Wrong password, another user's password, case changes, unknown user.
    for (username, password) in [
        ("zagreus", "wrong"),
        ("zagreus", "b4d3ec1"),
        ("zagreus", "Cerberus"),
        ("Zagreus", "cerberus"),
        ("zagreus ", "cerberus"),
        ("thanatos", "cerberus"),
        ("", ""),
    ] {
        let result = store.authenticate(username, password).await.unwrap();
        assert!(result.is_none(), "{username:?}/{password:?} should not match");
    }
}

#[tokio::test]
async fn test_passwords_are_stored_hashed() {
    let pool = test_pool().await;

    let hashes: Vec<String> = sqlx::query_scalar("SELECT password_hash FROM users")
        .fetch_all(&pool)
        .await
        .unwrap();

    assert_eq!(hashes.len(), 2);
    for hash in hashes {
        assert!(hash.starts_with("$argon2id$"));
        assert!(!hash.contains("cerberus"));
    }
}

#[tokio::test]
async fn test_register_then_authenticate() {
    let pool = test_pool().await;
    let store = CredentialStore::new(&pool);

    let user = store.register("thanatos", "hypnos").await.unwrap();
    let found = store.authenticate("thanatos", "hypnos").await.unwrap();
    assert_eq!(found, Some(user.clone()));

    assert_eq!(store.get_user(user.id).await.unwrap(), user);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_input() {
    let pool = test_pool().await;
    let store = CredentialStore::new(&pool);

    assert!(matches!(
        store.register("zagreus", "another").await,
        Err(AuthError::UserAlreadyExists)
    ));
    assert!(matches!(
        store.register("", "pw").await,
        Err(AuthError::InvalidUsername(_))
    ));
    assert!(matches!(
        store.register("nyx", "").await,
        Err(AuthError::WeakPassword(_))
    ));
}

#[tokio::test]
async fn test_unknown_user_lookup() {
    let pool = test_pool().await;
    let store = CredentialStore::new(&pool);

    assert!(matches!(
        store.get_user_by_username("hades").await,
        Err(AuthError::UserNotFound)
    ));
}

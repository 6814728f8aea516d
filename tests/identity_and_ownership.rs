mod common;

use chrono::{Duration as ChronoDuration, Utc};
use common::*;
use qun_console::platform::AdapterRegistry;
use qun_console::services::IdentityResolver;
use qun_console::web::error::ErrorKind;
use std::sync::Arc;
use tracing::Span;

async fn resolver() -> (sea_orm::DatabaseConnection, IdentityResolver) {
    let db = memory_db().await;
    let resolver = IdentityResolver::new(db.clone(), PLATFORM, Span::none());
    (db, resolver)
}

#[tokio::test]
async fn missing_or_blank_token_is_unauthenticated() {
    let (_db, resolver) = resolver().await;
    for token in [None, Some(""), Some("   ")] {
        let err = resolver.resolve(token).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unauthenticated, "token {token:?}");
    }
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let (_db, resolver) = resolver().await;
    let err = resolver.resolve(Some("nope")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TokenNotFound);
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let (db, resolver) = resolver().await;
    seed_token(&db, "old", 7, Some(Utc::now() - ChronoDuration::hours(1))).await;
    seed_binding(&db, 7, PLATFORM, OWNER).await;

    let err = resolver.resolve(Some("old")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TokenNotFound);
}

#[tokio::test]
async fn token_without_platform_binding_is_rejected() {
    let (db, resolver) = resolver().await;
    seed_token(&db, "t-1", 7, None).await;
    seed_binding(&db, 7, "telegram", OWNER).await;

    let err = resolver.resolve(Some("t-1")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BindingNotFound);
}

#[tokio::test]
async fn valid_token_resolves_to_bound_account() {
    let (db, resolver) = resolver().await;
    seed_token(&db, "t-1", 7, Some(Utc::now() + ChronoDuration::hours(1))).await;
    seed_binding(&db, 7, PLATFORM, OWNER).await;

    let identity = resolver.resolve(Some(" t-1 ")).await.unwrap();
    assert_eq!(identity.user_id, 7);
    assert_eq!(identity.account_id, OWNER);
}

#[tokio::test]
async fn only_the_owner_role_counts() {
    let adapter = ScriptedAdapter::new().owner_of(1001, OWNER);
    adapter.reply(1001, OTHER, Reply::Role("admin"));
    let verifier = verifier_with(registry_with(adapter));

    assert!(verifier.verify_owner(1001, OWNER).await.unwrap());
    assert!(!verifier.verify_owner(1001, OTHER).await.unwrap());
    assert!(!verifier.verify_owner(1001, STRANGER).await.unwrap());
}

#[tokio::test]
async fn verifier_surfaces_platform_failures() {
    let adapter = ScriptedAdapter::new();
    adapter.reply(1001, OWNER, Reply::Fail);
    adapter.reply(1002, OWNER, Reply::Hang);
    let verifier = verifier_with(registry_with(adapter));

    let err = verifier.verify_owner(1001, OWNER).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OwnershipCheckFailed);

    let started = std::time::Instant::now();
    let err = verifier.verify_owner(1002, OWNER).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OwnershipCheckFailed);
    assert!(err.to_string().contains("timed out after 200ms"), "{err}");
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}

#[tokio::test]
async fn verifier_needs_exactly_one_adapter() {
    let verifier = verifier_with(Arc::new(AdapterRegistry::new()));
    let err = verifier.verify_owner(1001, OWNER).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AdapterUnavailable);

    let mut registry = AdapterRegistry::new();
    registry.register(ScriptedAdapter::new().owner_of(1001, OWNER));
    registry.register(ScriptedAdapter::new().owner_of(1001, OWNER));
    let verifier = verifier_with(Arc::new(registry));
    let err = verifier.verify_owner(1001, OWNER).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AdapterUnavailable);
}

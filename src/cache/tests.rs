use crate::cache::{CacheError, FakeCache, ListingCache, MokaListingCache};
use crate::config::CacheConfig;
use std::time::Duration;

#[tokio::test]
async fn fake_cache_set_then_get() {
    let cache = FakeCache::new();
    cache
        .set("pictures:alice", "[]".to_string(), 60)
        .await
        .unwrap();

    assert_eq!(
        cache.get("pictures:alice").await.unwrap(),
        Some("[]".to_string())
    );
    assert_eq!(cache.get("pictures:bob").await.unwrap(), None);
    assert_eq!(cache.fake_get_calls(), 2);
    assert_eq!(cache.fake_set_calls(), 1);
}

#[tokio::test]
async fn fake_cache_failure_injection() {
    let cache = FakeCache::new();
    cache.fake_fail_gets();
    cache.fake_fail_sets();

    assert!(matches!(
        cache.get("k").await.unwrap_err(),
        CacheError::ReadError(_, _)
    ));
    assert!(matches!(
        cache.set("k", "v".to_string(), 60).await.unwrap_err(),
        CacheError::WriteError(_, _)
    ));
}

#[tokio::test]
async fn moka_cache_stores_and_returns_values() {
    let cache = MokaListingCache::new(&CacheConfig::default());
    cache
        .set("pictures:alice", "[1,2]".to_string(), 60)
        .await
        .unwrap();

    assert_eq!(
        cache.get("pictures:alice").await.unwrap(),
        Some("[1,2]".to_string())
    );
    assert_eq!(cache.get("pictures:missing").await.unwrap(), None);
}

#[tokio::test]
async fn moka_cache_entries_expire_after_ttl() {
    let cache = MokaListingCache::new(&CacheConfig::default());
    cache
        .set("pictures:alice", "[]".to_string(), 1)
        .await
        .unwrap();

    assert!(cache.get("pictures:alice").await.unwrap().is_some());

    tokio::time::sleep(Duration::from_millis(1300)).await;
    assert_eq!(cache.get("pictures:alice").await.unwrap(), None);
}

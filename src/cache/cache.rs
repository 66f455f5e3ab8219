use crate::cache::error::CacheError;
use async_trait::async_trait;
use std::sync::Arc;

/// ListingCache trait defining the interface for the short-lived owner
/// listing cache. Entries expire by TTL only; there is no active
/// invalidation on write, which is an accepted staleness window.
#[async_trait]
pub trait ListingCache: Send + Sync + 'static {
    /// Look up a cached value; None is a miss
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Store a value under the key for `ttl_secs` seconds
    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError>;
}

#[async_trait]
impl<T: ListingCache + ?Sized> ListingCache for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        (**self).set(key, value, ttl_secs).await
    }
}

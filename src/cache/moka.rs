use crate::cache::cache::ListingCache;
use crate::cache::error::CacheError;
use crate::config::CacheConfig;
use async_trait::async_trait;
use moka::Expiry;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expiry policy that honors the TTL carried by each entry
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// In-process TTL cache over moka, the real implementation of ListingCache
pub struct MokaListingCache {
    cache: moka::future::Cache<String, Entry>,
}

impl MokaListingCache {
    pub fn new(config: &CacheConfig) -> Self {
        let cache = moka::future::Cache::builder()
            .max_capacity(config.capacity)
            .expire_after(PerEntryTtl)
            .build();
        MokaListingCache { cache }
    }
}

#[async_trait]
impl ListingCache for MokaListingCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let hit = self.cache.get(key).await;
        debug!(
            "Cache {} for key {}",
            if hit.is_some() { "hit" } else { "miss" },
            key
        );
        Ok(hit.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        self.cache
            .insert(
                key.to_string(),
                Entry {
                    value,
                    ttl: Duration::from_secs(ttl_secs),
                },
            )
            .await;
        Ok(())
    }
}

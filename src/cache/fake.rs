use crate::cache::cache::ListingCache;
use crate::cache::error::CacheError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// A fake in-memory implementation of the ListingCache trait for testing.
/// Entries never expire on their own; tests control contents directly.
#[derive(Default)]
pub struct FakeCache {
    entries: Arc<RwLock<HashMap<String, String>>>,
    fail_gets: Arc<AtomicBool>,
    fail_sets: Arc<AtomicBool>,
    get_calls: Arc<AtomicUsize>,
    set_calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl FakeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every get return an error until cleared
    pub fn fake_fail_gets(&self) {
        self.fail_gets.store(true, Ordering::SeqCst);
    }

    /// Make every set return an error until cleared
    pub fn fake_fail_sets(&self) {
        self.fail_sets.store(true, Ordering::SeqCst);
    }

    /// Preload a raw value, e.g. a corrupt payload
    pub fn fake_put_raw(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }

    pub fn fake_entry(&self, key: &str) -> Option<String> {
        self.entries.read().unwrap().get(key).cloned()
    }

    pub fn fake_evict(&self, key: &str) {
        self.entries.write().unwrap().remove(key);
    }

    pub fn fake_get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn fake_set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingCache for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(CacheError::ReadError(
                key.to_string(),
                "simulated read failure".to_string(),
            ));
        }
        Ok(self.entries.read().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: String, _ttl_secs: u64) -> Result<(), CacheError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(CacheError::WriteError(
                key.to_string(),
                "simulated write failure".to_string(),
            ));
        }
        self.entries
            .write()
            .unwrap()
            .insert(key.to_string(), value);
        Ok(())
    }
}

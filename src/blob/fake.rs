use crate::blob::error::BlobStoreError;
use crate::blob::store::BlobStore;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// `FakeBlobStore` is an in-memory implementation of the `BlobStore` trait for
/// testing. It allows simulating storage failures per key and a failing URL
/// signer.
#[derive(Clone, Default)]
pub struct FakeBlobStore {
    data: Arc<Mutex<HashMap<String, Bytes>>>,
    fail_gets: Arc<Mutex<HashSet<String>>>,
    fail_puts: Arc<Mutex<HashSet<String>>>,
    fail_all_puts: Arc<AtomicBool>,
    fail_signing: Arc<AtomicBool>,
    signed_counter: Arc<AtomicU64>,
}

#[allow(dead_code)]
impl FakeBlobStore {
    /// Create a new empty FakeBlobStore instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a missing object: get_object will return ObjectNotFound for
    /// this key even if data exists
    pub async fn fake_fail_get(&self, key: &str) {
        self.fail_gets.lock().await.insert(key.to_string());
    }

    /// Simulate a write failure for a specific key
    pub async fn fake_fail_put(&self, key: &str) {
        self.fail_puts.lock().await.insert(key.to_string());
    }

    /// Simulate a write failure for every key
    pub fn fake_fail_all_puts(&self) {
        self.fail_all_puts.store(true, Ordering::SeqCst);
    }

    /// Make signed_url fail until cleared
    pub fn fake_fail_signing(&self) {
        self.fail_signing.store(true, Ordering::SeqCst);
    }

    pub async fn fake_contains(&self, key: &str) -> bool {
        self.data.lock().await.contains_key(key)
    }

    pub async fn fake_object(&self, key: &str) -> Option<Bytes> {
        self.data.lock().await.get(key).cloned()
    }

    pub async fn fake_add_object(&self, key: &str, data: Bytes) {
        self.data.lock().await.insert(key.to_string(), data);
    }

    pub async fn fake_remove_object(&self, key: &str) {
        self.data.lock().await.remove(key);
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        _content_type: &str,
    ) -> Result<(), BlobStoreError> {
        if self.fail_all_puts.load(Ordering::SeqCst)
            || self.fail_puts.lock().await.contains(key)
        {
            return Err(BlobStoreError::WriteError(
                key.to_string(),
                "simulated write failure".to_string(),
            ));
        }

        self.data.lock().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, BlobStoreError> {
        if self.fail_gets.lock().await.contains(key) {
            return Err(BlobStoreError::ObjectNotFound(key.to_string()));
        }

        let data = self.data.lock().await;
        match data.get(key) {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(BlobStoreError::ObjectNotFound(key.to_string())),
        }
    }

    async fn signed_url(&self, key: &str, ttl_secs: u64) -> Result<String, BlobStoreError> {
        if self.fail_signing.load(Ordering::SeqCst) {
            return Err(BlobStoreError::SigningError(
                key.to_string(),
                "simulated signing failure".to_string(),
            ));
        }

        let serial = self.signed_counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!(
            "https://blobs.test/{}?expires={}&sig={}",
            key, ttl_secs, serial
        ))
    }
}

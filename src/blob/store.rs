use crate::blob::error::BlobStoreError;
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// BlobStore trait defining the interface for durable binary artifacts.
///
/// Keys are flat strings with no directory semantics. Writes are assumed
/// read-after-write consistent, and overwriting an existing key is always
/// safe. The trait carries no retry policy; callers decide.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Store an object under the given key, overwriting any previous content
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), BlobStoreError>;

    /// Get an object by its key
    async fn get_object(&self, key: &str) -> Result<Bytes, BlobStoreError>;

    /// Issue a time-limited retrieval URL for an object
    async fn signed_url(&self, key: &str, ttl_secs: u64) -> Result<String, BlobStoreError>;
}

/// Implementation of BlobStore for Arc<T>, allowing one client instance to
/// be shared across the engine and query service.
#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), BlobStoreError> {
        (**self).put_object(key, data, content_type).await
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, BlobStoreError> {
        (**self).get_object(key).await
    }

    async fn signed_url(&self, key: &str, ttl_secs: u64) -> Result<String, BlobStoreError> {
        (**self).signed_url(key, ttl_secs).await
    }
}

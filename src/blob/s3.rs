use crate::blob::error::BlobStoreError;
use crate::blob::store::BlobStore;
use crate::config::S3Config;
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::{config::Region, Client};
use bytes::Bytes;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// S3 implementation of the BlobStore trait
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    cache: Arc<Mutex<lru::LruCache<String, Bytes>>>,
}

impl S3BlobStore {
    /// Create a new S3BlobStore instance from configuration
    pub async fn new(config: &S3Config) -> Result<Self, BlobStoreError> {
        info!(
            "Creating S3BlobStore: endpoint={:?}, region={}, bucket={}",
            config.endpoint, config.region, config.bucket
        );

        let config_loader = aws_config::from_env().region(Region::new(config.region.clone()));

        // If access key and secret are provided, use them for credentials
        let aws_config = if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            let credentials = Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "StaticCredentialsProvider",
            );

            config_loader.credentials_provider(credentials).load().await
        } else {
            config_loader.load().await
        };

        // MinIO requires path-style requests
        let mut client_builder =
            aws_sdk_s3::config::Builder::from(&aws_config).force_path_style(true);
        if let Some(endpoint) = &config.endpoint {
            info!("Setting custom endpoint: {}", endpoint);
            client_builder = client_builder.endpoint_url(endpoint);
        }

        let s3_config = client_builder.build();
        let client = Client::from_conf(s3_config);

        // LRU cache over recently fetched objects - default to 100 items
        let cache_size = NonZeroUsize::new(100)
            .ok_or_else(|| BlobStoreError::ConfigurationError("cache size".to_string()))?;
        let cache = Arc::new(Mutex::new(lru::LruCache::new(cache_size)));

        Ok(Self {
            client,
            bucket: config.bucket.clone(),
            cache,
        })
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put_object(
        &self,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<(), BlobStoreError> {
        debug!("Uploading object to S3: {} ({} bytes)", key, data.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(data.clone().into())
            .send()
            .await
            .map_err(|e| BlobStoreError::WriteError(key.to_string(), e.to_string()))?;

        // Keep the cache consistent with the overwrite
        let mut cache = self.cache.lock().await;
        cache.put(key.to_string(), data);

        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Bytes, BlobStoreError> {
        {
            let mut cache = self.cache.lock().await;
            if let Some(data) = cache.get(key) {
                debug!("Cache hit for object: {}", key);
                return Ok(data.clone());
            }
        }

        debug!("Fetching object from S3: {}", key);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e {
                _ if e.to_string().contains("NoSuchKey") => {
                    BlobStoreError::ObjectNotFound(key.to_string())
                }
                _ if e.to_string().contains("AccessDenied") => {
                    BlobStoreError::AccessDenied(key.to_string(), e.to_string())
                }
                _ => BlobStoreError::ReadError(key.to_string(), e.to_string()),
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| BlobStoreError::ReadError(key.to_string(), e.to_string()))?
            .into_bytes();

        {
            let mut cache = self.cache.lock().await;
            cache.put(key.to_string(), data.clone());
        }

        debug!("Successfully fetched object from S3: {}", key);
        Ok(data)
    }

    async fn signed_url(&self, key: &str, ttl_secs: u64) -> Result<String, BlobStoreError> {
        let presigning = PresigningConfig::expires_in(Duration::from_secs(ttl_secs))
            .map_err(|e| BlobStoreError::SigningError(key.to_string(), e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| BlobStoreError::SigningError(key.to_string(), e.to_string()))?;

        debug!("Generated signed URL for object: {}", key);
        Ok(presigned.uri().to_string())
    }
}

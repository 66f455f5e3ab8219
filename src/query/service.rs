use crate::blob::BlobStore;
use crate::cache::ListingCache;
use crate::meta::{Job, JobPatch, JobStatus, MetadataStore};
use crate::query::error::QueryError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Progress snapshot returned to polling clients. Always reflects the last
/// durably persisted state, so a failed job reads as a frozen status rather
/// than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub status: JobStatus,
    pub progress: u8,
    pub raw_url: String,
    pub resized_url: String,
    pub collage_url: String,
}

/// Read-side service for progress polling and owner listings. Listings are
/// served through the cache when possible; misses fall back to the metadata
/// store with a synchronous collage-URL backfill before the response is
/// cached and returned.
pub struct QueryService<M, B, C> {
    meta: Arc<M>,
    blobs: Arc<B>,
    cache: Arc<C>,
    listing_ttl_secs: u64,
    signed_url_ttl_secs: u64,
}

fn listing_cache_key(owner: &str) -> String {
    format!("pictures:{owner}")
}

impl<M: MetadataStore, B: BlobStore, C: ListingCache> QueryService<M, B, C> {
    pub fn new(
        meta: Arc<M>,
        blobs: Arc<B>,
        cache: Arc<C>,
        listing_ttl_secs: u64,
        signed_url_ttl_secs: u64,
    ) -> Self {
        QueryService {
            meta,
            blobs,
            cache,
            listing_ttl_secs,
            signed_url_ttl_secs,
        }
    }

    /// Direct metadata read of a job's processing state
    pub async fn get_progress(&self, job_id: Uuid) -> Result<ProgressReport, QueryError> {
        let job = self.meta.get_job(job_id).await?;
        Ok(ProgressReport {
            status: job.status,
            progress: job.progress,
            raw_url: job.raw_url,
            resized_url: job.resized_url,
            collage_url: job.collage_url,
        })
    }

    /// List all jobs belonging to an owner, cache-assisted.
    ///
    /// A cache hit is returned as-is; its retrieval URLs may be stale,
    /// which is accepted. On a miss the metadata store is queried, missing
    /// collage URLs are backfilled, and the result is cached with a fixed
    /// short TTL. Cache failures in either direction never fail the read.
    pub async fn list_by_owner(&self, owner: &str) -> Result<Vec<Job>, QueryError> {
        let cache_key = listing_cache_key(owner);

        match self.cache.get(&cache_key).await {
            Ok(Some(payload)) => match serde_json::from_str::<Vec<Job>>(&payload) {
                Ok(jobs) => {
                    debug!("Cache hit for owner listing {}", owner);
                    return Ok(jobs);
                }
                Err(e) => {
                    warn!("Discarding undecodable cache entry for {}: {}", owner, e);
                }
            },
            Ok(None) => debug!("Cache miss for owner listing {}", owner),
            Err(e) => warn!("Cache read for {} failed, treating as miss: {}", owner, e),
        }

        let mut jobs = self.meta.list_by_owner(owner).await?;
        if jobs.is_empty() {
            return Err(QueryError::OwnerNotFound(owner.to_string()));
        }

        for job in &mut jobs {
            self.backfill_collage_url(job).await;
        }

        match serde_json::to_string(&jobs) {
            Ok(payload) => {
                if let Err(e) = self
                    .cache
                    .set(&cache_key, payload, self.listing_ttl_secs)
                    .await
                {
                    warn!("Cache write for {} failed (non-fatal): {}", owner, e);
                }
            }
            Err(e) => warn!("Could not serialize listing for {}: {}", owner, e),
        }

        Ok(jobs)
    }

    /// Self-healing backfill: generate and persist a missing collage URL.
    /// Best-effort; a job without a stored collage artifact key, or one
    /// whose signing fails, is returned with the URL still empty.
    async fn backfill_collage_url(&self, job: &mut Job) {
        if !job.collage_url.is_empty() || job.collage_key.is_empty() {
            return;
        }

        let url = match self
            .blobs
            .signed_url(&job.collage_key, self.signed_url_ttl_secs)
            .await
        {
            Ok(url) => url,
            Err(e) => {
                warn!(
                    "Backfill signing for job {} failed (non-fatal): {}",
                    job.id, e
                );
                return;
            }
        };

        if let Err(e) = self
            .meta
            .update_job(
                job.id,
                JobPatch {
                    collage_url: Some(url.clone()),
                    ..JobPatch::default()
                },
            )
            .await
        {
            warn!(
                "Persisting backfilled URL for job {} failed (non-fatal): {}",
                job.id, e
            );
        }

        job.collage_url = url;
    }
}

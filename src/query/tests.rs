use crate::blob::FakeBlobStore;
use crate::cache::FakeCache;
use crate::meta::{FakeMetadataStore, Job, JobOptions, JobStatus};
use crate::query::error::QueryError;
use crate::query::service::QueryService;
use std::sync::Arc;
use uuid::Uuid;

struct TestEnvironment {
    meta: Arc<FakeMetadataStore>,
    blobs: Arc<FakeBlobStore>,
    cache: Arc<FakeCache>,
    service: QueryService<FakeMetadataStore, FakeBlobStore, FakeCache>,
}

fn test_env() -> TestEnvironment {
    let meta = Arc::new(FakeMetadataStore::new());
    let blobs = Arc::new(FakeBlobStore::new());
    let cache = Arc::new(FakeCache::new());
    let service = QueryService::new(meta.clone(), blobs.clone(), cache.clone(), 60, 36000);
    TestEnvironment {
        meta,
        blobs,
        cache,
        service,
    }
}

/// A job that finished processing, with keys assigned and URL state as given
fn done_job(owner: &str, collage_url: &str) -> Job {
    let mut job = Job::new(owner, JobOptions::default());
    job.raw_key = format!("{}.jpg", job.id);
    job.resized_key = format!("processed-{}.jpg", job.id);
    job.collage_key = format!("collage-{}.jpg", job.id);
    job.status = JobStatus::Done;
    job.progress = 100;
    job.collage_url = collage_url.to_string();
    job
}

// --- get_progress ---

#[tokio::test]
async fn progress_for_unknown_job_is_not_found() {
    let env = test_env();
    let err = env.service.get_progress(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, QueryError::JobNotFound(_)));
}

#[tokio::test]
async fn progress_reflects_last_persisted_state() {
    let env = test_env();
    let mut job = Job::new("alice", JobOptions::default());
    job.status = JobStatus::Failed;
    job.progress = 10;
    env.meta.fake_add_job(job.clone());

    let report = env.service.get_progress(job.id).await.unwrap();
    assert_eq!(report.status, JobStatus::Failed);
    assert_eq!(report.progress, 10);
    assert_eq!(report.collage_url, "");
}

// --- list_by_owner ---

#[tokio::test]
async fn listing_unknown_owner_is_not_found() {
    let env = test_env();
    let err = env.service.list_by_owner("nobody").await.unwrap_err();
    assert!(matches!(err, QueryError::OwnerNotFound(_)));
}

#[tokio::test]
async fn second_listing_within_ttl_is_served_from_cache() {
    let env = test_env();
    env.meta.fake_add_job(done_job("alice", "https://blobs.test/a"));
    env.meta.fake_add_job(done_job("alice", "https://blobs.test/b"));

    let first = env.service.list_by_owner("alice").await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(env.meta.fake_list_calls(), 1);
    assert_eq!(env.cache.fake_set_calls(), 1);

    let second = env.service.list_by_owner("alice").await.unwrap();
    // Same bytes, no second store query
    assert_eq!(second, first);
    assert_eq!(env.meta.fake_list_calls(), 1);
}

#[tokio::test]
async fn listing_backfills_and_persists_missing_collage_url() {
    let env = test_env();
    let job = done_job("alice", "");
    env.meta.fake_add_job(job.clone());

    let listed = env.service.list_by_owner("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].collage_url.contains(&job.collage_key));

    // The backfilled URL was written back to the store of record
    let stored = env.meta.fake_job(job.id).unwrap();
    assert_eq!(stored.collage_url, listed[0].collage_url);

    // And the cached copy carries it too
    let cached = env.cache.fake_entry("pictures:alice").unwrap();
    let cached_jobs: Vec<Job> = serde_json::from_str(&cached).unwrap();
    assert_eq!(cached_jobs[0].collage_url, listed[0].collage_url);
}

#[tokio::test]
async fn jobs_with_existing_urls_are_not_re_signed() {
    let env = test_env();
    env.meta
        .fake_add_job(done_job("alice", "https://blobs.test/existing"));

    let listed = env.service.list_by_owner("alice").await.unwrap();
    assert_eq!(listed[0].collage_url, "https://blobs.test/existing");
    assert_eq!(env.meta.fake_update_calls(), 0);
}

#[tokio::test]
async fn backfill_signing_failure_leaves_url_empty() {
    let env = test_env();
    env.meta.fake_add_job(done_job("alice", ""));
    env.blobs.fake_fail_signing();

    let listed = env.service.list_by_owner("alice").await.unwrap();
    assert_eq!(listed[0].collage_url, "");
    assert_eq!(env.meta.fake_update_calls(), 0);
}

#[tokio::test]
async fn cache_read_failure_is_treated_as_a_miss() {
    let env = test_env();
    env.meta.fake_add_job(done_job("alice", "https://blobs.test/a"));
    env.cache.fake_fail_gets();

    let listed = env.service.list_by_owner("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(env.meta.fake_list_calls(), 1);
}

#[tokio::test]
async fn cache_write_failure_does_not_fail_the_read() {
    let env = test_env();
    env.meta.fake_add_job(done_job("alice", "https://blobs.test/a"));
    env.cache.fake_fail_sets();

    let listed = env.service.list_by_owner("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn corrupt_cache_entry_falls_back_to_the_store() {
    let env = test_env();
    env.meta.fake_add_job(done_job("alice", "https://blobs.test/a"));
    env.cache.fake_put_raw("pictures:alice", "{{{ not json");

    let listed = env.service.list_by_owner("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(env.meta.fake_list_calls(), 1);
}

#[tokio::test]
async fn incomplete_jobs_without_collage_key_are_listed_untouched() {
    let env = test_env();
    // Upload-stage job: no keys assigned yet
    let job = Job::new("alice", JobOptions::default());
    env.meta.fake_add_job(job.clone());

    let listed = env.service.list_by_owner("alice").await.unwrap();
    assert_eq!(listed[0].collage_url, "");
    assert_eq!(listed[0].status, JobStatus::Uploaded);
    assert_eq!(env.meta.fake_update_calls(), 0);
}

use crate::meta::{
    FakeMetadataStore, Job, JobOptions, JobOptionsPatch, JobPatch, JobStatus, MetadataError,
    MetadataStore,
};
use uuid::Uuid;

fn sample_job(owner: &str) -> Job {
    Job::new(owner, JobOptions::default())
}

#[tokio::test]
async fn create_then_get_roundtrips() {
    let store = FakeMetadataStore::new();
    let job = sample_job("alice");

    store.create_job(&job).await.unwrap();
    let fetched = store.get_job(job.id).await.unwrap();

    assert_eq!(fetched, job);
    assert_eq!(fetched.status, JobStatus::Uploaded);
    assert_eq!(fetched.progress, 0);
}

#[tokio::test]
async fn get_unknown_job_is_not_found() {
    let store = FakeMetadataStore::new();
    let err = store.get_job(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_applies_only_set_fields() {
    let store = FakeMetadataStore::new();
    let job = sample_job("alice");
    store.create_job(&job).await.unwrap();

    store
        .update_job(
            job.id,
            JobPatch {
                status: Some(JobStatus::ProcessingStarted),
                progress: Some(10),
                ..JobPatch::default()
            },
        )
        .await
        .unwrap();

    let updated = store.get_job(job.id).await.unwrap();
    assert_eq!(updated.status, JobStatus::ProcessingStarted);
    assert_eq!(updated.progress, 10);
    // Untouched fields survive
    assert_eq!(updated.owner, "alice");
    assert_eq!(updated.options, job.options);
    assert_eq!(updated.collage_url, "");
}

#[tokio::test]
async fn update_unknown_job_is_not_found() {
    let store = FakeMetadataStore::new();
    let err = store
        .update_job(
            Uuid::new_v4(),
            JobPatch {
                progress: Some(10),
                ..JobPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MetadataError::JobNotFound(_)));
}

#[tokio::test]
async fn list_by_owner_filters_and_counts_calls() {
    let store = FakeMetadataStore::new();
    let mine = sample_job("alice");
    let other = sample_job("bob");
    store.create_job(&mine).await.unwrap();
    store.create_job(&other).await.unwrap();

    let listed = store.list_by_owner("alice").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, mine.id);
    assert_eq!(store.fake_list_calls(), 1);
}

#[tokio::test]
async fn checkpoint_history_skips_url_only_patches() {
    let store = FakeMetadataStore::new();
    let job = sample_job("alice");
    store.create_job(&job).await.unwrap();

    store
        .update_job(
            job.id,
            JobPatch {
                status: Some(JobStatus::ProcessingStarted),
                progress: Some(10),
                ..JobPatch::default()
            },
        )
        .await
        .unwrap();
    store
        .update_job(
            job.id,
            JobPatch {
                resized_url: Some("https://blobs.test/x".to_string()),
                ..JobPatch::default()
            },
        )
        .await
        .unwrap();
    store
        .update_job(
            job.id,
            JobPatch {
                status: Some(JobStatus::ImageResized),
                progress: Some(20),
                ..JobPatch::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(
        store.fake_checkpoints(job.id),
        vec![
            (JobStatus::ProcessingStarted, 10),
            (JobStatus::ImageResized, 20)
        ]
    );
    assert_eq!(store.fake_update_calls(), 3);
}

#[test]
fn options_merge_prefers_override_per_field() {
    let stored = JobOptions::default();
    let merged = stored.merged(&JobOptionsPatch {
        collage_rows: Some(3),
        output_width: Some(600),
        ..JobOptionsPatch::default()
    });

    assert_eq!(merged.collage_rows, 3);
    assert_eq!(merged.output_width, 600);
    // Fields without an override keep the stored value
    assert_eq!(merged.collage_cols, stored.collage_cols);
    assert_eq!(merged.resize_width, stored.resize_width);
}

#[test]
fn status_strings_roundtrip() {
    for status in [
        JobStatus::Uploaded,
        JobStatus::ProcessingStarted,
        JobStatus::ImageResized,
        JobStatus::CreatingCollage,
        JobStatus::Done,
        JobStatus::Failed,
    ] {
        let parsed: JobStatus = status.as_str().parse().unwrap();
        assert_eq!(parsed, status);
    }
    assert!("Resizing".parse::<JobStatus>().is_err());
}

use crate::blob::BlobStore;
use crate::compositor::{self, CollageCanvas};
use crate::config::ProcessingConfig;
use crate::meta::{Job, JobOptions, JobOptionsPatch, JobPatch, MetadataStore};
use crate::pipeline::error::ProcessError;
use crate::pipeline::state;
use anyhow::Result;
use image::{GenericImageView, ImageFormat};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Outcome of a successful upload: the new job and its raw artifact key
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub job_id: Uuid,
    pub raw_key: String,
}

/// Outcome of a successful processing run. Either URL may be empty when
/// signing failed; the artifacts themselves are durably stored regardless.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub resized_url: String,
    pub collage_url: String,
}

enum UrlField {
    Resized,
    Collage,
}

/// The job lifecycle engine. Owns the upload and processing operations and
/// drives every durable checkpoint through the state machine in
/// [`crate::pipeline::state`].
///
/// One processing run executes on a single logical worker; runs for
/// different jobs share no mutable state. Concurrent runs for the same job
/// are a caller hazard and resolve to last-write-wins in the metadata store.
pub struct Engine<M, B> {
    meta: Arc<M>,
    blobs: Arc<B>,
    format: ImageFormat,
    extension: &'static str,
    content_type: String,
    signed_url_ttl_secs: u64,
}

impl<M: MetadataStore, B: BlobStore> Engine<M, B> {
    pub fn new(meta: Arc<M>, blobs: Arc<B>, processing: &ProcessingConfig) -> Result<Self> {
        Ok(Engine {
            meta,
            blobs,
            format: processing.image_format()?,
            extension: processing.extension()?,
            content_type: processing.content_type()?,
            signed_url_ttl_secs: processing.signed_url_ttl_secs,
        })
    }

    /// Create a job record and durably store the raw upload.
    ///
    /// The three artifact keys are derived from the job id with fixed
    /// prefixes, so they are deterministic and collision-free per job. If
    /// the blob write fails the record stays in Uploaded with no artifact
    /// present; a retry overwrites the same key safely.
    pub async fn start_upload(
        &self,
        owner: &str,
        raw_bytes: bytes::Bytes,
        overrides: JobOptionsPatch,
    ) -> Result<UploadReceipt, ProcessError> {
        let options = JobOptions::default().merged(&overrides);
        validate_options(&options)?;

        let job = Job::new(owner, options);
        let raw_key = format!("{}.{}", job.id, self.extension);
        let resized_key = format!("processed-{}.{}", job.id, self.extension);
        let collage_key = format!("collage-{}.{}", job.id, self.extension);
        let raw_size = raw_bytes.len() as i64;

        self.meta.create_job(&job).await?;
        info!("Created job {} for owner {}", job.id, owner);

        if let Err(e) = self
            .blobs
            .put_object(&raw_key, raw_bytes, &self.content_type)
            .await
        {
            warn!(
                "Raw upload for job {} failed, record left in Uploaded: {}",
                job.id, e
            );
            return Err(e.into());
        }

        self.meta
            .update_job(
                job.id,
                JobPatch {
                    raw_key: Some(raw_key.clone()),
                    resized_key: Some(resized_key),
                    collage_key: Some(collage_key),
                    raw_size_bytes: Some(raw_size),
                    ..JobPatch::default()
                },
            )
            .await?;

        Ok(UploadReceipt {
            job_id: job.id,
            raw_key,
        })
    }

    /// Run the resize-then-collage pipeline for a job.
    ///
    /// Any hard failure marks the job Failed while leaving the last
    /// persisted progress in place as the durable checkpoint. A retry
    /// re-executes from the top; every step overwrites its artifact key
    /// idempotently.
    pub async fn process(
        &self,
        job_id: Uuid,
        overrides: JobOptionsPatch,
    ) -> Result<ProcessOutcome, ProcessError> {
        let job = self.meta.get_job(job_id).await?;
        let options = job.options.merged(&overrides);
        validate_options(&options)?;

        let mut snapshot = job;
        match self.run_pipeline(&mut snapshot, &options).await {
            Ok(outcome) => {
                info!("Job {} processed successfully", job_id);
                Ok(outcome)
            }
            Err(err) => {
                error!("Job {} failed: {}", job_id, err);
                self.mark_failed(&snapshot).await;
                Err(err)
            }
        }
    }

    async fn run_pipeline(
        &self,
        snapshot: &mut Job,
        options: &JobOptions,
    ) -> Result<ProcessOutcome, ProcessError> {
        self.checkpoint(snapshot, state::processing_started())
            .await?;

        debug!("Fetching raw artifact {}", snapshot.raw_key);
        let raw = self.blobs.get_object(&snapshot.raw_key).await?;

        let source = compositor::decode(&raw)?;
        let (natural_width, natural_height) = source.dimensions();

        let resized = compositor::resize(&source, options.resize_width, options.resize_height);
        let encoded = compositor::encode(&resized, self.format)?;
        self.blobs
            .put_object(&snapshot.resized_key, encoded.into(), &self.content_type)
            .await?;
        let resized_url = self.sign_and_persist(snapshot, UrlField::Resized).await;

        self.checkpoint(snapshot, state::image_resized(natural_width, natural_height))
            .await?;

        let mut canvas = CollageCanvas::new(
            options.collage_rows,
            options.collage_cols,
            options.resize_width,
            options.resize_height,
        )?;
        let total = canvas.tile_count();
        for (index, (row, col)) in canvas.cells().into_iter().enumerate() {
            canvas.place(&resized, row, col);
            self.checkpoint(snapshot, state::collage_tile(index as u32 + 1, total))
                .await?;
        }

        let collage_bytes = compositor::encode(&canvas.into_image(), self.format)?;
        self.blobs
            .put_object(&snapshot.collage_key, collage_bytes.into(), &self.content_type)
            .await?;
        let collage_url = self.sign_and_persist(snapshot, UrlField::Collage).await;

        self.checkpoint(snapshot, state::done()).await?;

        Ok(ProcessOutcome {
            resized_url,
            collage_url,
        })
    }

    /// Validate a checkpoint against the state machine, persist it, and
    /// advance the in-memory snapshot.
    async fn checkpoint(&self, snapshot: &mut Job, patch: JobPatch) -> Result<(), ProcessError> {
        let next = state::advance(snapshot, &patch)?;
        self.meta.update_job(snapshot.id, patch).await?;
        *snapshot = next;
        Ok(())
    }

    /// Best-effort URL signing and persistence. A failure at either step is
    /// logged and tolerated; the URL stays empty for later backfill.
    async fn sign_and_persist(&self, snapshot: &mut Job, field: UrlField) -> String {
        let key = match field {
            UrlField::Resized => &snapshot.resized_key,
            UrlField::Collage => &snapshot.collage_key,
        };

        let url = match self.blobs.signed_url(key, self.signed_url_ttl_secs).await {
            Ok(url) => url,
            Err(e) => {
                warn!("Signing URL for {} failed (non-fatal): {}", key, e);
                return String::new();
            }
        };

        let patch = match field {
            UrlField::Resized => JobPatch {
                resized_url: Some(url.clone()),
                ..JobPatch::default()
            },
            UrlField::Collage => JobPatch {
                collage_url: Some(url.clone()),
                ..JobPatch::default()
            },
        };

        if let Err(e) = self.meta.update_job(snapshot.id, patch).await {
            warn!(
                "Persisting signed URL for {} failed (non-fatal): {}",
                key, e
            );
            return url;
        }

        match field {
            UrlField::Resized => snapshot.resized_url = url.clone(),
            UrlField::Collage => snapshot.collage_url = url.clone(),
        }
        url
    }

    /// Move the job to Failed without touching progress, so polling clients
    /// observe the last good checkpoint frozen in place.
    async fn mark_failed(&self, snapshot: &Job) {
        if snapshot.status.is_terminal() {
            return;
        }
        if let Err(e) = self.meta.update_job(snapshot.id, state::failed()).await {
            error!("Could not mark job {} as failed: {}", snapshot.id, e);
        }
    }
}

fn validate_options(options: &JobOptions) -> Result<(), ProcessError> {
    let fields = [
        ("resize_width", options.resize_width),
        ("resize_height", options.resize_height),
        ("collage_rows", options.collage_rows),
        ("collage_cols", options.collage_cols),
        ("output_width", options.output_width),
        ("output_height", options.output_height),
    ];
    for (name, value) in fields {
        if value == 0 {
            return Err(ProcessError::ValidationError(format!(
                "{name} must be positive"
            )));
        }
    }
    Ok(())
}

use crate::meta::error::MetadataError;
use crate::meta::models::{Job, JobPatch};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// MetadataStore trait defining the interface for the job record store.
///
/// The store is the single source of truth for job state. Updates apply
/// only the fields set on the patch, with last-write-wins semantics.
#[async_trait]
pub trait MetadataStore: Send + Sync + 'static {
    /// Insert a newly created job record
    async fn create_job(&self, job: &Job) -> Result<(), MetadataError>;

    /// Fetch a job by its identifier
    async fn get_job(&self, id: Uuid) -> Result<Job, MetadataError>;

    /// Apply a partial update to a stored job
    async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<(), MetadataError>;

    /// Fetch all jobs belonging to an owner, oldest first
    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Job>, MetadataError>;
}

/// Implementation of MetadataStore for Arc<T>, allowing the engine and the
/// query service to share one store handle.
#[async_trait]
impl<T: MetadataStore + ?Sized> MetadataStore for Arc<T> {
    async fn create_job(&self, job: &Job) -> Result<(), MetadataError> {
        (**self).create_job(job).await
    }

    async fn get_job(&self, id: Uuid) -> Result<Job, MetadataError> {
        (**self).get_job(id).await
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<(), MetadataError> {
        (**self).update_job(id, patch).await
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Job>, MetadataError> {
        (**self).list_by_owner(owner).await
    }
}

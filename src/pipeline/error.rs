use crate::blob::BlobStoreError;
use crate::compositor::CompositorError;
use crate::meta::MetadataError;
use crate::pipeline::state::StateError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced to callers of the job lifecycle engine
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Invalid processing options: {0}")]
    ValidationError(String),

    #[error("Transient store failure, retryable: {0}")]
    TransientIo(String),

    #[error("Processing failed: {0}")]
    ProcessingFailure(String),
}

impl From<MetadataError> for ProcessError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::JobNotFound(id) => ProcessError::JobNotFound(id),
            other => ProcessError::TransientIo(other.to_string()),
        }
    }
}

impl From<BlobStoreError> for ProcessError {
    fn from(err: BlobStoreError) -> Self {
        match err {
            // A missing artifact is not retryable-as-is; the pipeline run is lost
            BlobStoreError::ObjectNotFound(key) => {
                ProcessError::ProcessingFailure(format!("artifact {key} not found"))
            }
            other => ProcessError::TransientIo(other.to_string()),
        }
    }
}

impl From<CompositorError> for ProcessError {
    fn from(err: CompositorError) -> Self {
        ProcessError::ProcessingFailure(err.to_string())
    }
}

impl From<StateError> for ProcessError {
    fn from(err: StateError) -> Self {
        ProcessError::ProcessingFailure(err.to_string())
    }
}

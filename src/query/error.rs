use crate::meta::MetadataError;
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced to callers of the query service
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("No jobs found for owner {0}")]
    OwnerNotFound(String),

    #[error("Metadata store failure: {0}")]
    Metadata(String),
}

impl From<MetadataError> for QueryError {
    fn from(err: MetadataError) -> Self {
        match err {
            MetadataError::JobNotFound(id) => QueryError::JobNotFound(id),
            other => QueryError::Metadata(other.to_string()),
        }
    }
}

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with the metadata store
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Failed to connect to metadata store: {0}")]
    ConnectionError(String),

    #[error("Job {0} not found")]
    JobNotFound(Uuid),

    #[error("Query execution failed: {0}")]
    QueryError(String),

    #[error("Failed to deserialize job record: {0}")]
    DeserializationError(String),

    #[error("Other metadata store error: {0}")]
    Other(#[from] anyhow::Error),
}

impl MetadataError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetadataError::JobNotFound(_))
    }
}

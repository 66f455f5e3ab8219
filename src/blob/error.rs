use thiserror::Error;

/// Errors that can occur when interacting with blob storage
#[derive(Error, Debug)]
pub enum BlobStoreError {
    #[error("Failed to connect to blob storage: {0}")]
    ConnectionError(String),

    #[error("Object with key {0} not found")]
    ObjectNotFound(String),

    #[error("Access denied for object {0}: {1}")]
    AccessDenied(String, String),

    #[error("Failed to read object {0}: {1}")]
    ReadError(String, String),

    #[error("Failed to write object {0}: {1}")]
    WriteError(String, String),

    #[error("Failed to sign URL for object {0}: {1}")]
    SigningError(String, String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Other storage error: {0}")]
    Other(#[from] anyhow::Error),
}

impl BlobStoreError {
    /// True when the error means the referenced key does not exist,
    /// as opposed to a transient service failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlobStoreError::ObjectNotFound(_))
    }
}

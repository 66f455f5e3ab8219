use thiserror::Error;

/// Errors that can occur when interacting with the listing cache.
///
/// Callers never propagate these: a failed read is a miss, a failed write
/// is dropped. The variants exist so fakes can exercise both paths.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache read failed for key {0}: {1}")]
    ReadError(String, String),

    #[error("Cache write failed for key {0}: {1}")]
    WriteError(String, String),
}

pub mod error;
pub mod fake;
pub mod s3;
pub mod store;
#[cfg(test)]
mod tests;

pub use error::BlobStoreError;
pub use fake::FakeBlobStore;
pub use s3::S3BlobStore;
pub use store::BlobStore;

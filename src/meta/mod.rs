pub mod error;
pub mod fake;
pub mod models;
pub mod postgres;
pub mod store;
#[cfg(test)]
mod tests;

pub use error::MetadataError;
pub use fake::FakeMetadataStore;
pub use models::{Job, JobOptions, JobOptionsPatch, JobPatch, JobStatus};
pub use postgres::PostgresMetadataStore;
pub use store::MetadataStore;

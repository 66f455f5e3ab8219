pub mod error;
pub mod service;
#[cfg(test)]
mod tests;

pub use error::QueryError;
pub use service::{ProgressReport, QueryService};

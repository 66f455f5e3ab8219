pub mod engine;
pub mod error;
pub mod state;

pub use engine::{Engine, ProcessOutcome, UploadReceipt};
pub use error::ProcessError;

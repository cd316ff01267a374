pub mod error;
pub mod message;
pub mod worker;

pub use error::WorkerError;
pub use message::{Action, HandleOutcome, InboundMessage};
pub use worker::{UploadEventWorker, WorkerConfig};

pub mod error;
pub mod format;
pub mod poll;
pub mod progress;
pub mod resources;
pub mod runner;
pub mod service;
pub mod submit;
pub mod time;

#[cfg(test)]
mod test_utils;

pub use error::{ErrorKind, QueryError};
pub use format::{format_rows, FormatError, OutputFormat};
pub use poll::{await_completion, PollSettings};
pub use progress::{ProgressUpdate, QueryObserver, SilentObserver};
pub use resources::{validate, ResolvedResources, MAX_RESOURCES};
pub use runner::{QueryOutcome, QueryRunner, QuerySpec};
pub use service::{QueryService, ResourceCatalog, ServiceError};
pub use submit::submit;

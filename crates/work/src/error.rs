//! Errors raised while selecting, batching and dispatching work.

use addons_storage::StorageError;

/// Result type for batch processing operations.
pub type Result<T> = std::result::Result<T, WorkError>;

/// Errors that stop a batch run before or during dispatch.
#[derive(Debug, thiserror::Error)]
pub enum WorkError {
    /// Task name missing or not in the catalog
    #[error(transparent)]
    InvalidTask(#[from] InvalidTaskError),

    /// Invalid batch parameters
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Datastore failure during selection
    #[error("Selection failed: {0}")]
    Storage(#[from] StorageError),

    /// Backend refused a unit of work
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// The requested task does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", describe_invalid_task(.name.as_deref()))]
pub struct InvalidTaskError {
    /// Name that was asked for, `None` when no task was given
    pub name: Option<String>,
}

fn describe_invalid_task(name: Option<&str>) -> String {
    let valid = crate::TaskName::ALL
        .iter()
        .map(|t| t.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    match name {
        Some(name) => format!("Unknown task \"{}\". Valid tasks: {}", name, valid),
        None => format!("No task given. Valid tasks: {}", valid),
    }
}

/// Batch parameters are unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid configuration: {0}")]
pub struct ConfigurationError(pub String);

impl ConfigurationError {
    /// Create a configuration error.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A backend could not accept a unit of work.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Backend rejected submission: {0}")]
pub struct BackendError(pub String);

/// Failure inside a worker. Never reaches the dispatcher; backends log it.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Record missing at execution time
    #[error("Not found: {0}")]
    NotFound(String),

    /// External collaborator (signing, rendering, ...) failed
    #[error("{service} failed: {message}")]
    Collaborator {
        /// Which collaborator
        service: &'static str,
        /// What went wrong
        message: String,
    },
}

//! Batch add-on processing (Layer 2)
//!
//! Selects the add-ons a task applies to, splits them into chunks and hands
//! each chunk to a task backend.

#![warn(missing_docs)]

pub mod backend;
pub mod batch;
pub mod catalog;
pub mod collaborators;
pub mod command;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod selector;
pub mod task;
pub mod worker;

#[cfg(test)]
mod testing;

pub use backend::{
    InlineBackend, RecordingBackend, SubmissionId, SubmissionRecord, TaskBackend, TokioBackend,
    UnitOfWork,
};
pub use batch::chunk;
pub use catalog::{TaskCatalog, TaskDescriptor, DEFAULT_BATCH_SIZE};
pub use collaborators::{ColorExtractor, PreviewRenderer, SignOptions, Signer, Unconfigured};
pub use command::{DispatchOptions, DispatchReport, ProcessAddons, Stage};
pub use context::WorkerContext;
pub use dispatch::dispatch;
pub use error::{
    BackendError, ConfigurationError, InvalidTaskError, Result, WorkError, WorkerError,
};
pub use selector::Selector;
pub use task::{TaskKwargs, TaskName};
pub use worker::Worker;

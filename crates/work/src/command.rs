//! The `process_addons` command.
//!
//! Runs one task through its stages:
//!
//! ```text
//! PARSE_ARGS -> VALIDATE_TASK -> SELECT -> LIMIT (optional) -> BATCH -> DISPATCH -> DONE
//! ```
//!
//! The command returns once every chunk has been handed to the backend. It
//! never waits for workers.

use std::sync::Arc;

use addons_storage::SharedStorage;
use serde::Serialize;
use tracing::{debug, info};

use crate::backend::{SubmissionRecord, TaskBackend};
use crate::batch::chunk;
use crate::catalog::TaskCatalog;
use crate::dispatch::dispatch;
use crate::error::{ConfigurationError, Result};
use crate::task::TaskName;

/// Options of one command run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Task name as given on the command line
    pub task: Option<String>,

    /// Only process the first N selected add-ons
    pub limit: Option<usize>,

    /// Override the task's batch size
    pub batch_size: Option<usize>,

    /// Also select soft-deleted and disabled add-ons
    pub with_deleted: bool,
}

impl DispatchOptions {
    /// Options for running `task` with its defaults.
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: Some(task.into()),
            ..Self::default()
        }
    }

    /// Set limit.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Set whether hidden add-ons are selected.
    pub fn with_deleted(mut self, with_deleted: bool) -> Self {
        self.with_deleted = with_deleted;
        self
    }
}

/// Command stages, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    /// Options received
    ParseArgs,
    /// Task name resolved against the catalog
    ValidateTask,
    /// Eligible add-ons selected
    Select,
    /// Selection truncated
    Limit,
    /// Selection split into chunks
    Batch,
    /// Chunks handed to the backend
    Dispatch,
    /// Finished
    Done,
}

/// What a run did.
#[derive(Debug, Clone, Serialize)]
pub struct DispatchReport {
    /// Task that ran
    pub task: TaskName,
    /// Add-ons selected, after the limit
    pub selected: usize,
    /// Batch size used
    pub batch_size: usize,
    /// One record per submitted chunk
    pub submissions: Vec<SubmissionRecord>,
    /// Stages passed through
    pub stages: Vec<Stage>,
}

impl DispatchReport {
    /// Number of chunks submitted.
    pub fn chunks(&self) -> usize {
        self.submissions.len()
    }
}

/// The batch processing command.
pub struct ProcessAddons<'a> {
    catalog: &'a TaskCatalog,
    storage: SharedStorage,
    backend: Arc<dyn TaskBackend>,
}

impl<'a> ProcessAddons<'a> {
    /// Create the command.
    pub fn new(
        catalog: &'a TaskCatalog,
        storage: SharedStorage,
        backend: Arc<dyn TaskBackend>,
    ) -> Self {
        Self {
            catalog,
            storage,
            backend,
        }
    }

    /// Run one task.
    pub async fn run(&self, options: &DispatchOptions) -> Result<DispatchReport> {
        let mut stages = vec![Stage::ParseArgs];

        let descriptor = self.catalog.resolve(options.task.as_deref())?;
        let batch_size = options.batch_size.unwrap_or(descriptor.batch_size);
        if batch_size == 0 {
            return Err(ConfigurationError::new("batch size must be greater than zero").into());
        }
        stages.push(Stage::ValidateTask);
        debug!("Running {} with batch size {}", descriptor.name, batch_size);

        let mut ids = {
            let storage = self.storage.lock().await;
            descriptor.selector.select(&*storage, options.with_deleted).await?
        };
        stages.push(Stage::Select);

        if let Some(limit) = options.limit {
            ids.truncate(limit);
            stages.push(Stage::Limit);
        }

        let chunks = chunk(&ids, batch_size)?;
        stages.push(Stage::Batch);
        info!(
            "{}: {} add-ons selected, {} chunks of up to {}",
            descriptor.name,
            ids.len(),
            chunks.len(),
            batch_size
        );

        let kwargs = descriptor.kwargs_for(options.with_deleted);
        let submissions = dispatch(self.backend.as_ref(), descriptor, chunks, &kwargs).await?;
        stages.push(Stage::Dispatch);

        stages.push(Stage::Done);
        Ok(DispatchReport {
            task: descriptor.name,
            selected: ids.len(),
            batch_size,
            submissions,
            stages,
        })
    }
}

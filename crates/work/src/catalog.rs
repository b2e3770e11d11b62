//! Task catalog - the named tasks `process-addons` can run.

use std::collections::BTreeMap;

use addons_core::{AddonType, Time};
use serde::Serialize;

use crate::error::{ConfigurationError, InvalidTaskError};
use crate::selector::Selector;
use crate::task::{TaskKwargs, TaskName};
use crate::worker::Worker;

/// Chunk size used when a task does not set its own.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// 2019-04-04T00:00:00Z. Files created before it carry no COSE signature.
const COSE_CUTOFF_SECS: i64 = 1_554_336_000;

fn cose_cutoff() -> Time {
    Time::UNIX_EPOCH + chrono::Duration::seconds(COSE_CUTOFF_SECS)
}

/// How to run one task: which add-ons, what to do with them, in what chunks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDescriptor {
    /// Task name
    pub name: TaskName,

    /// Eligibility predicate
    #[serde(skip)]
    pub selector: Selector,

    /// Function applied to each chunk
    pub worker: Worker,

    /// Default chunk size
    pub batch_size: usize,

    /// Options always forwarded to the worker
    pub kwargs: TaskKwargs,

    /// Whether the worker honours `with_deleted`
    pub accepts_with_deleted: bool,
}

impl TaskDescriptor {
    /// Create a descriptor with the default batch size and no options.
    pub fn new(name: TaskName, selector: Selector, worker: Worker) -> Self {
        Self {
            name,
            selector,
            worker,
            batch_size: DEFAULT_BATCH_SIZE,
            kwargs: TaskKwargs::default(),
            accepts_with_deleted: false,
        }
    }

    /// Set default batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Set options forwarded to every chunk.
    pub fn with_kwargs(mut self, kwargs: TaskKwargs) -> Self {
        self.kwargs = kwargs;
        self
    }

    /// Forward `with_deleted` to the worker.
    pub fn accepting_with_deleted(mut self) -> Self {
        self.accepts_with_deleted = true;
        self
    }

    /// Options for one run, given the caller's `with_deleted` flag.
    pub fn kwargs_for(&self, with_deleted: bool) -> TaskKwargs {
        let mut kwargs = self.kwargs.clone();
        if self.accepts_with_deleted {
            kwargs.with_deleted = with_deleted;
        }
        kwargs
    }
}

/// Immutable-after-startup registry of tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskCatalog {
    tasks: BTreeMap<TaskName, TaskDescriptor>,
}

impl TaskCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every built-in task.
    pub fn builtin() -> Self {
        let descriptors = [
            TaskDescriptor::new(
                TaskName::ResignAddonsForCose,
                Selector::CurrentFileCreatedBefore { before: cose_cutoff() },
                Worker::SignAddons,
            )
            .with_kwargs(TaskKwargs {
                reason: Some("expiry".to_string()),
                send_emails: false,
                ..TaskKwargs::default()
            }),
            TaskDescriptor::new(
                TaskName::RecreatePreviews,
                Selector::OfType(AddonType::StaticTheme),
                Worker::RecreatePreviews,
            ),
            TaskDescriptor::new(
                TaskName::RecalculatePostReviewWeight,
                Selector::PendingConfirmation,
                Worker::RecalculatePostReviewWeight,
            ),
            TaskDescriptor::new(
                TaskName::ConstantlyRecalculatePostReviewWeight,
                Selector::PendingConfirmationWithRecentFeedback,
                Worker::RecalculatePostReviewWeight,
            ),
            TaskDescriptor::new(
                TaskName::ExtractColorsFromStaticThemes,
                Selector::OfType(AddonType::StaticTheme),
                Worker::ExtractColorsFromStaticThemes,
            ),
            TaskDescriptor::new(
                TaskName::DeleteObsoleteAddons,
                Selector::Obsolete,
                Worker::DeleteAddons,
            )
            .accepting_with_deleted(),
            TaskDescriptor::new(
                TaskName::UpdateRatingAggregates,
                Selector::All,
                Worker::UpdateRatingAggregates,
            ),
            TaskDescriptor::new(
                TaskName::DeleteListThemePreviews,
                Selector::OfType(AddonType::StaticTheme),
                Worker::DeleteListThemePreviews,
            ),
            TaskDescriptor::new(
                TaskName::DisableBlockedAddons,
                Selector::FullyBlocked,
                Worker::DisableAddons,
            ),
        ];

        let mut catalog = Self::new();
        for descriptor in descriptors {
            catalog.tasks.insert(descriptor.name, descriptor);
        }
        catalog
    }

    /// Add a task. Fails on a duplicate name or a zero batch size.
    pub fn register(&mut self, descriptor: TaskDescriptor) -> Result<(), ConfigurationError> {
        if descriptor.batch_size == 0 {
            return Err(ConfigurationError::new(format!(
                "task {} has a zero batch size",
                descriptor.name
            )));
        }
        if self.tasks.contains_key(&descriptor.name) {
            return Err(ConfigurationError::new(format!(
                "task {} is already registered",
                descriptor.name
            )));
        }
        self.tasks.insert(descriptor.name, descriptor);
        Ok(())
    }

    /// Descriptor of a task.
    pub fn get(&self, name: TaskName) -> Option<&TaskDescriptor> {
        self.tasks.get(&name)
    }

    /// Look up a task by its command-line name.
    pub fn resolve(&self, name: Option<&str>) -> Result<&TaskDescriptor, InvalidTaskError> {
        let Some(raw) = name else {
            return Err(InvalidTaskError { name: None });
        };
        let task: TaskName = raw.parse()?;
        self.get(task).ok_or_else(|| InvalidTaskError {
            name: Some(raw.to_string()),
        })
    }

    /// Registered descriptors, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &TaskDescriptor> {
        self.tasks.values()
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no task is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

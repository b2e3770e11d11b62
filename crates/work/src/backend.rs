//! Task backends - where units of work end up once dispatched.
//!
//! The dispatcher only enqueues. A backend decides when and where a unit
//! actually runs: right away on the caller ([`InlineBackend`]), on the tokio
//! runtime ([`TokioBackend`]), or nowhere at all ([`RecordingBackend`]).

use std::sync::Arc;

use addons_core::{AddonId, Time};
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::context::WorkerContext;
use crate::error::{BackendError, WorkerError};
use crate::task::{TaskKwargs, TaskName};
use crate::worker::Worker;

/// Identifier of a submitted unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    /// Create a new submission ID
    pub fn new() -> Self {
        Self(format!("sub_{}", ulid::Ulid::new()))
    }
}

impl Default for SubmissionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One chunk of a task, ready to run.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOfWork {
    /// Submission ID
    pub id: SubmissionId,
    /// Task the chunk belongs to
    pub task: TaskName,
    /// Worker to apply
    pub worker: Worker,
    /// Position of the chunk within the run
    pub index: usize,
    /// Add-ons in the chunk
    pub items: Vec<AddonId>,
    /// Options for the worker
    pub kwargs: TaskKwargs,
}

impl UnitOfWork {
    /// Apply the worker to the chunk.
    pub async fn run(&self, ctx: &WorkerContext) -> Result<usize, WorkerError> {
        self.worker.run(ctx, &self.items, &self.kwargs).await
    }

    fn record(&self) -> SubmissionRecord {
        SubmissionRecord {
            id: self.id.clone(),
            task: self.task,
            index: self.index,
            item_count: self.items.len(),
            submitted_at: chrono::Utc::now(),
        }
    }
}

/// Receipt for an accepted unit of work.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionRecord {
    /// Submission ID
    pub id: SubmissionId,
    /// Task name
    pub task: TaskName,
    /// Position of the chunk within the run
    pub index: usize,
    /// Number of add-ons in the chunk
    pub item_count: usize,
    /// When the backend accepted the unit
    pub submitted_at: Time,
}

/// Accepts units of work for execution.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Enqueue `unit`. Returns once the backend has accepted it, not once
    /// it has run.
    async fn submit(&self, unit: UnitOfWork) -> Result<SubmissionRecord, BackendError>;
}

async fn execute(ctx: &WorkerContext, unit: &UnitOfWork) {
    match unit.run(ctx).await {
        Ok(changed) => debug!(
            "Chunk {} of {} done: {}/{} add-ons changed",
            unit.index,
            unit.task,
            changed,
            unit.items.len()
        ),
        Err(e) => error!("Chunk {} of {} failed: {}", unit.index, unit.task, e),
    }
}

/// Runs each unit to completion before accepting the next.
///
/// Holds the storage lock only inside workers, so callers must not hold it
/// while submitting.
#[derive(Debug, Clone)]
pub struct InlineBackend {
    ctx: WorkerContext,
}

impl InlineBackend {
    /// Create an inline backend.
    pub fn new(ctx: WorkerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl TaskBackend for InlineBackend {
    async fn submit(&self, unit: UnitOfWork) -> Result<SubmissionRecord, BackendError> {
        let record = unit.record();
        execute(&self.ctx, &unit).await;
        Ok(record)
    }
}

/// Spawns each unit on the tokio runtime.
///
/// Units run concurrently and in no particular order. Call
/// [`TokioBackend::drain`] before shutting down, or pending units are lost.
#[derive(Debug)]
pub struct TokioBackend {
    ctx: WorkerContext,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TokioBackend {
    /// Create a backend spawning on the current runtime.
    pub fn new(ctx: WorkerContext) -> Self {
        Self {
            ctx,
            handles: Mutex::new(Vec::new()),
        }
    }

    /// Wait for every spawned unit. Returns how many finished without
    /// panicking.
    pub async fn drain(&self) -> usize {
        let handles = std::mem::take(&mut *self.handles.lock().await);
        let total = handles.len();
        let mut finished = 0;

        for handle in handles {
            match handle.await {
                Ok(()) => finished += 1,
                Err(e) => error!("Unit of work aborted: {}", e),
            }
        }

        info!("Drained {}/{} units of work", finished, total);
        finished
    }

    /// Number of spawned units not drained yet.
    pub async fn pending(&self) -> usize {
        self.handles.lock().await.len()
    }
}

#[async_trait]
impl TaskBackend for TokioBackend {
    async fn submit(&self, unit: UnitOfWork) -> Result<SubmissionRecord, BackendError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| BackendError(format!("no tokio runtime: {}", e)))?;

        let record = unit.record();
        let ctx = self.ctx.clone();
        let handle = runtime.spawn(async move { execute(&ctx, &unit).await });
        self.handles.lock().await.push(handle);
        Ok(record)
    }
}

/// Remembers every submission, optionally handing it on to another backend.
#[derive(Default)]
pub struct RecordingBackend {
    inner: Option<Arc<dyn TaskBackend>>,
    submissions: Mutex<Vec<UnitOfWork>>,
}

impl RecordingBackend {
    /// Record submissions without running them.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record submissions, then forward them to `inner`.
    pub fn wrap(inner: Arc<dyn TaskBackend>) -> Self {
        Self {
            inner: Some(inner),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Units submitted so far, in submission order.
    pub async fn submissions(&self) -> Vec<UnitOfWork> {
        self.submissions.lock().await.clone()
    }
}

impl std::fmt::Debug for RecordingBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingBackend")
            .field("forwarding", &self.inner.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TaskBackend for RecordingBackend {
    async fn submit(&self, unit: UnitOfWork) -> Result<SubmissionRecord, BackendError> {
        self.submissions.lock().await.push(unit.clone());
        match &self.inner {
            Some(inner) => inner.submit(unit).await,
            None => Ok(unit.record()),
        }
    }
}

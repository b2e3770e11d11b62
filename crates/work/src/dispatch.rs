//! Task dispatcher.

use addons_core::AddonId;
use tracing::info;

use crate::backend::{SubmissionId, SubmissionRecord, TaskBackend, UnitOfWork};
use crate::catalog::TaskDescriptor;
use crate::error::BackendError;
use crate::task::TaskKwargs;

/// Submit one unit of work per chunk, in chunk order.
///
/// Returns as soon as the backend has accepted every unit. Stops at the
/// first refused submission; units submitted before it stay submitted.
pub async fn dispatch(
    backend: &dyn TaskBackend,
    descriptor: &TaskDescriptor,
    chunks: Vec<Vec<AddonId>>,
    kwargs: &TaskKwargs,
) -> Result<Vec<SubmissionRecord>, BackendError> {
    let mut records = Vec::with_capacity(chunks.len());

    for (index, items) in chunks.into_iter().enumerate() {
        info!("[{}@{}] Submitting {}", items.len(), index, descriptor.name);
        let unit = UnitOfWork {
            id: SubmissionId::new(),
            task: descriptor.name,
            worker: descriptor.worker,
            index,
            items,
            kwargs: kwargs.clone(),
        };
        records.push(backend.submit(unit).await?);
    }

    Ok(records)
}

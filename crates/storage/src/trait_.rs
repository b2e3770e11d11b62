//! Storage trait abstraction.

use std::sync::Arc;

use addons_core::{
    AbuseReport, Addon, AddonId, AddonStatus, AddonType, AutoApprovalSummary, Block, DeniedGuid,
    PreviewId, PreviewSizes, Rating, RatingAggregate, Version, VersionId, VersionPreview,
};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Storage handle shared between the command and the workers it schedules.
pub type SharedStorage = Arc<Mutex<dyn Storage>>;

/// Wrap a storage backend so it can be shared with workers.
pub fn shared<S: Storage + 'static>(storage: S) -> SharedStorage {
    Arc::new(Mutex::new(storage))
}

/// Filter for listing add-ons.
///
/// By default hidden add-ons (soft-deleted or admin-disabled) are left out,
/// mirroring the marketplace's default manager.
#[derive(Debug, Clone, Default)]
pub struct AddonFilter {
    /// Include soft-deleted and disabled add-ons
    pub with_deleted: bool,

    /// Restrict to these kinds
    pub types: Option<Vec<AddonType>>,

    /// Restrict to these statuses
    pub statuses: Option<Vec<AddonStatus>>,
}

impl AddonFilter {
    /// Filter matching every visible add-on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Include hidden add-ons.
    pub fn with_deleted(mut self, with_deleted: bool) -> Self {
        self.with_deleted = with_deleted;
        self
    }

    /// Restrict to the given kinds.
    pub fn with_types(mut self, types: impl Into<Vec<AddonType>>) -> Self {
        self.types = Some(types.into());
        self
    }

    /// Restrict to the given statuses.
    pub fn with_statuses(mut self, statuses: impl Into<Vec<AddonStatus>>) -> Self {
        self.statuses = Some(statuses.into());
        self
    }

    /// Whether `addon` passes the filter.
    pub fn matches(&self, addon: &Addon) -> bool {
        if !self.with_deleted && addon.is_hidden() {
            return false;
        }
        if let Some(types) = &self.types {
            if !types.contains(&addon.addon_type) {
                return false;
            }
        }
        if let Some(statuses) = &self.statuses {
            if !statuses.contains(&addon.status) {
                return false;
            }
        }
        true
    }
}

/// Storage abstraction for marketplace records.
///
/// Listing operations return records ordered by ascending primary key so
/// callers get a stable order for a fixed datastore state.
#[async_trait]
pub trait Storage: Send + Sync {
    // === Add-on operations ===

    /// Save an add-on (create or update).
    async fn save_addon(&mut self, addon: &Addon) -> Result<()>;

    /// Load an add-on by ID, hidden or not.
    async fn load_addon(&self, id: AddonId) -> Result<Option<Addon>>;

    /// List add-ons matching the filter.
    async fn list_addons(&self, filter: &AddonFilter) -> Result<Vec<Addon>>;

    /// Permanently delete an add-on together with its versions, summaries,
    /// previews, ratings and aggregate.
    async fn delete_addon(&mut self, id: AddonId) -> Result<()>;

    // === Version operations ===

    /// Save a version.
    async fn save_version(&mut self, version: &Version) -> Result<()>;

    /// Load a version by ID.
    async fn load_version(&self, id: VersionId) -> Result<Option<Version>>;

    /// List the versions of an add-on.
    async fn list_versions(&self, addon: AddonId) -> Result<Vec<Version>>;

    // === Auto-approval summaries ===

    /// Save the summary of a version.
    async fn save_summary(&mut self, summary: &AutoApprovalSummary) -> Result<()>;

    /// Load the summary of a version.
    async fn load_summary(&self, version: VersionId) -> Result<Option<AutoApprovalSummary>>;

    // === Ratings ===

    /// Save a rating.
    async fn save_rating(&mut self, rating: &Rating) -> Result<()>;

    /// List the ratings of an add-on, deleted ones included.
    async fn list_ratings(&self, addon: AddonId) -> Result<Vec<Rating>>;

    /// Save the rating aggregate of an add-on.
    async fn save_rating_aggregate(&mut self, aggregate: &RatingAggregate) -> Result<()>;

    /// Load the rating aggregate of an add-on.
    async fn load_rating_aggregate(&self, addon: AddonId) -> Result<Option<RatingAggregate>>;

    // === Abuse reports ===

    /// Save an abuse report.
    async fn save_abuse_report(&mut self, report: &AbuseReport) -> Result<()>;

    /// List all abuse reports, deleted ones included.
    async fn list_abuse_reports(&self) -> Result<Vec<AbuseReport>>;

    // === Blocklist ===

    /// Save a block, replacing any block on the same guid.
    async fn save_block(&mut self, block: &Block) -> Result<()>;

    /// List all blocks.
    async fn list_blocks(&self) -> Result<Vec<Block>>;

    /// Deny a guid. Returns `false` when it was already denied.
    async fn save_denied_guid(&mut self, denied: &DeniedGuid) -> Result<bool>;

    /// List denied guids.
    async fn list_denied_guids(&self) -> Result<Vec<DeniedGuid>>;

    // === Previews ===

    /// Create a preview for a version, allocating its ID.
    async fn create_preview(
        &mut self,
        version: VersionId,
        sizes: PreviewSizes,
    ) -> Result<VersionPreview>;

    /// Save an existing preview.
    async fn save_preview(&mut self, preview: &VersionPreview) -> Result<()>;

    /// List the previews of a version.
    async fn list_previews(&self, version: VersionId) -> Result<Vec<VersionPreview>>;

    /// Delete a preview.
    async fn delete_preview(&mut self, id: PreviewId) -> Result<()>;
}

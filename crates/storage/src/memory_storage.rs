//! In-memory storage implementation.
//!
//! Keeps every record in ordered maps. Used by tests and by one-off runs
//! against a dataset loaded up front.

use std::collections::BTreeMap;

use addons_core::{
    AbuseReport, AbuseReportId, Addon, AddonId, AutoApprovalSummary, Block, DeniedGuid, PreviewId,
    PreviewSizes, Rating, RatingAggregate, RatingId, Version, VersionId, VersionPreview,
};
use async_trait::async_trait;

use super::{AddonFilter, Result, Storage};

/// Storage backend holding everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    addons: BTreeMap<AddonId, Addon>,
    versions: BTreeMap<VersionId, Version>,
    summaries: BTreeMap<VersionId, AutoApprovalSummary>,
    ratings: BTreeMap<RatingId, Rating>,
    aggregates: BTreeMap<AddonId, RatingAggregate>,
    abuse_reports: BTreeMap<AbuseReportId, AbuseReport>,
    blocks: BTreeMap<String, Block>,
    denied_guids: BTreeMap<String, DeniedGuid>,
    previews: BTreeMap<PreviewId, VersionPreview>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of previews across all versions.
    pub fn preview_count(&self) -> usize {
        self.previews.len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save_addon(&mut self, addon: &Addon) -> Result<()> {
        self.addons.insert(addon.id, addon.clone());
        Ok(())
    }

    async fn load_addon(&self, id: AddonId) -> Result<Option<Addon>> {
        Ok(self.addons.get(&id).cloned())
    }

    async fn list_addons(&self, filter: &AddonFilter) -> Result<Vec<Addon>> {
        Ok(self
            .addons
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }

    async fn delete_addon(&mut self, id: AddonId) -> Result<()> {
        self.addons.remove(&id);

        let versions: Vec<VersionId> = self
            .versions
            .values()
            .filter(|v| v.addon == id)
            .map(|v| v.id)
            .collect();
        for version in &versions {
            self.versions.remove(version);
            self.summaries.remove(version);
        }
        self.previews.retain(|_, p| !versions.contains(&p.version));
        self.ratings.retain(|_, r| r.addon != id);
        self.aggregates.remove(&id);
        Ok(())
    }

    async fn save_version(&mut self, version: &Version) -> Result<()> {
        self.versions.insert(version.id, version.clone());
        Ok(())
    }

    async fn load_version(&self, id: VersionId) -> Result<Option<Version>> {
        Ok(self.versions.get(&id).cloned())
    }

    async fn list_versions(&self, addon: AddonId) -> Result<Vec<Version>> {
        Ok(self
            .versions
            .values()
            .filter(|v| v.addon == addon)
            .cloned()
            .collect())
    }

    async fn save_summary(&mut self, summary: &AutoApprovalSummary) -> Result<()> {
        self.summaries.insert(summary.version, summary.clone());
        Ok(())
    }

    async fn load_summary(&self, version: VersionId) -> Result<Option<AutoApprovalSummary>> {
        Ok(self.summaries.get(&version).cloned())
    }

    async fn save_rating(&mut self, rating: &Rating) -> Result<()> {
        self.ratings.insert(rating.id, rating.clone());
        Ok(())
    }

    async fn list_ratings(&self, addon: AddonId) -> Result<Vec<Rating>> {
        Ok(self
            .ratings
            .values()
            .filter(|r| r.addon == addon)
            .cloned()
            .collect())
    }

    async fn save_rating_aggregate(&mut self, aggregate: &RatingAggregate) -> Result<()> {
        self.aggregates.insert(aggregate.addon, aggregate.clone());
        Ok(())
    }

    async fn load_rating_aggregate(&self, addon: AddonId) -> Result<Option<RatingAggregate>> {
        Ok(self.aggregates.get(&addon).cloned())
    }

    async fn save_abuse_report(&mut self, report: &AbuseReport) -> Result<()> {
        self.abuse_reports.insert(report.id, report.clone());
        Ok(())
    }

    async fn list_abuse_reports(&self) -> Result<Vec<AbuseReport>> {
        Ok(self.abuse_reports.values().cloned().collect())
    }

    async fn save_block(&mut self, block: &Block) -> Result<()> {
        self.blocks.insert(block.guid.clone(), block.clone());
        Ok(())
    }

    async fn list_blocks(&self) -> Result<Vec<Block>> {
        Ok(self.blocks.values().cloned().collect())
    }

    async fn save_denied_guid(&mut self, denied: &DeniedGuid) -> Result<bool> {
        if self.denied_guids.contains_key(&denied.guid) {
            return Ok(false);
        }
        self.denied_guids.insert(denied.guid.clone(), denied.clone());
        Ok(true)
    }

    async fn list_denied_guids(&self) -> Result<Vec<DeniedGuid>> {
        Ok(self.denied_guids.values().cloned().collect())
    }

    async fn create_preview(
        &mut self,
        version: VersionId,
        sizes: PreviewSizes,
    ) -> Result<VersionPreview> {
        let next = self.previews.keys().next_back().map_or(1, |id| id.get() + 1);
        let preview = VersionPreview {
            id: PreviewId::new(next),
            version,
            sizes,
            colors: None,
        };
        self.previews.insert(preview.id, preview.clone());
        Ok(preview)
    }

    async fn save_preview(&mut self, preview: &VersionPreview) -> Result<()> {
        self.previews.insert(preview.id, preview.clone());
        Ok(())
    }

    async fn list_previews(&self, version: VersionId) -> Result<Vec<VersionPreview>> {
        Ok(self
            .previews
            .values()
            .filter(|p| p.version == version)
            .cloned()
            .collect())
    }

    async fn delete_preview(&mut self, id: PreviewId) -> Result<()> {
        self.previews.remove(&id);
        Ok(())
    }
}

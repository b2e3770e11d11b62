//! JSON file storage implementation.
//!
//! Stores one JSON document per record under a root directory, grouped by
//! record kind (`addons/12.json`, `versions/40.json`, ...). The blocklist and
//! denied guids are small and keyed by guid, so each lives in a single list
//! file.

use std::path::{Path, PathBuf};

use addons_core::{
    AbuseReport, Addon, AddonId, AutoApprovalSummary, Block, DeniedGuid, PreviewId, PreviewSizes,
    Rating, RatingAggregate, Version, VersionId, VersionPreview,
};
use serde::{de::DeserializeOwned, Serialize};
use tokio::fs;
use tracing::debug;

use super::{AddonFilter, Result, Storage};

const RECORD_DIRS: [&str; 7] = [
    "addons",
    "versions",
    "summaries",
    "ratings",
    "rating_aggregates",
    "abuse_reports",
    "previews",
];

/// File-based JSON storage backend.
pub struct JsonStorage {
    root: PathBuf,
}

impl JsonStorage {
    /// Open storage rooted at `root`, creating the record directories that
    /// are missing.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        for dir in RECORD_DIRS {
            fs::create_dir_all(root.join(dir)).await?;
        }
        debug!("Opened JSON storage at {}", root.display());

        Ok(Self { root })
    }

    fn record_path(&self, kind: &str, id: impl std::fmt::Display) -> PathBuf {
        self.root.join(kind).join(format!("{}.json", id))
    }

    fn list_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }
}

#[async_trait::async_trait]
impl Storage for JsonStorage {
    async fn save_addon(&mut self, addon: &Addon) -> Result<()> {
        write_json(&self.record_path("addons", addon.id), addon).await
    }

    async fn load_addon(&self, id: AddonId) -> Result<Option<Addon>> {
        read_json(&self.record_path("addons", id)).await
    }

    async fn list_addons(&self, filter: &AddonFilter) -> Result<Vec<Addon>> {
        let mut all: Vec<Addon> = list_dir(&self.root.join("addons")).await?;
        all.retain(|a| filter.matches(a));
        all.sort_by_key(|a| a.id);
        Ok(all)
    }

    async fn delete_addon(&mut self, id: AddonId) -> Result<()> {
        for version in self.list_versions(id).await? {
            for preview in self.list_previews(version.id).await? {
                remove_file(&self.record_path("previews", preview.id)).await?;
            }
            remove_file(&self.record_path("summaries", version.id)).await?;
            remove_file(&self.record_path("versions", version.id)).await?;
        }
        for rating in self.list_ratings(id).await? {
            remove_file(&self.record_path("ratings", rating.id)).await?;
        }
        remove_file(&self.record_path("rating_aggregates", id)).await?;
        remove_file(&self.record_path("addons", id)).await
    }

    async fn save_version(&mut self, version: &Version) -> Result<()> {
        write_json(&self.record_path("versions", version.id), version).await
    }

    async fn load_version(&self, id: VersionId) -> Result<Option<Version>> {
        read_json(&self.record_path("versions", id)).await
    }

    async fn list_versions(&self, addon: AddonId) -> Result<Vec<Version>> {
        let mut versions: Vec<Version> = list_dir(&self.root.join("versions")).await?;
        versions.retain(|v| v.addon == addon);
        versions.sort_by_key(|v| v.id);
        Ok(versions)
    }

    async fn save_summary(&mut self, summary: &AutoApprovalSummary) -> Result<()> {
        write_json(&self.record_path("summaries", summary.version), summary).await
    }

    async fn load_summary(&self, version: VersionId) -> Result<Option<AutoApprovalSummary>> {
        read_json(&self.record_path("summaries", version)).await
    }

    async fn save_rating(&mut self, rating: &Rating) -> Result<()> {
        write_json(&self.record_path("ratings", rating.id), rating).await
    }

    async fn list_ratings(&self, addon: AddonId) -> Result<Vec<Rating>> {
        let mut ratings: Vec<Rating> = list_dir(&self.root.join("ratings")).await?;
        ratings.retain(|r| r.addon == addon);
        ratings.sort_by_key(|r| r.id);
        Ok(ratings)
    }

    async fn save_rating_aggregate(&mut self, aggregate: &RatingAggregate) -> Result<()> {
        write_json(&self.record_path("rating_aggregates", aggregate.addon), aggregate).await
    }

    async fn load_rating_aggregate(&self, addon: AddonId) -> Result<Option<RatingAggregate>> {
        read_json(&self.record_path("rating_aggregates", addon)).await
    }

    async fn save_abuse_report(&mut self, report: &AbuseReport) -> Result<()> {
        write_json(&self.record_path("abuse_reports", report.id), report).await
    }

    async fn list_abuse_reports(&self) -> Result<Vec<AbuseReport>> {
        let mut reports: Vec<AbuseReport> = list_dir(&self.root.join("abuse_reports")).await?;
        reports.sort_by_key(|r| r.id);
        Ok(reports)
    }

    async fn save_block(&mut self, block: &Block) -> Result<()> {
        let path = self.list_path("blocks");
        let mut blocks: Vec<Block> = read_json(&path).await?.unwrap_or_default();
        blocks.retain(|b| b.guid != block.guid);
        blocks.push(block.clone());
        write_json(&path, &blocks).await
    }

    async fn list_blocks(&self) -> Result<Vec<Block>> {
        Ok(read_json(&self.list_path("blocks")).await?.unwrap_or_default())
    }

    async fn save_denied_guid(&mut self, denied: &DeniedGuid) -> Result<bool> {
        let path = self.list_path("denied_guids");
        let mut all: Vec<DeniedGuid> = read_json(&path).await?.unwrap_or_default();
        if all.iter().any(|d| d.guid == denied.guid) {
            return Ok(false);
        }
        all.push(denied.clone());
        write_json(&path, &all).await?;
        Ok(true)
    }

    async fn list_denied_guids(&self) -> Result<Vec<DeniedGuid>> {
        Ok(read_json(&self.list_path("denied_guids")).await?.unwrap_or_default())
    }

    async fn create_preview(
        &mut self,
        version: VersionId,
        sizes: PreviewSizes,
    ) -> Result<VersionPreview> {
        let existing: Vec<VersionPreview> = list_dir(&self.root.join("previews")).await?;
        let next = existing.iter().map(|p| p.id.get()).max().unwrap_or(0) + 1;
        let preview = VersionPreview {
            id: PreviewId::new(next),
            version,
            sizes,
            colors: None,
        };
        self.save_preview(&preview).await?;
        Ok(preview)
    }

    async fn save_preview(&mut self, preview: &VersionPreview) -> Result<()> {
        write_json(&self.record_path("previews", preview.id), preview).await
    }

    async fn list_previews(&self, version: VersionId) -> Result<Vec<VersionPreview>> {
        let mut previews: Vec<VersionPreview> = list_dir(&self.root.join("previews")).await?;
        previews.retain(|p| p.version == version);
        previews.sort_by_key(|p| p.id);
        Ok(previews)
    }

    async fn delete_preview(&mut self, id: PreviewId) -> Result<()> {
        remove_file(&self.record_path("previews", id)).await
    }
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json.as_bytes()).await?;
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

async fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).await.or_else(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Ok(())
        } else {
            Err(e)
        }
    })?;
    Ok(())
}

async fn list_dir<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>> {
    let mut items = Vec::new();
    let mut rd = fs::read_dir(dir).await?;
    while let Some(entry) = rd.next_entry().await? {
        if entry.path().extension().and_then(|s| s.to_str()) != Some("json") {
            continue;
        }
        if let Some(item) = read_json(&entry.path()).await? {
            items.push(item);
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use addons_core::{AddonStatus, Verdict, THEME_PREVIEW_RENDERINGS};

    #[tokio::test]
    async fn test_addon_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let addon = Addon::new(AddonId(5), "Dark Reader");
        storage.save_addon(&addon).await.unwrap();

        assert!(dir.path().join("addons").join("5.json").exists());
        let loaded = storage.load_addon(AddonId(5)).await.unwrap().unwrap();
        assert_eq!(loaded, addon);
        assert!(storage.load_addon(AddonId(6)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_addons_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        for id in [12, 3, 7] {
            storage.save_addon(&Addon::new(AddonId(id), "a")).await.unwrap();
        }
        let deleted = Addon { status: AddonStatus::Deleted, ..Addon::new(AddonId(1), "gone") };
        storage.save_addon(&deleted).await.unwrap();

        let ids: Vec<_> = storage
            .list_addons(&AddonFilter::new())
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.id.get())
            .collect();
        assert_eq!(ids, vec![3, 7, 12]);
    }

    #[tokio::test]
    async fn test_hard_delete_removes_related_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        let mut addon = Addon::new(AddonId(1), "Old plugin");
        let version = Version::new(VersionId(2), addon.id, "1.0");
        addon.current_version = Some(version.id);
        storage.save_addon(&addon).await.unwrap();
        storage.save_version(&version).await.unwrap();
        storage
            .save_summary(&AutoApprovalSummary::new(version.id, Verdict::AutoApproved))
            .await
            .unwrap();
        let preview = storage
            .create_preview(version.id, THEME_PREVIEW_RENDERINGS[0].sizes)
            .await
            .unwrap();

        storage.delete_addon(addon.id).await.unwrap();

        assert!(storage.load_addon(addon.id).await.unwrap().is_none());
        assert!(storage.load_version(version.id).await.unwrap().is_none());
        assert!(storage.list_previews(version.id).await.unwrap().is_empty());
        assert!(!dir.path().join("previews").join(format!("{}.json", preview.id)).exists());
    }

    #[tokio::test]
    async fn test_blocks_and_denied_guids_live_in_list_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonStorage::new(dir.path()).await.unwrap();

        storage.save_block(&Block::new("{a}")).await.unwrap();
        storage.save_block(&Block::new("{a}")).await.unwrap();
        storage.save_block(&Block::new("{b}")).await.unwrap();
        assert_eq!(storage.list_blocks().await.unwrap().len(), 2);

        let denied = DeniedGuid { guid: "{a}".to_string(), comment: "obsolete".to_string() };
        assert!(storage.save_denied_guid(&denied).await.unwrap());
        assert!(!storage.save_denied_guid(&denied).await.unwrap());
        assert_eq!(storage.list_denied_guids().await.unwrap(), vec![denied]);
    }
}

//! Fixtures shared by the unit tests of this crate.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use addons_core::{
    AbuseReport, AbuseReportId, AbuseReportState, Addon, AddonId, AddonStatus, AddonType,
    AutoApprovalSummary, Block, Color, PreviewSizes, Rating, RatingId, ThemeRendering, Time,
    UserId, Verdict, Version, VersionId, VersionPreview,
};
use addons_storage::{shared, MemoryStorage, SharedStorage, Storage};
use async_trait::async_trait;

use crate::collaborators::{ColorExtractor, PreviewRenderer, SignOptions, Signer};
use crate::error::WorkerError;

/// Builds add-ons and related records in an in-memory store.
#[derive(Default)]
pub(crate) struct Factory {
    pub storage: MemoryStorage,
    next_addon: u64,
    next_version: u64,
    next_user: u64,
    next_record: u64,
}

impl Factory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand the store over to code that expects shared storage.
    pub fn share(self) -> SharedStorage {
        shared(self.storage)
    }

    /// Approved add-on with a current version and no authors.
    pub async fn addon(&mut self, addon_type: AddonType) -> Addon {
        self.addon_with_status(addon_type, AddonStatus::Approved).await
    }

    pub async fn addon_with_status(&mut self, addon_type: AddonType, status: AddonStatus) -> Addon {
        self.next_addon += 1;
        let id = AddonId::new(self.next_addon);
        let mut addon = Addon::new(id, format!("Add-on {}", id));
        addon.addon_type = addon_type;
        addon.status = status;
        self.version(&mut addon, true).await;
        addon
    }

    /// Approved add-on whose only author owns nothing else.
    pub async fn addon_by_new_author(&mut self, addon_type: AddonType) -> Addon {
        let mut addon = self.addon(addon_type).await;
        self.next_user += 1;
        addon.authors.push(UserId::new(self.next_user));
        self.save(&addon).await;
        addon
    }

    pub async fn save(&mut self, addon: &Addon) {
        self.storage.save_addon(addon).await.unwrap();
    }

    /// Add a version to `addon`, optionally making it the current one.
    pub async fn version(&mut self, addon: &mut Addon, make_current: bool) -> Version {
        self.next_version += 1;
        let id = VersionId::new(self.next_version);
        let version = Version::new(id, addon.id, format!("1.{}", self.next_version));
        self.storage.save_version(&version).await.unwrap();

        if make_current || addon.current_version.is_none() {
            addon.current_version = Some(id);
        }
        self.save(addon).await;
        version
    }

    /// Summary for the current version of `addon`.
    pub async fn summary(
        &mut self,
        addon: &Addon,
        verdict: Verdict,
        confirmed: bool,
    ) -> AutoApprovalSummary {
        let version = addon.current_version.unwrap();
        let mut summary = AutoApprovalSummary::new(version, verdict);
        summary.confirmed = confirmed;
        self.storage.save_summary(&summary).await.unwrap();
        summary
    }

    pub async fn rating(
        &mut self,
        addon: &Addon,
        stars: Option<u8>,
        created: Time,
        deleted: bool,
    ) -> Rating {
        self.next_record += 1;
        self.next_user += 1;
        let rating = Rating {
            id: RatingId::new(self.next_record),
            addon: addon.id,
            version: addon.current_version,
            user: UserId::new(self.next_user),
            rating: stars,
            body: String::new(),
            deleted,
            created,
        };
        self.storage.save_rating(&rating).await.unwrap();
        rating
    }

    pub async fn abuse_report(
        &mut self,
        addon: Option<AddonId>,
        user: Option<UserId>,
        state: AbuseReportState,
        created: Time,
    ) -> AbuseReport {
        self.next_record += 1;
        let report = AbuseReport {
            id: AbuseReportId::new(self.next_record),
            addon,
            user,
            state,
            message: "spam".to_string(),
            created,
        };
        self.storage.save_abuse_report(&report).await.unwrap();
        report
    }

    pub async fn block(&mut self, block: Block) {
        self.storage.save_block(&block).await.unwrap();
    }

    /// Backdate the file of `version`.
    pub async fn file_created(&mut self, version: VersionId, created: Time) {
        let mut version = self.storage.load_version(version).await.unwrap().unwrap();
        version.file.created = created;
        self.storage.save_version(&version).await.unwrap();
    }

    pub async fn preview(&mut self, version: VersionId, sizes: PreviewSizes) -> VersionPreview {
        self.storage.create_preview(version, sizes).await.unwrap()
    }
}

/// Signer that records which versions it signed.
#[derive(Default)]
pub(crate) struct CountingSigner {
    pub signed: Mutex<Vec<(VersionId, SignOptions)>>,
}

#[async_trait]
impl Signer for CountingSigner {
    async fn sign_file(
        &self,
        version: &Version,
        options: &SignOptions,
    ) -> Result<Time, WorkerError> {
        self.signed.lock().unwrap().push((version.id, options.clone()));
        Ok(chrono::Utc::now())
    }
}

/// Renderer that only counts calls.
#[derive(Default)]
pub(crate) struct CountingRenderer {
    pub calls: AtomicUsize,
}

impl CountingRenderer {
    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PreviewRenderer for CountingRenderer {
    async fn render(
        &self,
        _addon: &Addon,
        _version: &Version,
        _rendering: &ThemeRendering,
    ) -> Result<(), WorkerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Extractor that finds the same palette in every image.
pub(crate) struct FixedColors;

impl FixedColors {
    pub fn palette() -> Vec<Color> {
        vec![
            Color { h: 9, s: 8, l: 7, ratio: 0.75 },
            Color { h: 210, s: 40, l: 50, ratio: 0.25 },
        ]
    }
}

#[async_trait]
impl ColorExtractor for FixedColors {
    async fn extract(&self, _preview: &VersionPreview) -> Result<Vec<Color>, WorkerError> {
        Ok(Self::palette())
    }
}

//! Workers - what a task does to each chunk of add-ons.
//!
//! Workers run on the backend, possibly concurrently with each other. They
//! reload every record they touch, so a stale selection only costs a no-op.
//! A failure on one add-on is logged and the worker moves on.

use addons_core::{
    Addon, AddonId, AddonStatus, AddonType, DeniedGuid, RatingAggregate, WeightInputs,
    THEME_PREVIEW_RENDERINGS,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::collaborators::SignOptions;
use crate::context::WorkerContext;
use crate::error::WorkerError;
use crate::selector::current_version;
use crate::task::TaskKwargs;

/// Worker functions available to tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Worker {
    /// Re-sign the current file of each add-on
    SignAddons,
    /// Regenerate theme previews of the current version
    RecreatePreviews,
    /// Recompute the current version's post-review weight
    RecalculatePostReviewWeight,
    /// Extract colors of current-version previews lacking them
    ExtractColorsFromStaticThemes,
    /// Soft-delete, or hard-delete and deny the guid with `with_deleted`
    DeleteAddons,
    /// Recount ratings per star
    UpdateRatingAggregates,
    /// Delete previews with retired sizes
    DeleteListThemePreviews,
    /// Disable each add-on
    DisableAddons,
}

impl Worker {
    /// Name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Worker::SignAddons => "sign_addons",
            Worker::RecreatePreviews => "recreate_previews",
            Worker::RecalculatePostReviewWeight => "recalculate_post_review_weight",
            Worker::ExtractColorsFromStaticThemes => "extract_colors_from_static_themes",
            Worker::DeleteAddons => "delete_addons",
            Worker::UpdateRatingAggregates => "update_rating_aggregates",
            Worker::DeleteListThemePreviews => "delete_list_theme_previews",
            Worker::DisableAddons => "disable_addons",
        }
    }

    /// Process one chunk. Returns how many add-ons were changed.
    pub async fn run(
        self,
        ctx: &WorkerContext,
        ids: &[AddonId],
        kwargs: &TaskKwargs,
    ) -> Result<usize, WorkerError> {
        info!("Running {} on {} add-ons", self.as_str(), ids.len());

        let mut changed = 0;
        for &id in ids {
            let outcome = match self {
                Worker::SignAddons => sign_addon(ctx, id, kwargs).await,
                Worker::RecreatePreviews => recreate_previews(ctx, id).await,
                Worker::RecalculatePostReviewWeight => {
                    recalculate_post_review_weight(ctx, id).await
                }
                Worker::ExtractColorsFromStaticThemes => extract_colors(ctx, id).await,
                Worker::DeleteAddons => delete_addon(ctx, id, kwargs.with_deleted).await,
                Worker::UpdateRatingAggregates => update_rating_aggregate(ctx, id).await,
                Worker::DeleteListThemePreviews => delete_list_theme_previews(ctx, id).await,
                Worker::DisableAddons => disable_addon(ctx, id).await,
            };

            match outcome {
                Ok(true) => changed += 1,
                Ok(false) => debug!("{}: nothing to do for add-on {}", self.as_str(), id),
                Err(e) => warn!("{}: add-on {} failed: {}", self.as_str(), id, e),
            }
        }

        Ok(changed)
    }
}

impl std::fmt::Display for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

async fn load_addon(ctx: &WorkerContext, id: AddonId) -> Result<Addon, WorkerError> {
    ctx.storage
        .lock()
        .await
        .load_addon(id)
        .await?
        .ok_or_else(|| WorkerError::NotFound(format!("add-on {}", id)))
}

async fn sign_addon(
    ctx: &WorkerContext,
    id: AddonId,
    kwargs: &TaskKwargs,
) -> Result<bool, WorkerError> {
    let addon = load_addon(ctx, id).await?;
    let Some(mut version) = current_version(&*ctx.storage.lock().await, &addon).await? else {
        return Ok(false);
    };

    let options = SignOptions {
        reason: kwargs.reason.clone().unwrap_or_else(|| SignOptions::default().reason),
        send_emails: kwargs.send_emails,
    };
    let signed_at = ctx.signer.sign_file(&version, &options).await?;

    version.file.signed_at = Some(signed_at);
    ctx.storage.lock().await.save_version(&version).await?;
    info!("Re-signed {} of add-on {} ({})", version.file.filename, id, options.reason);
    Ok(true)
}

async fn recreate_previews(ctx: &WorkerContext, id: AddonId) -> Result<bool, WorkerError> {
    let addon = load_addon(ctx, id).await?;
    if addon.addon_type != AddonType::StaticTheme {
        return Ok(false);
    }
    let Some(version) = current_version(&*ctx.storage.lock().await, &addon).await? else {
        return Ok(false);
    };

    for rendering in &THEME_PREVIEW_RENDERINGS {
        ctx.renderer.render(&addon, &version, rendering).await?;
    }

    let mut storage = ctx.storage.lock().await;
    for preview in storage.list_previews(version.id).await? {
        storage.delete_preview(preview.id).await?;
    }
    for rendering in &THEME_PREVIEW_RENDERINGS {
        storage.create_preview(version.id, rendering.sizes).await?;
    }
    Ok(true)
}

async fn recalculate_post_review_weight(
    ctx: &WorkerContext,
    id: AddonId,
) -> Result<bool, WorkerError> {
    let addon = load_addon(ctx, id).await?;
    let Some(version) = addon.current_version else {
        return Ok(false);
    };

    let mut storage = ctx.storage.lock().await;
    let Some(mut summary) = storage.load_summary(version).await? else {
        return Ok(false);
    };
    if !summary.is_pending_confirmation() {
        return Ok(false);
    }

    let abuse_reports = storage
        .list_abuse_reports()
        .await?
        .iter()
        .filter(|r| r.is_active() && r.concerns(addon.id, &addon.authors))
        .count();
    let negative_ratings = storage
        .list_ratings(addon.id)
        .await?
        .iter()
        .filter(|r| r.is_negative())
        .count();

    let weight = summary.calculate_weight(&WeightInputs {
        average_daily_users: addon.average_daily_users,
        abuse_reports: abuse_reports as u64,
        negative_ratings: negative_ratings as u64,
    });
    summary.modified = chrono::Utc::now();
    storage.save_summary(&summary).await?;

    debug!("Weight of version {} of add-on {} is now {}", version, id, weight);
    Ok(true)
}

async fn extract_colors(ctx: &WorkerContext, id: AddonId) -> Result<bool, WorkerError> {
    let addon = load_addon(ctx, id).await?;
    let Some(version) = addon.current_version else {
        return Ok(false);
    };

    let previews = ctx.storage.lock().await.list_previews(version).await?;
    let mut extracted = false;
    for mut preview in previews.into_iter().filter(|p| p.colors.is_none()) {
        let colors = ctx.colors.extract(&preview).await?;
        preview.colors = Some(colors);
        ctx.storage.lock().await.save_preview(&preview).await?;
        extracted = true;
    }
    Ok(extracted)
}

async fn delete_addon(ctx: &WorkerContext, id: AddonId, hard: bool) -> Result<bool, WorkerError> {
    let mut storage = ctx.storage.lock().await;
    let Some(mut addon) = storage.load_addon(id).await? else {
        return Ok(false);
    };

    if hard {
        if let Some(guid) = &addon.guid {
            let denied = DeniedGuid {
                guid: guid.clone(),
                comment: format!("Obsolete {:?} add-on deleted", addon.addon_type),
            };
            if !storage.save_denied_guid(&denied).await? {
                debug!("Guid {} was already denied", guid);
            }
        }
        storage.delete_addon(id).await?;
        info!("Hard-deleted add-on {}", id);
    } else {
        if addon.status == AddonStatus::Deleted {
            return Ok(false);
        }
        addon.status = AddonStatus::Deleted;
        addon.modified = chrono::Utc::now();
        storage.save_addon(&addon).await?;
        info!("Soft-deleted add-on {}", id);
    }
    Ok(true)
}

async fn update_rating_aggregate(ctx: &WorkerContext, id: AddonId) -> Result<bool, WorkerError> {
    let mut storage = ctx.storage.lock().await;
    let ratings = storage.list_ratings(id).await?;
    let aggregate = RatingAggregate::from_ratings(id, &ratings);
    storage.save_rating_aggregate(&aggregate).await?;
    Ok(true)
}

async fn delete_list_theme_previews(ctx: &WorkerContext, id: AddonId) -> Result<bool, WorkerError> {
    let mut storage = ctx.storage.lock().await;
    let mut deleted = 0;
    for version in storage.list_versions(id).await? {
        for preview in storage.list_previews(version.id).await? {
            if !preview.sizes.is_current_rendering() {
                storage.delete_preview(preview.id).await?;
                deleted += 1;
            }
        }
    }
    if deleted > 0 {
        debug!("Deleted {} list previews of add-on {}", deleted, id);
    }
    Ok(deleted > 0)
}

async fn disable_addon(ctx: &WorkerContext, id: AddonId) -> Result<bool, WorkerError> {
    let mut storage = ctx.storage.lock().await;
    let Some(mut addon) = storage.load_addon(id).await? else {
        return Ok(false);
    };
    if matches!(addon.status, AddonStatus::Disabled | AddonStatus::Deleted) {
        return Ok(false);
    }

    addon.status = AddonStatus::Disabled;
    addon.modified = chrono::Utc::now();
    storage.save_addon(&addon).await?;
    info!("Disabled blocked add-on {}", id);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::testing::{CountingRenderer, CountingSigner, Factory, FixedColors};
    use addons_core::{AbuseReportState, PreviewSizes, Verdict};
    use addons_storage::Storage;

    const RETIRED: PreviewSizes = PreviewSizes { thumbnail: [252, 48], image: [760, 92] };

    #[tokio::test]
    async fn test_sign_addons_signs_current_files() {
        let mut f = Factory::new();
        let mut ids = Vec::new();
        for _ in 0..5 {
            ids.push(f.addon(AddonType::Extension).await.id);
        }
        let signer = Arc::new(CountingSigner::default());
        let ctx = WorkerContext::new(f.share()).with_signer(signer.clone());

        let changed = Worker::SignAddons
            .run(&ctx, &ids, &TaskKwargs::default())
            .await
            .unwrap();
        assert_eq!(changed, 5);

        let signed = signer.signed.lock().unwrap().clone();
        assert_eq!(signed.len(), 5);
        assert!(signed
            .iter()
            .all(|(_, options)| options.reason == "expiry" && !options.send_emails));

        let storage = ctx.storage.lock().await;
        for id in ids {
            let addon = storage.load_addon(id).await.unwrap().unwrap();
            let version_id = addon.current_version.unwrap();
            let version = storage.load_version(version_id).await.unwrap().unwrap();
            assert!(version.file.signed_at.is_some());
        }
    }

    #[tokio::test]
    async fn test_unconfigured_signer_skips_items() {
        let mut f = Factory::new();
        let addon = f.addon(AddonType::Extension).await;
        let ctx = WorkerContext::new(f.share());

        let changed = Worker::SignAddons
            .run(&ctx, &[addon.id], &TaskKwargs::default())
            .await
            .unwrap();
        assert_eq!(changed, 0);

        let storage = ctx.storage.lock().await;
        let version = storage.load_version(addon.current_version.unwrap()).await.unwrap().unwrap();
        assert!(version.file.signed_at.is_none());
    }

    #[tokio::test]
    async fn test_recalculate_post_review_weight() {
        let mut f = Factory::new();
        let mut addon = f.addon(AddonType::Extension).await;
        addon.average_daily_users = 100_000;
        f.save(&addon).await;
        let before = f.summary(&addon, Verdict::AutoApproved, false).await;

        let confirmed = f.addon(AddonType::Extension).await;
        f.summary(&confirmed, Verdict::AutoApproved, true).await;

        let ctx = WorkerContext::new(f.share());
        let changed = Worker::RecalculatePostReviewWeight
            .run(&ctx, &[addon.id, confirmed.id], &TaskKwargs::default())
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let storage = ctx.storage.lock().await;
        let summary = storage.load_summary(addon.current_version.unwrap()).await.unwrap().unwrap();
        assert_eq!(summary.weight, 10);
        assert!(summary.modified >= before.modified);

        let confirmed_version = confirmed.current_version.unwrap();
        let untouched = storage.load_summary(confirmed_version).await.unwrap().unwrap();
        assert_eq!(untouched.weight, 0);
    }

    #[tokio::test]
    async fn test_weight_counts_reports_and_negative_ratings() {
        let mut f = Factory::new();
        let addon = f.addon_by_new_author(AddonType::Extension).await;
        f.summary(&addon, Verdict::AutoApproved, false).await;
        let now = chrono::Utc::now();
        f.abuse_report(Some(addon.id), None, AbuseReportState::Untriaged, now).await;
        f.abuse_report(None, Some(addon.authors[0]), AbuseReportState::Valid, now).await;
        f.abuse_report(Some(addon.id), None, AbuseReportState::Deleted, now).await;
        f.rating(&addon, Some(1), now, false).await;
        f.rating(&addon, Some(5), now, false).await;

        let ctx = WorkerContext::new(f.share());
        Worker::RecalculatePostReviewWeight
            .run(&ctx, &[addon.id], &TaskKwargs::default())
            .await
            .unwrap();

        let storage = ctx.storage.lock().await;
        let summary = storage.load_summary(addon.current_version.unwrap()).await.unwrap().unwrap();
        assert_eq!(summary.weight, 25);
        assert_eq!(summary.weight_info.get("abuse_reports"), Some(&20));
        assert_eq!(summary.weight_info.get("negative_ratings"), Some(&5));
    }

    #[tokio::test]
    async fn test_delete_addons_soft_and_hard() {
        let mut f = Factory::new();
        let soft = f.addon(AddonType::Persona).await;
        let hard = f.addon(AddonType::Plugin).await;
        let mut guidless = f.addon(AddonType::Dictionary).await;
        guidless.guid = None;
        f.save(&guidless).await;
        let ctx = WorkerContext::new(f.share());

        Worker::DeleteAddons.run(&ctx, &[soft.id], &TaskKwargs::default()).await.unwrap();
        let hard_kwargs = TaskKwargs { with_deleted: true, ..TaskKwargs::default() };
        let changed = Worker::DeleteAddons
            .run(&ctx, &[hard.id, guidless.id], &hard_kwargs)
            .await
            .unwrap();
        assert_eq!(changed, 2);

        let storage = ctx.storage.lock().await;
        let soft = storage.load_addon(soft.id).await.unwrap().unwrap();
        assert_eq!(soft.status, AddonStatus::Deleted);
        assert!(storage.load_addon(hard.id).await.unwrap().is_none());
        assert!(storage.load_addon(guidless.id).await.unwrap().is_none());

        let denied = storage.list_denied_guids().await.unwrap();
        assert_eq!(denied.len(), 1);
        assert_eq!(Some(&denied[0].guid), hard.guid.as_ref());
    }

    #[tokio::test]
    async fn test_hard_delete_tolerates_already_denied_guid() {
        let mut f = Factory::new();
        let addon = f.addon(AddonType::Persona).await;
        let denied = DeniedGuid {
            guid: addon.guid.clone().unwrap(),
            comment: "earlier".to_string(),
        };
        f.storage.save_denied_guid(&denied).await.unwrap();
        let ctx = WorkerContext::new(f.share());

        let kwargs = TaskKwargs { with_deleted: true, ..TaskKwargs::default() };
        let changed = Worker::DeleteAddons.run(&ctx, &[addon.id], &kwargs).await.unwrap();
        assert_eq!(changed, 1);

        let storage = ctx.storage.lock().await;
        assert!(storage.load_addon(addon.id).await.unwrap().is_none());
        assert_eq!(storage.list_denied_guids().await.unwrap()[0].comment, "earlier");
    }

    #[tokio::test]
    async fn test_disable_addons() {
        let mut f = Factory::new();
        let approved = f.addon(AddonType::Extension).await;
        let deleted = f.addon_with_status(AddonType::Extension, AddonStatus::Deleted).await;
        let ctx = WorkerContext::new(f.share());

        let changed = Worker::DisableAddons
            .run(&ctx, &[approved.id, deleted.id], &TaskKwargs::default())
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let storage = ctx.storage.lock().await;
        let approved = storage.load_addon(approved.id).await.unwrap().unwrap();
        assert_eq!(approved.status, AddonStatus::Disabled);
        let deleted = storage.load_addon(deleted.id).await.unwrap().unwrap();
        assert_eq!(deleted.status, AddonStatus::Deleted);
    }

    #[tokio::test]
    async fn test_update_rating_aggregates() {
        let mut f = Factory::new();
        let addon = f.addon(AddonType::Extension).await;
        let now = chrono::Utc::now();
        let ratings = [
            (Some(5), false),
            (Some(5), false),
            (Some(3), false),
            (Some(1), true),
            (None, false),
        ];
        for (stars, deleted) in ratings {
            f.rating(&addon, stars, now, deleted).await;
        }
        let ctx = WorkerContext::new(f.share());

        Worker::UpdateRatingAggregates
            .run(&ctx, &[addon.id], &TaskKwargs::default())
            .await
            .unwrap();

        let storage = ctx.storage.lock().await;
        let aggregate = storage.load_rating_aggregate(addon.id).await.unwrap().unwrap();
        assert_eq!(aggregate.count(5), 2);
        assert_eq!(aggregate.count(3), 1);
        assert_eq!(aggregate.count(1), 0);
    }

    #[tokio::test]
    async fn test_delete_list_theme_previews_keeps_current_renderings() {
        let mut f = Factory::new();
        let mut theme = f.addon(AddonType::StaticTheme).await;
        let old = theme.current_version.unwrap();
        let retired = f.preview(old, RETIRED).await;
        let current = f.version(&mut theme, true).await;
        for rendering in &THEME_PREVIEW_RENDERINGS {
            f.preview(current.id, rendering.sizes).await;
        }
        f.preview(current.id, RETIRED).await;
        let ctx = WorkerContext::new(f.share());

        let changed = Worker::DeleteListThemePreviews
            .run(&ctx, &[theme.id], &TaskKwargs::default())
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let storage = ctx.storage.lock().await;
        assert!(storage.list_previews(old).await.unwrap().iter().all(|p| p.id != retired.id));
        let kept = storage.list_previews(current.id).await.unwrap();
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|p| p.sizes.is_current_rendering()));
    }

    #[tokio::test]
    async fn test_extract_colors_fills_missing_only() {
        let mut f = Factory::new();
        let theme = f.addon(AddonType::StaticTheme).await;
        let version = theme.current_version.unwrap();
        let mut done = f.preview(version, THEME_PREVIEW_RENDERINGS[0].sizes).await;
        done.colors = Some(Vec::new());
        f.storage.save_preview(&done).await.unwrap();
        let missing = f.preview(version, THEME_PREVIEW_RENDERINGS[1].sizes).await;
        let ctx = WorkerContext::new(f.share()).with_color_extractor(Arc::new(FixedColors));

        let changed = Worker::ExtractColorsFromStaticThemes
            .run(&ctx, &[theme.id], &TaskKwargs::default())
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let previews = ctx.storage.lock().await.list_previews(version).await.unwrap();
        let by_id = |id| previews.iter().find(|p| p.id == id).unwrap();
        assert_eq!(by_id(done.id).colors, Some(Vec::new()));
        assert_eq!(by_id(missing.id).colors, Some(FixedColors::palette()));
    }

    #[tokio::test]
    async fn test_recreate_previews_replaces_current_version_previews() {
        let mut f = Factory::new();
        let theme = f.addon(AddonType::StaticTheme).await;
        let version = theme.current_version.unwrap();
        f.preview(version, RETIRED).await;
        let extension = f.addon(AddonType::Extension).await;
        let renderer = Arc::new(CountingRenderer::default());
        let ctx = WorkerContext::new(f.share()).with_renderer(renderer.clone());

        let changed = Worker::RecreatePreviews
            .run(&ctx, &[theme.id, extension.id], &TaskKwargs::default())
            .await
            .unwrap();
        assert_eq!(changed, 1);
        assert_eq!(renderer.count(), THEME_PREVIEW_RENDERINGS.len());

        let previews = ctx.storage.lock().await.list_previews(version).await.unwrap();
        let sizes: Vec<_> = previews.iter().map(|p| p.sizes).collect();
        let expected: Vec<_> = THEME_PREVIEW_RENDERINGS.iter().map(|r| r.sizes).collect();
        assert_eq!(sizes, expected);
    }

    #[tokio::test]
    async fn test_missing_addon_is_skipped() {
        let f = Factory::new();
        let ctx = WorkerContext::new(f.share());
        let changed = Worker::DisableAddons
            .run(&ctx, &[AddonId::new(404)], &TaskKwargs::default())
            .await
            .unwrap();
        assert_eq!(changed, 0);
    }
}

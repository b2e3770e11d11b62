//! Entity selectors - which add-ons a task applies to.

use std::collections::HashSet;

use addons_core::{
    AbuseReport, Addon, AddonId, AddonStatus, AddonType, AutoApprovalSummary, FileStatus, Time,
    Version,
};
use addons_storage::{AddonFilter, Result, Storage};
use tracing::debug;

/// Predicate producing the add-ons eligible for a task.
///
/// Every selector returns ids in ascending order, at most once each, and
/// only looks at an add-on's current version when versions matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    /// Public add-ons whose current file was created before `before`
    CurrentFileCreatedBefore {
        /// Exclusive upper bound on the file creation time
        before: Time,
    },
    /// Add-ons of one kind
    OfType(AddonType),
    /// Add-ons of any obsolete kind
    Obsolete,
    /// Current version auto-approved and not confirmed yet
    PendingConfirmation,
    /// Pending confirmation, and a bad rating or abuse report arrived since
    /// the summary was last updated
    PendingConfirmationWithRecentFeedback,
    /// Add-ons whose guid is blocked for every version
    FullyBlocked,
    /// Every add-on
    All,
}

impl Selector {
    /// Run the selector. Hidden add-ons are only considered when
    /// `with_deleted` is set.
    pub async fn select(&self, storage: &dyn Storage, with_deleted: bool) -> Result<Vec<AddonId>> {
        let base = AddonFilter::new().with_deleted(with_deleted);
        let mut selected = Vec::new();

        match *self {
            Selector::CurrentFileCreatedBefore { before } => {
                let filter = base.with_statuses([AddonStatus::Approved]);
                for addon in storage.list_addons(&filter).await? {
                    let Some(version) = current_version(storage, &addon).await? else {
                        continue;
                    };
                    let file = &version.file;
                    if file.status == FileStatus::Approved && file.created < before {
                        selected.push(addon.id);
                    }
                }
            }
            Selector::OfType(addon_type) => {
                let filter = base.with_types([addon_type]);
                selected.extend(storage.list_addons(&filter).await?.iter().map(|a| a.id));
            }
            Selector::Obsolete => {
                let filter = base.with_types(AddonType::OBSOLETE);
                selected.extend(storage.list_addons(&filter).await?.iter().map(|a| a.id));
            }
            Selector::PendingConfirmation => {
                for addon in storage.list_addons(&base).await? {
                    if pending_summary(storage, &addon).await?.is_some() {
                        selected.push(addon.id);
                    }
                }
            }
            Selector::PendingConfirmationWithRecentFeedback => {
                let reports: Vec<AbuseReport> = storage
                    .list_abuse_reports()
                    .await?
                    .into_iter()
                    .filter(AbuseReport::is_active)
                    .collect();

                for addon in storage.list_addons(&base).await? {
                    let Some(summary) = pending_summary(storage, &addon).await? else {
                        continue;
                    };
                    let since = summary.modified;

                    let reported = reports
                        .iter()
                        .any(|r| r.created >= since && r.concerns(addon.id, &addon.authors));
                    let badly_rated = !reported
                        && storage
                            .list_ratings(addon.id)
                            .await?
                            .iter()
                            .any(|r| r.created >= since && r.is_negative());

                    if reported || badly_rated {
                        selected.push(addon.id);
                    }
                }
            }
            Selector::FullyBlocked => {
                let blocked: HashSet<String> = storage
                    .list_blocks()
                    .await?
                    .into_iter()
                    .filter(|b| b.is_full())
                    .map(|b| b.guid)
                    .collect();

                for addon in storage.list_addons(&base).await? {
                    if addon.guid.as_ref().is_some_and(|guid| blocked.contains(guid)) {
                        selected.push(addon.id);
                    }
                }
            }
            Selector::All => {
                selected.extend(storage.list_addons(&base).await?.iter().map(|a| a.id));
            }
        }

        debug!("Selector {:?} matched {} add-ons", self, selected.len());
        Ok(selected)
    }
}

/// The current version of `addon`, if it has one.
pub(crate) async fn current_version(
    storage: &dyn Storage,
    addon: &Addon,
) -> Result<Option<Version>> {
    match addon.current_version {
        Some(id) => storage.load_version(id).await,
        None => Ok(None),
    }
}

/// Summary of the current version when it still awaits confirmation.
async fn pending_summary(
    storage: &dyn Storage,
    addon: &Addon,
) -> Result<Option<AutoApprovalSummary>> {
    let Some(version) = addon.current_version else {
        return Ok(None);
    };
    Ok(storage
        .load_summary(version)
        .await?
        .filter(AutoApprovalSummary::is_pending_confirmation))
}

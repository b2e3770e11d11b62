//! Abuse reports.

use serde::{Deserialize, Serialize};
use crate::id::{AbuseReportId, AddonId, UserId};
use crate::Time;

/// A report filed against an add-on or against a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbuseReport {
    /// Unique identifier
    pub id: AbuseReportId,

    /// Reported add-on
    pub addon: Option<AddonId>,

    /// Reported user
    pub user: Option<UserId>,

    /// Triage state
    pub state: AbuseReportState,

    /// Free text
    #[serde(default)]
    pub message: String,

    /// Creation timestamp
    pub created: Time,
}

/// Triage state of an abuse report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbuseReportState {
    /// Not looked at yet
    Untriaged,
    /// Confirmed
    Valid,
    /// Looks like spam or noise
    Suspicious,
    /// Soft-deleted
    Deleted,
}

impl AbuseReport {
    /// Whether the report targets `addon` directly or one of `authors`.
    pub fn concerns(&self, addon: AddonId, authors: &[UserId]) -> bool {
        self.addon == Some(addon) || self.user.is_some_and(|user| authors.contains(&user))
    }

    /// Whether the report is still live.
    pub fn is_active(&self) -> bool {
        self.state != AbuseReportState::Deleted
    }
}

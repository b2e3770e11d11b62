//! Auto-approval summaries and post-review weight.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use crate::id::VersionId;
use crate::Time;

/// Outcome of the auto-approval run for a single version.
///
/// Auto-approved versions are reviewed after the fact by humans, in order of
/// descending `weight`. Once a reviewer confirms the approval the summary is
/// `confirmed` and its weight no longer matters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoApprovalSummary {
    /// Version this summary is about (one summary per version)
    pub version: VersionId,

    /// Auto-approval verdict
    pub verdict: Verdict,

    /// Whether a reviewer has confirmed the approval
    #[serde(default)]
    pub confirmed: bool,

    /// Post-review priority, higher is riskier
    #[serde(default)]
    pub weight: u64,

    /// Contribution of each factor to `weight`
    #[serde(default)]
    pub weight_info: BTreeMap<String, u64>,

    /// Creation timestamp
    pub created: Time,

    /// Last update timestamp
    pub modified: Time,
}

/// Auto-approval verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Auto-approved
    AutoApproved,
    /// Kept for manual review
    NotAutoApproved,
}

/// Signals the weight is computed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeightInputs {
    /// Average daily users of the add-on
    pub average_daily_users: u64,
    /// Non-deleted abuse reports against the add-on or its authors
    pub abuse_reports: u64,
    /// Non-deleted ratings of 3 stars or less
    pub negative_ratings: u64,
}

impl AutoApprovalSummary {
    /// Create an unconfirmed summary with zero weight.
    pub fn new(version: VersionId, verdict: Verdict) -> Self {
        let now = chrono::Utc::now();
        Self {
            version,
            verdict,
            confirmed: false,
            weight: 0,
            weight_info: BTreeMap::new(),
            created: now,
            modified: now,
        }
    }

    /// Whether this summary still waits for a post-review confirmation.
    pub fn is_pending_confirmation(&self) -> bool {
        self.verdict == Verdict::AutoApproved && !self.confirmed
    }

    /// Recompute `weight` and `weight_info` from `inputs` and return the new
    /// weight.
    pub fn calculate_weight(&mut self, inputs: &WeightInputs) -> u64 {
        let factors = [
            ("average_daily_users", (inputs.average_daily_users / 10_000).min(100)),
            ("abuse_reports", (inputs.abuse_reports * 10).min(100)),
            ("negative_ratings", (inputs.negative_ratings * 5).min(50)),
        ];

        self.weight_info = factors
            .iter()
            .filter(|(_, value)| *value > 0)
            .map(|(name, value)| (name.to_string(), *value))
            .collect();
        self.weight = factors.iter().map(|(_, value)| value).sum();
        self.weight
    }
}

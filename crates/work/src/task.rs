//! Known batch tasks and the options forwarded to their workers.

use serde::Serialize;

use crate::error::InvalidTaskError;

/// Every task `process-addons` knows how to run.
///
/// Parsing a name is the only way in from the command line, so an unknown
/// name is rejected before the catalog is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskName {
    /// Re-sign current files of public add-ons with COSE signatures
    ResignAddonsForCose,
    /// Regenerate static theme previews
    RecreatePreviews,
    /// Recompute post-review weight of pending auto-approvals
    RecalculatePostReviewWeight,
    /// Recompute weight of auto-approvals that received bad feedback
    ConstantlyRecalculatePostReviewWeight,
    /// Fill in dominant colors of static theme previews
    ExtractColorsFromStaticThemes,
    /// Delete add-ons of obsolete kinds
    DeleteObsoleteAddons,
    /// Recount ratings per star
    UpdateRatingAggregates,
    /// Drop previews left over from retired list renderings
    DeleteListThemePreviews,
    /// Disable add-ons whose guid is fully blocked
    DisableBlockedAddons,
}

impl TaskName {
    /// All tasks, in catalog order.
    pub const ALL: [TaskName; 9] = [
        TaskName::ResignAddonsForCose,
        TaskName::RecreatePreviews,
        TaskName::RecalculatePostReviewWeight,
        TaskName::ConstantlyRecalculatePostReviewWeight,
        TaskName::ExtractColorsFromStaticThemes,
        TaskName::DeleteObsoleteAddons,
        TaskName::UpdateRatingAggregates,
        TaskName::DeleteListThemePreviews,
        TaskName::DisableBlockedAddons,
    ];

    /// Command-line name of the task.
    pub fn as_str(self) -> &'static str {
        match self {
            TaskName::ResignAddonsForCose => "resign_addons_for_cose",
            TaskName::RecreatePreviews => "recreate_previews",
            TaskName::RecalculatePostReviewWeight => "recalculate_post_review_weight",
            TaskName::ConstantlyRecalculatePostReviewWeight => {
                "constantly_recalculate_post_review_weight"
            }
            TaskName::ExtractColorsFromStaticThemes => "extract_colors_from_static_themes",
            TaskName::DeleteObsoleteAddons => "delete_obsolete_addons",
            TaskName::UpdateRatingAggregates => "update_rating_aggregates",
            TaskName::DeleteListThemePreviews => "delete_list_theme_previews",
            TaskName::DisableBlockedAddons => "disable_blocked_addons",
        }
    }
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskName {
    type Err = InvalidTaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskName::ALL
            .into_iter()
            .find(|task| task.as_str() == s)
            .ok_or_else(|| InvalidTaskError { name: Some(s.to_string()) })
    }
}

/// Keyword options passed along with every chunk of a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskKwargs {
    /// Hard-delete instead of soft-delete
    pub with_deleted: bool,

    /// Reason recorded when re-signing
    pub reason: Option<String>,

    /// Whether developers get notified about re-signed files
    pub send_emails: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_name_round_trips() {
        for task in TaskName::ALL {
            assert_eq!(task.as_str().parse::<TaskName>(), Ok(task));
            assert_eq!(task.to_string(), task.as_str());
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = "foo".parse::<TaskName>().unwrap_err();
        assert_eq!(err.name.as_deref(), Some("foo"));
        assert!(err.to_string().contains("Unknown task \"foo\""));
        assert!(err.to_string().contains("resign_addons_for_cose"));
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert!("Recreate_Previews".parse::<TaskName>().is_err());
        assert!("".parse::<TaskName>().is_err());
    }
}

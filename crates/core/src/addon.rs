//! Add-on model - the entity batch tasks operate on.

use serde::{Deserialize, Serialize};
use crate::id::{AddonId, UserId, VersionId};
use crate::Time;

/// An add-on listed (or once listed) on the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    /// Unique identifier
    pub id: AddonId,

    /// Extension guid, absent for some legacy add-on kinds
    pub guid: Option<String>,

    /// Display name
    pub name: String,

    /// Kind of add-on
    pub addon_type: AddonType,

    /// Review status
    pub status: AddonStatus,

    /// Whether the developer disabled the listing
    #[serde(default)]
    pub disabled_by_user: bool,

    /// The version currently served to users
    pub current_version: Option<VersionId>,

    /// Users listed as authors
    #[serde(default)]
    pub authors: Vec<UserId>,

    /// Average number of daily users
    #[serde(default)]
    pub average_daily_users: u64,

    /// Creation timestamp
    pub created: Time,

    /// Last update timestamp
    pub modified: Time,
}

impl Addon {
    /// Create a new approved extension with no versions yet.
    pub fn new(id: AddonId, name: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            guid: Some(format!("{{addon-{}}}", id)),
            name: name.into(),
            addon_type: AddonType::Extension,
            status: AddonStatus::Approved,
            disabled_by_user: false,
            current_version: None,
            authors: Vec::new(),
            average_daily_users: 0,
            created: now,
            modified: now,
        }
    }

    /// Whether the default manager would hide this add-on.
    ///
    /// Soft-deleted and admin-disabled add-ons are only visible to callers
    /// that explicitly ask for them.
    pub fn is_hidden(&self) -> bool {
        matches!(self.status, AddonStatus::Deleted | AddonStatus::Disabled)
    }
}

/// Kinds of add-ons, including legacy kinds the marketplace no longer
/// accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonType {
    /// WebExtension
    Extension,
    /// Legacy complete theme
    XulTheme,
    /// Spell-checking dictionary
    Dictionary,
    /// Legacy language pack packaged as an extension
    LanguagePackAddon,
    /// Language pack
    LanguagePack,
    /// NPAPI plugin
    Plugin,
    /// Lightweight background theme
    Persona,
    /// Static theme
    StaticTheme,
    /// Packaged web app
    Webapp,
}

impl AddonType {
    /// Legacy kinds that are no longer supported anywhere.
    pub const OBSOLETE: [AddonType; 5] = [
        AddonType::XulTheme,
        AddonType::LanguagePackAddon,
        AddonType::Plugin,
        AddonType::Persona,
        AddonType::Webapp,
    ];

    /// Whether this kind is obsolete.
    pub fn is_obsolete(self) -> bool {
        Self::OBSOLETE.contains(&self)
    }
}

/// Review status of an add-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddonStatus {
    /// Incomplete submission
    Null,
    /// Awaiting review
    Nominated,
    /// Public
    Approved,
    /// Disabled by an administrator
    Disabled,
    /// Soft-deleted
    Deleted,
}

impl std::fmt::Display for AddonStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AddonStatus::Null => "incomplete",
            AddonStatus::Nominated => "awaiting review",
            AddonStatus::Approved => "approved",
            AddonStatus::Disabled => "disabled",
            AddonStatus::Deleted => "deleted",
        };
        f.write_str(s)
    }
}

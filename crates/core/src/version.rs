//! Version model - an uploaded release of an add-on.

use serde::{Deserialize, Serialize};
use crate::id::{AddonId, VersionId};
use crate::Time;

/// A version of an add-on, with its single packaged file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Version {
    /// Unique identifier
    pub id: VersionId,

    /// Owning add-on
    pub addon: AddonId,

    /// Version string, e.g. `1.0.3`
    pub version: String,

    /// Distribution channel
    pub channel: Channel,

    /// The packaged file
    pub file: File,

    /// Creation timestamp
    pub created: Time,

    /// Whether the version was deleted by its developer
    #[serde(default)]
    pub deleted: bool,
}

impl Version {
    /// Create a listed version with an approved file.
    pub fn new(id: VersionId, addon: AddonId, version: impl Into<String>) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            addon,
            version: version.into(),
            channel: Channel::Listed,
            file: File {
                filename: format!("addon-{}-{}.xpi", addon, id),
                status: FileStatus::Approved,
                created: now,
                signed_at: None,
            },
            created: now,
            deleted: false,
        }
    }
}

/// Channel a version is distributed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// Listed on the marketplace
    Listed,
    /// Self-distributed by the developer
    Unlisted,
}

/// The packaged file of a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    /// File name in storage
    pub filename: String,

    /// Review status of the file
    pub status: FileStatus,

    /// Upload timestamp
    pub created: Time,

    /// When the file was last signed
    #[serde(default)]
    pub signed_at: Option<Time>,
}

/// Review status of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Awaiting review
    AwaitingReview,
    /// Public
    Approved,
    /// Rejected or disabled
    Disabled,
}

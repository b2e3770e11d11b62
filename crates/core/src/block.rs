//! Blocklist entries and denied guids.

use serde::{Deserialize, Serialize};

/// A blocklist entry covering a range of versions of a guid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Blocked guid
    pub guid: String,

    /// Lowest blocked version, `0` for all
    pub min_version: String,

    /// Highest blocked version, `*` for all
    pub max_version: String,

    /// Why the block exists
    #[serde(default)]
    pub reason: String,
}

impl Block {
    /// Lower bound meaning "every version".
    pub const MIN_ALL: &'static str = "0";
    /// Upper bound meaning "every version".
    pub const MAX_ALL: &'static str = "*";

    /// Block every version of `guid`.
    pub fn new(guid: impl Into<String>) -> Self {
        Self {
            guid: guid.into(),
            min_version: Self::MIN_ALL.to_string(),
            max_version: Self::MAX_ALL.to_string(),
            reason: String::new(),
        }
    }

    /// Whether every version of the guid is blocked.
    pub fn is_full(&self) -> bool {
        self.min_version == Self::MIN_ALL && self.max_version == Self::MAX_ALL
    }
}

/// A guid that can never be submitted again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeniedGuid {
    /// Denied guid
    pub guid: String,

    /// Why it was denied
    #[serde(default)]
    pub comment: String,
}

//! Primary keys for marketplace records.
//!
//! Every record is keyed by the integer id handed out by the datastore.
//! Ordering of ids is creation order, which selectors rely on.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw datastore key.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw datastore key.
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

define_id!(
    /// Unique identifier for an add-on. This is the work item batch tasks
    /// are scheduled against.
    AddonId
);

define_id!(
    /// Unique identifier for a version of an add-on.
    VersionId
);

define_id!(
    /// Unique identifier for a user (authors, reviewers, reporters).
    UserId
);

define_id!(
    /// Unique identifier for a rating.
    RatingId
);

define_id!(
    /// Unique identifier for an abuse report.
    AbuseReportId
);

define_id!(
    /// Unique identifier for a version preview image.
    PreviewId
);

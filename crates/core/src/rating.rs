//! User ratings and their per-add-on aggregates.

use serde::{Deserialize, Serialize};
use crate::id::{AddonId, RatingId, UserId, VersionId};
use crate::Time;

/// A user rating of an add-on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Unique identifier
    pub id: RatingId,

    /// Rated add-on
    pub addon: AddonId,

    /// Version the rating was left on
    pub version: Option<VersionId>,

    /// Author of the rating
    pub user: UserId,

    /// Stars from 1 to 5, absent for developer replies
    pub rating: Option<u8>,

    /// Free text
    #[serde(default)]
    pub body: String,

    /// Soft-deleted by moderation
    #[serde(default)]
    pub deleted: bool,

    /// Creation timestamp
    pub created: Time,
}

impl Rating {
    /// Whether this is a live rating of at most 3 stars.
    pub fn is_negative(&self) -> bool {
        !self.deleted && matches!(self.rating, Some(stars) if stars <= 3)
    }
}

/// Count of live ratings per star for an add-on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingAggregate {
    /// Aggregated add-on
    pub addon: AddonId,

    /// `counts[n - 1]` is the number of n-star ratings
    pub counts: [u64; 5],
}

impl RatingAggregate {
    /// Aggregate the live ratings among `ratings`.
    pub fn from_ratings<'a>(addon: AddonId, ratings: impl IntoIterator<Item = &'a Rating>) -> Self {
        let mut counts = [0u64; 5];
        for rating in ratings {
            if rating.deleted || rating.addon != addon {
                continue;
            }
            if let Some(stars @ 1..=5) = rating.rating {
                counts[usize::from(stars) - 1] += 1;
            }
        }
        Self { addon, counts }
    }

    /// Number of ratings with the given number of stars.
    pub fn count(&self, stars: u8) -> u64 {
        match stars {
            1..=5 => self.counts[usize::from(stars) - 1],
            _ => 0,
        }
    }
}

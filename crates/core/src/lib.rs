//! Add-on marketplace core data models.
//!
//! This crate defines the records the batch processing layer reads and
//! mutates: add-ons, their versions, review summaries, ratings, abuse
//! reports, blocks and theme previews.

#![warn(missing_docs)]

// Core identities
mod id;

// Add-ons and their versions
mod addon;
mod version;
mod preview;

// Review and moderation
mod review;
mod rating;
mod abuse;
mod block;

// Re-exports
pub use id::*;

pub use addon::{Addon, AddonStatus, AddonType};
pub use version::{Channel, File, FileStatus, Version};
pub use preview::{Color, PreviewSizes, ThemeRendering, VersionPreview, THEME_PREVIEW_RENDERINGS};

pub use review::{AutoApprovalSummary, Verdict, WeightInputs};
pub use rating::{Rating, RatingAggregate};
pub use abuse::{AbuseReport, AbuseReportState};
pub use block::{Block, DeniedGuid};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;

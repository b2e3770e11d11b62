//! External services workers call into.
//!
//! Signing, preview rendering and color extraction happen outside this
//! crate. Workers only see these traits.

use addons_core::{Addon, Color, ThemeRendering, Time, Version, VersionPreview};
use async_trait::async_trait;

use crate::error::WorkerError;

/// Options for a signing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignOptions {
    /// Why the file is being (re-)signed
    pub reason: String,
    /// Whether to notify the developers
    pub send_emails: bool,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            reason: "expiry".to_string(),
            send_emails: false,
        }
    }
}

/// Signs packaged add-on files.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign the file of `version`, returning the signing time.
    async fn sign_file(&self, version: &Version, options: &SignOptions)
        -> Result<Time, WorkerError>;
}

/// Renders static theme preview images.
#[async_trait]
pub trait PreviewRenderer: Send + Sync {
    /// Render `rendering` for the theme packaged in `version`.
    async fn render(
        &self,
        addon: &Addon,
        version: &Version,
        rendering: &ThemeRendering,
    ) -> Result<(), WorkerError>;
}

/// Extracts dominant colors from preview images.
#[async_trait]
pub trait ColorExtractor: Send + Sync {
    /// Dominant colors of `preview`.
    async fn extract(&self, preview: &VersionPreview) -> Result<Vec<Color>, WorkerError>;
}

/// Stand-in for services that were not wired up. Every call fails, so each
/// affected item is logged and skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait]
impl Signer for Unconfigured {
    async fn sign_file(
        &self,
        _version: &Version,
        _options: &SignOptions,
    ) -> Result<Time, WorkerError> {
        Err(unconfigured("signing service"))
    }
}

#[async_trait]
impl PreviewRenderer for Unconfigured {
    async fn render(
        &self,
        _addon: &Addon,
        _version: &Version,
        _rendering: &ThemeRendering,
    ) -> Result<(), WorkerError> {
        Err(unconfigured("preview renderer"))
    }
}

#[async_trait]
impl ColorExtractor for Unconfigured {
    async fn extract(&self, _preview: &VersionPreview) -> Result<Vec<Color>, WorkerError> {
        Err(unconfigured("color extractor"))
    }
}

fn unconfigured(service: &'static str) -> WorkerError {
    WorkerError::Collaborator {
        service,
        message: "not configured".to_string(),
    }
}

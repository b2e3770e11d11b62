//! Theme preview images.

use serde::{Deserialize, Serialize};
use crate::id::{PreviewId, VersionId};

/// A rendered preview image attached to a version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionPreview {
    /// Unique identifier
    pub id: PreviewId,

    /// Version the preview belongs to
    pub version: VersionId,

    /// Rendered dimensions
    pub sizes: PreviewSizes,

    /// Dominant colors, once extracted
    #[serde(default)]
    pub colors: Option<Vec<Color>>,
}

/// Dimensions of a preview's thumbnail and full image, `[width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewSizes {
    /// Thumbnail dimensions
    pub thumbnail: [u32; 2],
    /// Full image dimensions
    pub image: [u32; 2],
}

/// A dominant color in HSL space with its share of the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Hue
    pub h: u16,
    /// Saturation
    pub s: u8,
    /// Lightness
    pub l: u8,
    /// Share of pixels
    pub ratio: f32,
}

/// A named preview rendering generated for every static theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeRendering {
    /// Where the rendering is shown
    pub name: &'static str,
    /// Rendered dimensions
    pub sizes: PreviewSizes,
}

/// Renderings currently produced for static themes. Previews with any other
/// sizes are leftovers from retired list renderings.
pub const THEME_PREVIEW_RENDERINGS: [ThemeRendering; 2] = [
    ThemeRendering {
        name: "firefox",
        sizes: PreviewSizes { thumbnail: [670, 64], image: [680, 92] },
    },
    ThemeRendering {
        name: "amo",
        sizes: PreviewSizes { thumbnail: [720, 92], image: [720, 92] },
    },
];

impl PreviewSizes {
    /// Whether these sizes belong to a current rendering.
    pub fn is_current_rendering(&self) -> bool {
        THEME_PREVIEW_RENDERINGS.iter().any(|r| r.sizes == *self)
    }
}

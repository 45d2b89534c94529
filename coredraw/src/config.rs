//! Drawing configuration.

use crate::font::{FontFace, FontSize, FontStyle};
use crate::font_config::FontConfig;
use crate::quality::{AliasMode, RenderingQuality};

/// Point sizes for the abstract font size classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontPointTable {
    pub default: u32,
    pub tiny: u32,
    pub small: u32,
    pub medium: u32,
    pub large: u32,
    pub huge: u32,
}

impl Default for FontPointTable {
    fn default() -> Self {
        Self {
            default: 12,
            tiny: 8,
            small: 10,
            medium: 12,
            large: 16,
            huge: 22,
        }
    }
}

impl FontPointTable {
    /// Point size for a size class. Explicit sizes pass through.
    pub fn points(&self, size: FontSize) -> u32 {
        match size {
            FontSize::Default => self.default,
            FontSize::Tiny => self.tiny,
            FontSize::Small => self.small,
            FontSize::Medium => self.medium,
            FontSize::Large => self.large,
            FontSize::Huge => self.huge,
            FontSize::Points(points) => points,
        }
    }

    /// The largest size class whose point size does not exceed `points`.
    pub fn size_class(&self, points: u32) -> FontSize {
        if points >= self.huge {
            FontSize::Huge
        } else if points >= self.large {
            FontSize::Large
        } else if points >= self.medium {
            FontSize::Medium
        } else if points >= self.small {
            FontSize::Small
        } else {
            FontSize::Tiny
        }
    }
}

/// Configuration for a [`CoreDraw`](crate::CoreDraw) context.
///
/// Override individual fields with struct update syntax:
///
/// ```rust
/// use coredraw::{DrawConfig, FontConfig};
///
/// let config = DrawConfig {
///     font: FontConfig {
///         load_system_fonts: false,
///         ..FontConfig::default()
///     },
///     ..DrawConfig::default()
/// };
/// assert_eq!(config.font_points.medium, 12);
/// ```
#[derive(Debug, Clone)]
pub struct DrawConfig {
    /// Initial shape anti-alias mode.
    pub shape_alias: AliasMode,
    /// Initial text anti-alias mode.
    pub text_alias: AliasMode,
    pub font_points: FontPointTable,
    /// Added to the point size of fonts requested by family name.
    pub font_points_extra_shift: i32,
    pub default_face: FontFace,
    pub default_style: FontStyle,
    pub default_size: FontSize,
    /// ARGB fill for blank images created without an explicit background.
    pub default_image_background: u32,
    pub font: FontConfig,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            shape_alias: AliasMode::Best,
            text_alias: AliasMode::Best,
            font_points: FontPointTable::default(),
            font_points_extra_shift: 0,
            default_face: FontFace::Proportional,
            default_style: FontStyle::Plain,
            default_size: FontSize::Medium,
            default_image_background: 0xFFFF_FFFF,
            font: FontConfig::default(),
        }
    }
}

impl DrawConfig {
    /// The initial rendering quality described by this config.
    pub fn quality(&self) -> RenderingQuality {
        RenderingQuality {
            shape: self.shape_alias,
            text: self.text_alias,
        }
    }
}

//! Process-level drawing context.

use crate::config::DrawConfig;
use crate::error::DrawResult;
use crate::font_factory::FontFactory;
use crate::image::Image;
use crate::quality::{Feature, QualityChannel};
use crate::surface::DrawingSurface;
use crate::target::PaintTarget;
use std::rc::Rc;

/// Owns the configuration, the font factory and the shared quality channel.
///
/// Surfaces and images created from one context share its fonts and receive
/// its quality changes.
#[derive(Debug)]
pub struct CoreDraw {
    config: DrawConfig,
    fonts: Rc<FontFactory>,
    quality: QualityChannel,
}

impl CoreDraw {
    pub fn new(config: DrawConfig) -> Self {
        log::debug!(target: "coredraw", "context new {:?}", config.quality());
        let fonts = Rc::new(FontFactory::new(&config));
        let quality = QualityChannel::new(config.quality());
        Self {
            config,
            fonts,
            quality,
        }
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn fonts(&self) -> &Rc<FontFactory> {
        &self.fonts
    }

    pub fn quality(&self) -> &QualityChannel {
        &self.quality
    }

    /// Toggle a feature for every surface of this context.
    ///
    /// Returns `false` for features that cannot be toggled.
    pub fn feature_enable(&self, feature: Feature, enabled: bool) -> bool {
        self.quality.set_feature_enabled(feature, enabled)
    }

    pub fn has_feature_enabled(&self, feature: Feature) -> bool {
        self.quality.has_feature_enabled(feature)
    }

    /// A surface bound to `target`.
    pub fn surface<T: PaintTarget + 'static>(&self, target: T) -> DrawingSurface<T> {
        let mut surface = self.unbound_surface();
        surface.bind(target);
        surface
    }

    /// A surface with no target yet.
    pub fn unbound_surface<T: PaintTarget + 'static>(&self) -> DrawingSurface<T> {
        DrawingSurface::new(self.fonts.clone(), self.quality.clone())
    }

    /// A mutable blank image with the default background.
    pub fn create_image(&self, width: i32, height: i32) -> DrawResult<Image> {
        Image::blank(self, width, height)
    }
}

impl Default for CoreDraw {
    fn default() -> Self {
        Self::new(DrawConfig::default())
    }
}

//! Device-independent MIDP-style 2D drawing on top of tiny-skia.
//!
//! This crate provides the drawing core of a MIDP `Graphics` implementation:
//! anchored text and images, the eight region transforms, font metrics and
//! a shared anti-aliasing setting. Host graphics are reached through the
//! [`PaintTarget`] trait. It uses:
//! - `tiny-skia` for the default paint target and image pixels
//! - `fontdb` for font discovery and registration
//! - `ttf-parser` for glyph metrics and outlines
//! - `png` for image decoding and encoding
//!
//! # Example
//!
//! ```rust,ignore
//! use coredraw::{Anchor, CoreDraw, Image};
//!
//! let ctx = CoreDraw::default();
//! let mut image = Image::blank(&ctx, 100, 40)?;
//! let g = image.graphics()?;
//! g.set_color(0xFF0000);
//! g.fill_rect(10, 10, 30, 20)?;
//! g.draw_string("Hello", 50, 20, Anchor::HCENTER | Anchor::BASELINE)?;
//! let png_data = image.to_png()?;
//! ```

mod anchor;
mod config;
mod context;
mod error;
mod font;
mod font_config;
mod font_factory;
mod image;
mod quality;
mod region;
mod shapes;
mod surface;
mod target;

// Re-export public API
pub use anchor::{
    resolve_origin, resolve_region_origin, Anchor, AnchorContent, HorizontalAnchor,
    VerticalAnchor,
};
pub use config::{DrawConfig, FontPointTable};
pub use context::CoreDraw;
pub use error::{DrawError, DrawResult};
pub use font::{BoxFont, FaceFont, Font, FontFace, FontMetrics, FontSize, FontStyle, HostFont};
pub use font_config::{font_config_to_fontdb, FontConfig, GenericFamilyMap};
pub use font_factory::FontFactory;
pub use image::Image;
pub use quality::{
    AliasMode, Feature, QualityChannel, QualityListener, RenderingQuality, Subscription,
};
pub use region::{
    check_region_bounds, plan_transform, AffineOp, QuarterTurn, RegionTransform, TransformPlan,
};
pub use surface::DrawingSurface;
pub use target::{ClipRect, PaintTarget, PixmapTarget, StrokeStyle};

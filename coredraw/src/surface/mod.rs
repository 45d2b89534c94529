//! The stateful drawing surface.
//!
//! A [`DrawingSurface`] holds MIDP-style drawing state (color, font,
//! cumulative translation, stroke style) and drives a [`PaintTarget`].
//! Anchored content is resolved to the target's top-left or baseline model
//! before any host call is made.
//!
//! A surface is meant for one thread and is not `Send`.

mod drawing;
mod image_ops;
mod text;

use crate::error::{DrawError, DrawResult};
use crate::font::{Font, FontFace, FontSize, FontStyle};
use crate::font_factory::FontFactory;
use crate::quality::{Feature, QualityChannel, QualityListener, RenderingQuality, Subscription};
use crate::target::{ClipRect, PaintTarget, PixmapTarget, StrokeStyle};
use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// The bound target plus the quality snapshot the channel pushes into.
struct TargetSlot<T> {
    target: RefCell<Option<T>>,
    quality: Cell<RenderingQuality>,
    /// A change arrived while the target was borrowed.
    stale: Cell<bool>,
}

fn apply_quality<T: PaintTarget>(target: &mut T, quality: RenderingQuality) {
    target.set_anti_alias(quality.shape.is_enabled());
    target.set_text_anti_alias(quality.text.is_enabled());
}

impl<T: PaintTarget> QualityListener for TargetSlot<T> {
    fn quality_changed(&self, quality: RenderingQuality) {
        self.quality.set(quality);
        match self.target.try_borrow_mut() {
            Ok(mut guard) => {
                if let Some(target) = guard.as_mut() {
                    apply_quality(target, quality);
                }
            }
            Err(_) => self.stale.set(true),
        }
    }
}

/// A drawing context bound to one paint target at a time.
pub struct DrawingSurface<T: PaintTarget + 'static = PixmapTarget> {
    slot: Rc<TargetSlot<T>>,
    fonts: Rc<FontFactory>,
    channel: QualityChannel,
    subscription: Option<Subscription>,
    /// 0xRRGGBB.
    color: u32,
    font: Font,
    stroke_style: StrokeStyle,
    translate_x: i32,
    translate_y: i32,
}

impl<T: PaintTarget + 'static> DrawingSurface<T> {
    /// Create an unbound surface. Drawing fails with `IllegalState` until a
    /// target is bound.
    pub fn new(fonts: Rc<FontFactory>, channel: QualityChannel) -> Self {
        let font = fonts.default_font();
        let quality = channel.quality();
        Self {
            slot: Rc::new(TargetSlot {
                target: RefCell::new(None),
                quality: Cell::new(quality),
                stale: Cell::new(false),
            }),
            fonts,
            channel,
            subscription: None,
            color: 0,
            font,
            stroke_style: StrokeStyle::Solid,
            translate_x: 0,
            translate_y: 0,
        }
    }

    /// Bind to `target`, returning the previously bound target.
    ///
    /// The channel's current quality and this surface's color, font and
    /// stroke style are applied to the new target. The translation starts
    /// over at zero.
    pub fn bind(&mut self, mut target: T) -> Option<T> {
        log::debug!(target: "coredraw", "bind");
        self.subscription = None;

        let quality = self.channel.quality();
        self.slot.quality.set(quality);
        self.slot.stale.set(false);
        apply_quality(&mut target, quality);
        target.set_color(0xFF00_0000 | self.color);
        target.set_font(&self.font);
        target.set_stroke_style(self.stroke_style);
        self.translate_x = 0;
        self.translate_y = 0;

        let previous = self.slot.target.borrow_mut().replace(target);
        let listener: Weak<dyn QualityListener> = Rc::downgrade(&self.slot) as Weak<dyn QualityListener>;
        self.subscription = Some(self.channel.subscribe(listener));
        previous
    }

    /// Release the bound target and stop receiving quality changes.
    pub fn unbind(&mut self) -> Option<T> {
        log::debug!(target: "coredraw", "unbind");
        self.subscription = None;
        self.slot.target.borrow_mut().take()
    }

    pub fn is_bound(&self) -> bool {
        self.slot.target.borrow().is_some()
    }

    /// Borrow the bound target.
    pub fn target(&self) -> Option<Ref<'_, T>> {
        Ref::filter_map(self.slot.target.borrow(), |t| t.as_ref()).ok()
    }

    /// Run `f` on the bound target, applying any quality change that arrived
    /// while it was borrowed.
    pub(crate) fn with_target<R>(&self, f: impl FnOnce(&mut T) -> R) -> DrawResult<R> {
        let mut guard = self.slot.target.borrow_mut();
        let target = guard
            .as_mut()
            .ok_or(DrawError::IllegalState("surface is not bound to a paint target"))?;
        if self.slot.stale.replace(false) {
            apply_quality(target, self.slot.quality.get());
        }
        Ok(f(target))
    }

    fn push_to_target(&self, f: impl FnOnce(&mut T)) {
        if let Some(target) = self.slot.target.borrow_mut().as_mut() {
            f(target);
        }
    }

    // --- Color ---

    /// Set the current color from 0xRRGGBB. The high byte is ignored.
    pub fn set_color(&mut self, rgb: u32) {
        log::debug!(target: "coredraw", "set_color {:#08x}", rgb);
        self.color = rgb & 0x00FF_FFFF;
        let argb = 0xFF00_0000 | self.color;
        self.push_to_target(|t| t.set_color(argb));
    }

    pub fn set_color_rgb(&mut self, red: u8, green: u8, blue: u8) {
        self.set_color(u32::from_be_bytes([0, red, green, blue]));
    }

    /// Current color as 0xRRGGBB.
    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn red_component(&self) -> u8 {
        (self.color >> 16) as u8
    }

    pub fn green_component(&self) -> u8 {
        (self.color >> 8) as u8
    }

    pub fn blue_component(&self) -> u8 {
        self.color as u8
    }

    /// Gray scale is not tracked; this reads back the current color.
    pub fn gray_scale(&self) -> u32 {
        self.color
    }

    /// Accepted and ignored.
    pub fn set_gray_scale(&mut self, _value: u32) {}

    /// The color the device shows for `color`. Every 24-bit color is
    /// displayable.
    pub fn display_color(&self, color: u32) -> u32 {
        color
    }

    // --- Font ---

    /// Set the current font. `None` selects the default font.
    pub fn set_font(&mut self, font: Option<&Font>) {
        let font = match font {
            Some(font) => font.clone(),
            None => self.fonts.default_font(),
        };
        log::debug!(target: "coredraw", "set_font {:?}", font);
        self.push_to_target(|t| t.set_font(&font));
        self.font = font;
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    pub fn default_font(&self) -> Font {
        self.fonts.default_font()
    }

    pub fn font_for(&self, face: FontFace, style: FontStyle, size: FontSize) -> Font {
        self.fonts.font(face, style, size)
    }

    // --- Stroke ---

    pub fn set_stroke_style(&mut self, style: StrokeStyle) {
        log::debug!(target: "coredraw", "set_stroke_style {:?}", style);
        self.stroke_style = style;
        self.push_to_target(|t| t.set_stroke_style(style));
    }

    pub fn stroke_style(&self) -> StrokeStyle {
        self.stroke_style
    }

    // --- Clip ---

    /// Replace the clip rectangle.
    pub fn set_clip(&mut self, x: i32, y: i32, width: i32, height: i32) -> DrawResult<()> {
        log::debug!(target: "coredraw", "set_clip {} {} {} {}", x, y, width, height);
        self.with_target(|t| t.set_clip(Some(ClipRect::new(x, y, width, height))))
    }

    /// Intersect the clip rectangle with the given one.
    pub fn clip_rect(&mut self, x: i32, y: i32, width: i32, height: i32) -> DrawResult<()> {
        log::debug!(target: "coredraw", "clip_rect {} {} {} {}", x, y, width, height);
        self.with_target(|t| t.clip_rect(ClipRect::new(x, y, width, height)))
    }

    /// Current clip, read back from the target.
    pub fn clip(&self) -> DrawResult<ClipRect> {
        self.with_target(|t| t.clip_bounds())
    }

    pub fn clip_x(&self) -> DrawResult<i32> {
        Ok(self.clip()?.x)
    }

    pub fn clip_y(&self) -> DrawResult<i32> {
        Ok(self.clip()?.y)
    }

    pub fn clip_width(&self) -> DrawResult<i32> {
        Ok(self.clip()?.width)
    }

    pub fn clip_height(&self) -> DrawResult<i32> {
        Ok(self.clip()?.height)
    }

    // --- Translation ---

    /// Add `(x, y)` to the current translation.
    ///
    /// The target only translates relatively, so the previous offset is
    /// undone and the accumulated one applied in its place. The offset wraps
    /// on overflow.
    pub fn translate(&mut self, x: i32, y: i32) -> DrawResult<()> {
        log::debug!(target: "coredraw", "translate {} {}", x, y);
        let (old_x, old_y) = (self.translate_x, self.translate_y);
        let (new_x, new_y) = (old_x.wrapping_add(x), old_y.wrapping_add(y));
        self.with_target(|t| {
            t.translate(-(old_x as f32), -(old_y as f32));
            t.translate(new_x as f32, new_y as f32);
        })?;
        self.translate_x = new_x;
        self.translate_y = new_y;
        Ok(())
    }

    pub fn translate_x(&self) -> i32 {
        self.translate_x
    }

    pub fn translate_y(&self) -> i32 {
        self.translate_y
    }

    // --- Rendering quality ---

    /// Quality currently applied to this surface.
    pub fn quality(&self) -> RenderingQuality {
        self.slot.quality.get()
    }

    /// Toggle a feature on this surface only.
    ///
    /// The override lasts until the next change on the shared channel.
    /// Returns `false` for features that cannot be toggled.
    pub fn feature_enable(&mut self, feature: Feature, enabled: bool) -> bool {
        log::debug!(target: "coredraw", "feature_enable {:?} {}", feature, enabled);
        let mut quality = self.slot.quality.get();
        if !quality.set_feature(feature, enabled) {
            return false;
        }
        self.slot.quality.set(quality);
        self.push_to_target(|t| apply_quality(t, quality));
        true
    }

    pub fn has_feature_enabled(&self, feature: Feature) -> bool {
        self.slot.quality.get().has_feature(feature)
    }
}

impl<T: PaintTarget + fmt::Debug + 'static> fmt::Debug for DrawingSurface<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawingSurface")
            .field("bound", &self.is_bound())
            .field("color", &format_args!("{:#08x}", self.color))
            .field("font", &self.font)
            .field("stroke_style", &self.stroke_style)
            .field("translate", &(self.translate_x, self.translate_y))
            .field("quality", &self.quality())
            .finish()
    }
}

//! The host backend seam.
//!
//! A [`PaintTarget`] is the native graphics API a surface draws through. Its
//! model differs from the surface's on purpose: it only knows baseline text,
//! top-left pixmaps and relative transforms. [`PixmapTarget`] implements it on
//! a tiny-skia pixmap.

use crate::error::DrawResult;
use crate::font::Font;
use std::cell::RefCell;
use std::rc::Rc;
use tiny_skia::{
    BlendMode, Color, FillRule, FilterQuality, IntRect, LineCap, LineJoin, Mask, Paint, Path,
    PathBuilder, Pixmap, PixmapPaint, PixmapRef, Point, Rect, Stroke, StrokeDash, Transform,
};

/// Line stroke style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StrokeStyle {
    #[default]
    Solid,
    Dotted,
}

/// An integer rectangle in user space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClipRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ClipRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Overlap of two rectangles. Empty overlaps have zero size.
    pub fn intersect(&self, other: &ClipRect) -> ClipRect {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        ClipRect::new(left, top, (right - left).max(0), (bottom - top).max(0))
    }
}

/// Host graphics API driven by a drawing surface.
///
/// Coordinates are user space: they go through [`PaintTarget::transform`]
/// before reaching pixels. Colors are ARGB.
pub trait PaintTarget {
    /// Size of the underlying device in pixels.
    fn size(&self) -> (u32, u32);

    fn transform(&self) -> Transform;
    fn set_transform(&mut self, transform: Transform);

    /// Relative translation.
    fn translate(&mut self, dx: f32, dy: f32) {
        let t = self.transform().pre_translate(dx, dy);
        self.set_transform(t);
    }

    /// Concatenate `transform` onto the current one.
    fn concat(&mut self, transform: Transform) {
        let t = self.transform().pre_concat(transform);
        self.set_transform(t);
    }

    fn set_color(&mut self, argb: u32);
    fn set_font(&mut self, font: &Font);
    fn set_stroke_style(&mut self, style: StrokeStyle);

    /// Replace the clip. `None` removes it.
    fn set_clip(&mut self, rect: Option<ClipRect>);
    /// Intersect the clip with `rect`.
    fn clip_rect(&mut self, rect: ClipRect) {
        let current = self.clip_bounds();
        self.set_clip(Some(current.intersect(&rect)));
    }
    /// Current clip in user space, the whole device when unclipped.
    fn clip_bounds(&self) -> ClipRect;

    fn set_anti_alias(&mut self, enabled: bool);
    fn set_text_anti_alias(&mut self, enabled: bool);

    fn stroke_path(&mut self, path: &Path);
    fn fill_path(&mut self, path: &Path);
    /// Set a rectangle to fully transparent, ignoring the current color.
    fn clear_rect(&mut self, rect: ClipRect);
    /// Draw `text` with its baseline starting at `(x, y)`.
    fn draw_string(&mut self, text: &str, x: f32, y: f32);
    /// Draw a premultiplied pixmap with its top-left corner at `(x, y)`.
    fn draw_pixmap(&mut self, pixmap: PixmapRef<'_>, x: i32, y: i32);
    /// Copy a device area by `(dx, dy)`, in translated user space.
    fn copy_area(&mut self, rect: ClipRect, dx: i32, dy: i32) -> DrawResult<()>;
}

/// A [`PaintTarget`] backed by a tiny-skia pixmap.
///
/// The pixmap is shared so an image and the surface drawing into it see the
/// same pixels.
#[derive(Debug)]
pub struct PixmapTarget {
    pixmap: Rc<RefCell<Pixmap>>,
    transform: Transform,
    color: Color,
    font: Option<Font>,
    stroke_style: StrokeStyle,
    /// Clip in device space as `[left, top, right, bottom]`.
    clip: Option<[f32; 4]>,
    anti_alias: bool,
    text_anti_alias: bool,
}

impl PixmapTarget {
    pub fn new(pixmap: Rc<RefCell<Pixmap>>) -> Self {
        Self {
            pixmap,
            transform: Transform::identity(),
            color: Color::BLACK,
            font: None,
            stroke_style: StrokeStyle::Solid,
            clip: None,
            anti_alias: true,
            text_anti_alias: true,
        }
    }

    /// Target over a new transparent pixmap.
    pub fn with_size(width: u32, height: u32) -> Option<Self> {
        Some(Self::new(Rc::new(RefCell::new(Pixmap::new(width, height)?))))
    }

    pub fn pixmap(&self) -> &Rc<RefCell<Pixmap>> {
        &self.pixmap
    }

    pub fn anti_alias(&self) -> bool {
        self.anti_alias
    }

    pub fn text_anti_alias(&self) -> bool {
        self.text_anti_alias
    }

    fn paint(&self, anti_alias: bool) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(self.color);
        paint.anti_alias = anti_alias;
        paint
    }

    fn stroke(&self) -> Stroke {
        Stroke {
            width: 1.0,
            line_cap: LineCap::Square,
            line_join: LineJoin::Bevel,
            dash: match self.stroke_style {
                StrokeStyle::Solid => None,
                StrokeStyle::Dotted => StrokeDash::new(vec![2.0, 2.0], 1.0),
            },
            ..Stroke::default()
        }
    }

    fn create_clip_mask(&self) -> Option<Mask> {
        let [left, top, right, bottom] = self.clip?;
        let pixmap = self.pixmap.borrow();
        let mut mask = Mask::new(pixmap.width(), pixmap.height())?;
        let path = PathBuilder::from_rect(Rect::from_ltrb(left, top, right, bottom)?);
        mask.fill_path(&path, FillRule::Winding, false, Transform::identity());
        Some(mask)
    }

    /// Clip rejects everything.
    fn clip_is_empty(&self) -> bool {
        matches!(self.clip, Some([l, t, r, b]) if r - l < 0.5 || b - t < 0.5)
    }
}

/// Bounding box of an `[left, top, right, bottom]` rectangle under `transform`.
fn map_ltrb(rect: [f32; 4], transform: Transform) -> [f32; 4] {
    let [l, t, r, b] = rect;
    let mut points = [
        Point::from_xy(l, t),
        Point::from_xy(r, t),
        Point::from_xy(r, b),
        Point::from_xy(l, b),
    ];
    transform.map_points(&mut points);
    points.iter().fold(
        [f32::MAX, f32::MAX, f32::MIN, f32::MIN],
        |[l, t, r, b], p| [l.min(p.x), t.min(p.y), r.max(p.x), b.max(p.y)],
    )
}

impl PaintTarget for PixmapTarget {
    fn size(&self) -> (u32, u32) {
        let pixmap = self.pixmap.borrow();
        (pixmap.width(), pixmap.height())
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn set_color(&mut self, argb: u32) {
        let [a, r, g, b] = argb.to_be_bytes();
        self.color = Color::from_rgba8(r, g, b, a);
    }

    fn set_font(&mut self, font: &Font) {
        self.font = Some(font.clone());
    }

    fn set_stroke_style(&mut self, style: StrokeStyle) {
        self.stroke_style = style;
    }

    fn set_clip(&mut self, rect: Option<ClipRect>) {
        self.clip = rect.map(|r| {
            let user = [
                r.x as f32,
                r.y as f32,
                (r.x + r.width.max(0)) as f32,
                (r.y + r.height.max(0)) as f32,
            ];
            map_ltrb(user, self.transform)
        });
    }

    fn clip_bounds(&self) -> ClipRect {
        let device = self.clip.unwrap_or_else(|| {
            let (w, h) = self.size();
            [0.0, 0.0, w as f32, h as f32]
        });
        let Some(inverse) = self.transform.invert() else {
            return ClipRect::default();
        };
        let [left, top, right, bottom] = map_ltrb(device, inverse);
        let x = left.round() as i32;
        let y = top.round() as i32;
        ClipRect::new(x, y, right.round() as i32 - x, bottom.round() as i32 - y)
    }

    fn set_anti_alias(&mut self, enabled: bool) {
        self.anti_alias = enabled;
    }

    fn set_text_anti_alias(&mut self, enabled: bool) {
        self.text_anti_alias = enabled;
    }

    fn stroke_path(&mut self, path: &Path) {
        if self.clip_is_empty() {
            return;
        }
        let paint = self.paint(self.anti_alias);
        let stroke = self.stroke();
        let mask = self.create_clip_mask();
        self.pixmap
            .borrow_mut()
            .stroke_path(path, &paint, &stroke, self.transform, mask.as_ref());
    }

    fn fill_path(&mut self, path: &Path) {
        if self.clip_is_empty() {
            return;
        }
        let paint = self.paint(self.anti_alias);
        let mask = self.create_clip_mask();
        self.pixmap.borrow_mut().fill_path(
            path,
            &paint,
            FillRule::Winding,
            self.transform,
            mask.as_ref(),
        );
    }

    fn clear_rect(&mut self, rect: ClipRect) {
        if self.clip_is_empty() {
            return;
        }
        let Some(r) = Rect::from_xywh(
            rect.x as f32,
            rect.y as f32,
            rect.width as f32,
            rect.height as f32,
        ) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(Color::TRANSPARENT);
        paint.blend_mode = BlendMode::Clear;
        paint.anti_alias = false;
        let mask = self.create_clip_mask();
        self.pixmap
            .borrow_mut()
            .fill_rect(r, &paint, self.transform, mask.as_ref());
    }

    fn draw_string(&mut self, text: &str, x: f32, y: f32) {
        if self.clip_is_empty() {
            return;
        }
        let Some(font) = self.font.clone() else {
            return;
        };
        let host = font.host();
        let paint = self.paint(self.text_anti_alias);
        let mask = self.create_clip_mask();
        let mut pixmap = self.pixmap.borrow_mut();

        let mut pen_x = x;
        for ch in text.chars() {
            if let Some(path) = host.glyph_path(ch) {
                let glyph_transform = self.transform.pre_translate(pen_x, y);
                pixmap.fill_path(
                    &path,
                    &paint,
                    FillRule::Winding,
                    glyph_transform,
                    mask.as_ref(),
                );
            }
            pen_x += host.advance(ch);
        }
    }

    fn draw_pixmap(&mut self, pixmap: PixmapRef<'_>, x: i32, y: i32) {
        if self.clip_is_empty() {
            return;
        }
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::SourceOver,
            quality: FilterQuality::Nearest,
        };
        let transform = self.transform.pre_translate(x as f32, y as f32);
        let mask = self.create_clip_mask();
        self.pixmap
            .borrow_mut()
            .draw_pixmap(0, 0, pixmap, &paint, transform, mask.as_ref());
    }

    fn copy_area(&mut self, rect: ClipRect, dx: i32, dy: i32) -> DrawResult<()> {
        let (tx, ty) = (self.transform.tx.round() as i32, self.transform.ty.round() as i32);
        let Some(src_rect) = IntRect::from_xywh(
            rect.x + tx,
            rect.y + ty,
            rect.width.max(0) as u32,
            rect.height.max(0) as u32,
        ) else {
            return Ok(());
        };
        let Some(copy) = self.pixmap.borrow().clone_rect(src_rect) else {
            return Ok(());
        };
        let paint = PixmapPaint {
            opacity: 1.0,
            blend_mode: BlendMode::Source,
            quality: FilterQuality::Nearest,
        };
        let mask = self.create_clip_mask();
        self.pixmap.borrow_mut().draw_pixmap(
            src_rect.x() + dx,
            src_rect.y() + dy,
            copy.as_ref(),
            &paint,
            Transform::identity(),
            mask.as_ref(),
        );
        Ok(())
    }
}

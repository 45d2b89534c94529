//! Fonts and font metrics.
//!
//! A [`Font`] is an immutable (face, style, size) classification bound to a
//! [`HostFont`]. All measurements go through [`FontMetrics`], which queries
//! the host font directly and keeps no state of its own.

use crate::error::{DrawError, DrawResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, RwLock};
use tiny_skia::{Path, PathBuilder, Rect};

/// Logical face classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontFace {
    Monospace,
    #[default]
    Proportional,
}

/// Font style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontStyle {
    #[default]
    Plain,
    Bold,
    Italic,
}

/// Requested size: an abstract size class or an explicit point size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontSize {
    #[default]
    Default,
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
    Points(u32),
}

/// Host font handle.
///
/// Values are in pixels. Glyph paths are in a y-down space with the origin on
/// the baseline at the glyph's left edge.
pub trait HostFont: fmt::Debug + Send + Sync {
    fn family_name(&self) -> &str;
    /// Pixel size the handle was created for.
    fn size(&self) -> f32;
    fn ascent(&self) -> f32;
    /// Positive distance below the baseline.
    fn descent(&self) -> f32;
    fn line_gap(&self) -> f32;
    fn advance(&self, ch: char) -> f32;
    fn glyph_path(&self, ch: char) -> Option<Path>;
}

/// Advance and outline of one character at a face's pixel size.
struct Glyph {
    advance: f32,
    path: Option<Path>,
}

/// A host font backed by an OpenType/TrueType face.
///
/// Each character's advance and outline are read from the face once and
/// cached; clones share the cache.
#[derive(Clone)]
pub struct FaceFont {
    data: Arc<Vec<u8>>,
    index: u32,
    family: String,
    size: f32,
    scale: f32,
    ascent: f32,
    descent: f32,
    line_gap: f32,
    glyphs: Arc<RwLock<HashMap<char, Glyph>>>,
}

impl FaceFont {
    /// Bind face `index` of `data` at `size` pixels.
    ///
    /// Returns `None` when the data is not a parseable face.
    pub fn new(data: Arc<Vec<u8>>, index: u32, size: f32) -> Option<Self> {
        let face = ttf_parser::Face::parse(&data, index).ok()?;
        let units_per_em = face.units_per_em();
        if units_per_em == 0 {
            return None;
        }
        let scale = size / units_per_em as f32;
        let family = face_family_name(&face).unwrap_or_default();
        let ascent = face.ascender() as f32 * scale;
        let descent = -(face.descender() as f32) * scale;
        let line_gap = face.line_gap() as f32 * scale;
        Some(Self {
            data,
            index,
            family,
            size,
            scale,
            ascent,
            descent,
            line_gap,
            glyphs: Arc::default(),
        })
    }

    /// Run `f` on the cached glyph for `ch`, loading it on first use.
    fn with_glyph<R>(&self, ch: char, f: impl FnOnce(&Glyph) -> R) -> R {
        if let Ok(cache) = self.glyphs.read() {
            if let Some(glyph) = cache.get(&ch) {
                return f(glyph);
            }
        }
        let glyph = self.load_glyph(ch);
        let result = f(&glyph);
        if let Ok(mut cache) = self.glyphs.write() {
            cache.insert(ch, glyph);
        }
        result
    }

    fn load_glyph(&self, ch: char) -> Glyph {
        let missing = Glyph {
            advance: 0.0,
            path: None,
        };
        let Ok(face) = ttf_parser::Face::parse(&self.data, self.index) else {
            return missing;
        };
        let Some(id) = face.glyph_index(ch) else {
            return missing;
        };
        let advance = face
            .glyph_hor_advance(id)
            .map_or(0.0, |units| units as f32 * self.scale);
        let mut sink = OutlineSink {
            builder: PathBuilder::new(),
            scale: self.scale,
        };
        let path = face
            .outline_glyph(id, &mut sink)
            .and_then(|_| sink.builder.finish());
        Glyph { advance, path }
    }

    /// Number of characters loaded so far.
    pub fn cached_glyphs(&self) -> usize {
        self.glyphs.read().map_or(0, |cache| cache.len())
    }
}

impl fmt::Debug for FaceFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaceFont")
            .field("family", &self.family)
            .field("index", &self.index)
            .field("size", &self.size)
            .finish()
    }
}

impl HostFont for FaceFont {
    fn family_name(&self) -> &str {
        &self.family
    }

    fn size(&self) -> f32 {
        self.size
    }

    fn ascent(&self) -> f32 {
        self.ascent
    }

    fn descent(&self) -> f32 {
        self.descent
    }

    fn line_gap(&self) -> f32 {
        self.line_gap
    }

    fn advance(&self, ch: char) -> f32 {
        self.with_glyph(ch, |glyph| glyph.advance)
    }

    fn glyph_path(&self, ch: char) -> Option<Path> {
        self.with_glyph(ch, |glyph| glyph.path.clone())
    }
}

/// Read the family name from a face's name table.
pub(crate) fn face_family_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
        .find_map(|name| name.to_string())
}

/// Converts font units (y-up) into a pixel path (y-down).
struct OutlineSink {
    builder: PathBuilder,
    scale: f32,
}

impl ttf_parser::OutlineBuilder for OutlineSink {
    fn move_to(&mut self, x: f32, y: f32) {
        let s = self.scale;
        self.builder.move_to(x * s, -y * s);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let s = self.scale;
        self.builder.line_to(x * s, -y * s);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let s = self.scale;
        self.builder.quad_to(x1 * s, -y1 * s, x * s, -y * s);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let s = self.scale;
        self.builder
            .cubic_to(x1 * s, -y1 * s, x2 * s, -y2 * s, x * s, -y * s);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Fallback host font used when no face is available.
///
/// Every character is 0.6em wide with a 0.8em ascent and 0.2em descent, and
/// non-whitespace characters render as filled boxes.
#[derive(Debug, Clone)]
pub struct BoxFont {
    size: f32,
}

impl BoxFont {
    pub const FAMILY: &'static str = "coredraw-fallback";

    pub fn new(size: f32) -> Self {
        Self { size }
    }
}

impl HostFont for BoxFont {
    fn family_name(&self) -> &str {
        Self::FAMILY
    }

    fn size(&self) -> f32 {
        self.size
    }

    fn ascent(&self) -> f32 {
        self.size * 0.8
    }

    fn descent(&self) -> f32 {
        self.size * 0.2
    }

    fn line_gap(&self) -> f32 {
        0.0
    }

    fn advance(&self, _ch: char) -> f32 {
        self.size * 0.6
    }

    fn glyph_path(&self, ch: char) -> Option<Path> {
        if ch.is_whitespace() {
            return None;
        }
        let advance = self.advance(ch);
        let ascent = self.ascent();
        let rect = Rect::from_xywh(advance * 0.1, -ascent, advance * 0.8, ascent)?;
        Some(PathBuilder::from_rect(rect))
    }
}

/// Integer measurements of a host font.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    host: Arc<dyn HostFont>,
}

impl FontMetrics {
    pub fn new(host: Arc<dyn HostFont>) -> Self {
        Self { host }
    }

    pub fn host(&self) -> &Arc<dyn HostFont> {
        &self.host
    }

    pub fn ascent(&self) -> i32 {
        self.host.ascent().round() as i32
    }

    pub fn descent(&self) -> i32 {
        self.host.descent().round() as i32
    }

    /// Ascent plus descent plus leading.
    pub fn line_height(&self) -> i32 {
        self.ascent() + self.descent() + self.host.line_gap().round() as i32
    }

    pub fn char_width(&self, ch: char) -> i32 {
        self.host.advance(ch).round() as i32
    }

    pub fn string_width(&self, text: &str) -> i32 {
        self.advance_sum(text.chars())
    }

    /// Width of `length` chars of `text` starting at char `offset`.
    pub fn substring_width(&self, text: &str, offset: usize, length: usize) -> DrawResult<i32> {
        let count = text.chars().count();
        check_range(offset, length, count)?;
        Ok(self.advance_sum(text.chars().skip(offset).take(length)))
    }

    /// Width of `length` chars of `chars` starting at `offset`.
    pub fn chars_width(&self, chars: &[char], offset: usize, length: usize) -> DrawResult<i32> {
        check_range(offset, length, chars.len())?;
        Ok(self.advance_sum(chars[offset..offset + length].iter().copied()))
    }

    fn advance_sum(&self, chars: impl Iterator<Item = char>) -> i32 {
        chars.map(|ch| self.host.advance(ch)).sum::<f32>().round() as i32
    }
}

pub(crate) fn check_range(offset: usize, length: usize, len: usize) -> DrawResult<()> {
    match offset.checked_add(length) {
        Some(end) if end <= len => Ok(()),
        _ => Err(DrawError::InvalidArgument(format!(
            "offset {offset} + length {length} exceeds {len}"
        ))),
    }
}

#[derive(Debug, Clone, Copy)]
struct LineMetrics {
    ascent: i32,
    descent: i32,
    height: i32,
}

struct FontInner {
    face: FontFace,
    style: FontStyle,
    size: FontSize,
    points: u32,
    metrics: FontMetrics,
    line: OnceLock<LineMetrics>,
}

/// An immutable font. Clones share the same host handle.
#[derive(Clone)]
pub struct Font {
    inner: Arc<FontInner>,
}

impl Font {
    pub fn new(
        face: FontFace,
        style: FontStyle,
        size: FontSize,
        points: u32,
        host: Arc<dyn HostFont>,
    ) -> Self {
        Self {
            inner: Arc::new(FontInner {
                face,
                style,
                size,
                points,
                metrics: FontMetrics::new(host),
                line: OnceLock::new(),
            }),
        }
    }

    pub fn face(&self) -> FontFace {
        self.inner.face
    }

    pub fn style(&self) -> FontStyle {
        self.inner.style
    }

    pub fn size(&self) -> FontSize {
        self.inner.size
    }

    /// Point size the host handle was created at.
    pub fn points(&self) -> u32 {
        self.inner.points
    }

    pub fn family_name(&self) -> &str {
        self.inner.metrics.host().family_name()
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.inner.metrics
    }

    pub fn host(&self) -> &Arc<dyn HostFont> {
        self.inner.metrics.host()
    }

    fn line(&self) -> LineMetrics {
        *self.inner.line.get_or_init(|| LineMetrics {
            ascent: self.inner.metrics.ascent(),
            descent: self.inner.metrics.descent(),
            height: self.inner.metrics.line_height(),
        })
    }

    pub fn ascent(&self) -> i32 {
        self.line().ascent
    }

    pub fn descent(&self) -> i32 {
        self.line().descent
    }

    pub fn height(&self) -> i32 {
        self.line().height
    }

    /// Distance from the top of a line to the baseline.
    pub fn baseline_position(&self) -> i32 {
        self.ascent()
    }

    pub fn char_width(&self, ch: char) -> i32 {
        self.inner.metrics.char_width(ch)
    }

    pub fn string_width(&self, text: &str) -> i32 {
        self.inner.metrics.string_width(text)
    }

    pub fn substring_width(&self, text: &str, offset: usize, length: usize) -> DrawResult<i32> {
        self.inner.metrics.substring_width(text, offset, length)
    }

    pub fn chars_width(&self, chars: &[char], offset: usize, length: usize) -> DrawResult<i32> {
        self.inner.metrics.chars_width(chars, offset, length)
    }

    /// Whether two handles refer to the same font instance.
    pub fn ptr_eq(&self, other: &Font) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.face() == other.face()
                && self.style() == other.style()
                && self.size() == other.size()
                && self.points() == other.points()
                && self.family_name() == other.family_name())
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("family", &self.family_name())
            .field("face", &self.face())
            .field("style", &self.style())
            .field("size", &self.size())
            .field("points", &self.points())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_font(points: u32) -> Font {
        Font::new(
            FontFace::Proportional,
            FontStyle::Plain,
            FontSize::Points(points),
            points,
            Arc::new(BoxFont::new(points as f32)),
        )
    }

    #[test]
    fn test_box_font_metrics() {
        let font = box_font(10);
        assert_eq!(font.ascent(), 8);
        assert_eq!(font.descent(), 2);
        assert_eq!(font.height(), 10);
        assert_eq!(font.baseline_position(), 8);
        assert_eq!(font.char_width('W'), 6);
        assert_eq!(font.string_width("abc"), 18);
        assert_eq!(font.string_width(""), 0);
    }

    #[test]
    fn test_string_width_rounds_once() {
        // 0.6 * 12 = 7.2 per char: 3 chars are 21.6, not 3 * 7.
        let font = box_font(12);
        assert_eq!(font.char_width('a'), 7);
        assert_eq!(font.string_width("aaa"), 22);
    }

    #[test]
    fn test_substring_width() {
        let font = box_font(10);
        assert_eq!(font.substring_width("hello", 1, 3), Ok(18));
        assert_eq!(font.substring_width("hello", 5, 0), Ok(0));
        assert!(matches!(
            font.substring_width("hello", 3, 3),
            Err(DrawError::InvalidArgument(_))
        ));
        assert!(font.substring_width("hello", usize::MAX, 2).is_err());
    }

    #[test]
    fn test_substring_counts_chars() {
        let font = box_font(10);
        assert_eq!(font.substring_width("héllo", 1, 4), Ok(24));
    }

    #[test]
    fn test_chars_width() {
        let font = box_font(10);
        let chars: Vec<char> = "abcdef".chars().collect();
        assert_eq!(font.chars_width(&chars, 2, 2), Ok(12));
        assert!(font.chars_width(&chars, 4, 3).is_err());
    }

    #[test]
    fn test_box_glyphs() {
        let host = BoxFont::new(10.0);
        assert!(host.glyph_path(' ').is_none());
        let Some(bounds) = host.glyph_path('x').map(|p| p.bounds()) else {
            panic!("expected a box glyph");
        };
        assert!((bounds.left() - 0.6).abs() < 1e-4);
        assert!((bounds.top() + 8.0).abs() < 1e-4);
        assert!((bounds.right() - 5.4).abs() < 1e-4);
        assert!(bounds.bottom().abs() < 1e-4);
    }

    #[test]
    fn test_face_font_rejects_garbage() {
        assert!(FaceFont::new(Arc::new(vec![0u8; 64]), 0, 12.0).is_none());
    }

    #[test]
    fn test_face_font_loads_each_glyph_once() {
        let data = Arc::new(include_bytes!("../tests/fonts/Tuffy.ttf").to_vec());
        let Some(host) = FaceFont::new(data, 0, 20.0) else {
            panic!("expected a parseable face");
        };

        let advance = host.advance('A');
        assert!(advance > 0.0);
        assert!(host.glyph_path('A').is_some());
        assert_eq!(host.advance('A'), advance);
        assert_eq!(host.cached_glyphs(), 1);

        let shared = host.clone();
        assert!(shared.glyph_path(' ').is_none());
        shared.advance('B');
        assert_eq!(host.cached_glyphs(), 3);
    }

    #[test]
    fn test_font_equality() {
        let a = box_font(10);
        let b = a.clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a, box_font(10));
        assert_ne!(a, box_font(12));
    }
}

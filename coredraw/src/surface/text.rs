//! Text primitives for DrawingSurface.

use super::DrawingSurface;
use crate::anchor::{resolve_origin, Anchor, AnchorContent};
use crate::error::DrawResult;
use crate::font::check_range;
use crate::target::PaintTarget;

impl<T: PaintTarget + 'static> DrawingSurface<T> {
    /// Draw `text` with the current font and color, positioned by `anchor`.
    pub fn draw_string(&mut self, text: &str, x: i32, y: i32, anchor: Anchor) -> DrawResult<()> {
        log::debug!(target: "coredraw", "draw_string {:?} {} {} {:?}", text, x, y, anchor);
        let font = &self.font;
        let content = AnchorContent::Text {
            width: font.string_width(text),
            ascent: font.ascent(),
            descent: font.descent(),
            line_height: font.height(),
        };
        let (bx, by) = resolve_origin(anchor, content, x, y)?;
        self.with_target(|t| t.draw_string(text, bx as f32, by as f32))
    }

    pub fn draw_char(&mut self, ch: char, x: i32, y: i32, anchor: Anchor) -> DrawResult<()> {
        let mut buf = [0u8; 4];
        self.draw_string(ch.encode_utf8(&mut buf), x, y, anchor)
    }

    /// Draw `length` chars of `data` starting at `offset`.
    pub fn draw_chars(
        &mut self,
        data: &[char],
        offset: usize,
        length: usize,
        x: i32,
        y: i32,
        anchor: Anchor,
    ) -> DrawResult<()> {
        check_range(offset, length, data.len())?;
        let text: String = data[offset..offset + length].iter().collect();
        self.draw_string(&text, x, y, anchor)
    }

    /// Draw `length` chars of `text` starting at char `offset`.
    pub fn draw_substring(
        &mut self,
        text: &str,
        offset: usize,
        length: usize,
        x: i32,
        y: i32,
        anchor: Anchor,
    ) -> DrawResult<()> {
        check_range(offset, length, text.chars().count())?;
        let sub: String = text.chars().skip(offset).take(length).collect();
        self.draw_string(&sub, x, y, anchor)
    }
}

#[cfg(test)]
mod tests {
    use crate::anchor::Anchor;
    use crate::error::DrawError;
    use crate::surface::tests::pixmap_surface;

    fn alpha(surface: &crate::DrawingSurface, x: u32, y: u32) -> u8 {
        let target = surface.target().unwrap();
        let pixmap = target.pixmap().borrow();
        pixmap.pixel(x, y).map(|p| p.alpha()).unwrap_or(0)
    }

    #[test]
    fn test_top_left_text_hangs_below_y() {
        // Default font is 12pt fallback boxes: ascent 10, advance 7.2.
        let (mut surface, _channel) = pixmap_surface(40, 20);
        surface.draw_string("A", 0, 0, Anchor::TOP_LEFT).unwrap();
        assert_eq!(alpha(&surface, 3, 5), 255);
        assert_eq!(alpha(&surface, 3, 11), 0);
    }

    #[test]
    fn test_baseline_text_sits_above_y() {
        let (mut surface, _channel) = pixmap_surface(40, 20);
        surface
            .draw_string("A", 0, 15, Anchor::BASELINE | Anchor::LEFT)
            .unwrap();
        assert_eq!(alpha(&surface, 3, 10), 255);
        assert_eq!(alpha(&surface, 3, 16), 0);
    }

    #[test]
    fn test_whitespace_draws_nothing() {
        let (mut surface, _channel) = pixmap_surface(20, 20);
        surface.draw_string("   ", 0, 0, Anchor::empty()).unwrap();
        for y in 0..20 {
            for x in 0..20 {
                assert_eq!(alpha(&surface, x, y), 0);
            }
        }
    }

    #[test]
    fn test_invalid_anchor_draws_nothing() {
        let (mut surface, _channel) = pixmap_surface(20, 20);
        let err = surface.draw_string("A", 0, 0, Anchor::TOP | Anchor::BOTTOM);
        assert_eq!(err, Err(DrawError::InvalidAnchor(48)));
        assert_eq!(alpha(&surface, 3, 5), 0);
    }

    #[test]
    fn test_offsets_are_validated() {
        let (mut surface, _channel) = pixmap_surface(20, 20);
        let chars: Vec<char> = "abc".chars().collect();
        assert!(matches!(
            surface.draw_chars(&chars, 2, 2, 0, 0, Anchor::empty()),
            Err(DrawError::InvalidArgument(_))
        ));
        assert!(matches!(
            surface.draw_substring("abc", 4, 0, 0, 0, Anchor::empty()),
            Err(DrawError::InvalidArgument(_))
        ));
        assert!(surface.draw_substring("abc", 1, 2, 0, 0, Anchor::empty()).is_ok());
        assert!(surface.draw_char('x', 0, 0, Anchor::empty()).is_ok());
    }
}

//! Shape primitives for DrawingSurface.

use super::DrawingSurface;
use crate::error::DrawResult;
use crate::shapes;
use crate::target::PaintTarget;
use tiny_skia::Path;

impl<T: PaintTarget + 'static> DrawingSurface<T> {
    fn stroke(&self, path: Option<Path>) -> DrawResult<()> {
        self.with_target(|t| {
            if let Some(path) = path {
                t.stroke_path(&path);
            }
        })
    }

    fn fill(&self, path: Option<Path>) -> DrawResult<()> {
        self.with_target(|t| {
            if let Some(path) = path {
                t.fill_path(&path);
            }
        })
    }

    /// Draw a 1px line between two points, both included.
    pub fn draw_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> DrawResult<()> {
        log::debug!(target: "coredraw", "draw_line {} {} {} {}", x1, y1, x2, y2);
        match shapes::line(x1, y1, x2, y2) {
            Some(path) => self.stroke(Some(path)),
            // A zero-length line still covers its pixel.
            None => self.fill(shapes::rect(x1, y1, 1, 1)),
        }
    }

    /// Outline covering `width + 1` by `height + 1` pixels.
    pub fn draw_rect(&mut self, x: i32, y: i32, width: i32, height: i32) -> DrawResult<()> {
        log::debug!(target: "coredraw", "draw_rect {} {} {} {}", x, y, width, height);
        self.stroke(shapes::rect_outline(x, y, width, height))
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, width: i32, height: i32) -> DrawResult<()> {
        log::debug!(target: "coredraw", "fill_rect {} {} {} {}", x, y, width, height);
        self.fill(shapes::rect(x, y, width, height))
    }

    pub fn draw_round_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        arc_width: i32,
        arc_height: i32,
    ) -> DrawResult<()> {
        log::debug!(
            target: "coredraw",
            "draw_round_rect {} {} {} {} {} {}", x, y, width, height, arc_width, arc_height
        );
        self.stroke(shapes::round_rect(x, y, width, height, arc_width, arc_height, true))
    }

    pub fn fill_round_rect(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        arc_width: i32,
        arc_height: i32,
    ) -> DrawResult<()> {
        log::debug!(
            target: "coredraw",
            "fill_round_rect {} {} {} {} {} {}", x, y, width, height, arc_width, arc_height
        );
        self.fill(shapes::round_rect(x, y, width, height, arc_width, arc_height, false))
    }

    /// Outline of an elliptical arc. Angles are degrees, counterclockwise
    /// from three o'clock.
    pub fn draw_arc(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        start_angle: i32,
        arc_angle: i32,
    ) -> DrawResult<()> {
        log::debug!(
            target: "coredraw",
            "draw_arc {} {} {} {} {} {}", x, y, width, height, start_angle, arc_angle
        );
        self.stroke(shapes::arc(x, y, width, height, start_angle, arc_angle, false))
    }

    /// Filled pie slice of an elliptical arc.
    pub fn fill_arc(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        start_angle: i32,
        arc_angle: i32,
    ) -> DrawResult<()> {
        log::debug!(
            target: "coredraw",
            "fill_arc {} {} {} {} {} {}", x, y, width, height, start_angle, arc_angle
        );
        self.fill(shapes::arc(x, y, width, height, start_angle, arc_angle, true))
    }

    pub fn fill_triangle(
        &mut self,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        x3: i32,
        y3: i32,
    ) -> DrawResult<()> {
        log::debug!(
            target: "coredraw",
            "fill_triangle {} {} {} {} {} {}", x1, y1, x2, y2, x3, y3
        );
        self.fill(shapes::triangle(x1, y1, x2, y2, x3, y3))
    }
}

//! Integer shape geometry as tiny-skia paths.
//!
//! Outlines are offset by half a pixel so 1px strokes land on pixel centers,
//! and an outline of a `w x h` rectangle covers `w + 1` by `h + 1` pixels.
//! Arc angles are in degrees, counterclockwise from three o'clock.

use std::f32::consts::FRAC_PI_2;
use tiny_skia::{Path, PathBuilder, Rect};

/// Segment of a 1px line, or `None` for a single point.
pub fn line(x1: i32, y1: i32, x2: i32, y2: i32) -> Option<Path> {
    if x1 == x2 && y1 == y2 {
        return None;
    }
    let mut pb = PathBuilder::new();
    pb.move_to(x1 as f32 + 0.5, y1 as f32 + 0.5);
    pb.line_to(x2 as f32 + 0.5, y2 as f32 + 0.5);
    pb.finish()
}

/// Filled rectangle. Non-positive sizes produce nothing.
pub fn rect(x: i32, y: i32, width: i32, height: i32) -> Option<Path> {
    if width <= 0 || height <= 0 {
        return None;
    }
    let r = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32)?;
    Some(PathBuilder::from_rect(r))
}

/// Rectangle outline. Negative sizes produce nothing.
pub fn rect_outline(x: i32, y: i32, width: i32, height: i32) -> Option<Path> {
    if width < 0 || height < 0 {
        return None;
    }
    if width == 0 || height == 0 {
        return line(x, y, x + width, y + height);
    }
    let r = Rect::from_xywh(x as f32 + 0.5, y as f32 + 0.5, width as f32, height as f32)?;
    Some(PathBuilder::from_rect(r))
}

/// Rounded rectangle with elliptical corners of `arc_width x arc_height`.
pub fn round_rect(
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    arc_width: i32,
    arc_height: i32,
    outline: bool,
) -> Option<Path> {
    if width < 0 || height < 0 || (!outline && (width == 0 || height == 0)) {
        return None;
    }
    let offset = if outline { 0.5 } else { 0.0 };
    let (left, top) = (x as f32 + offset, y as f32 + offset);
    let (w, h) = (width as f32, height as f32);
    let rx = (arc_width.max(0) as f32).min(w) / 2.0;
    let ry = (arc_height.max(0) as f32).min(h) / 2.0;
    if rx <= 0.0 || ry <= 0.0 {
        return if outline {
            rect_outline(x, y, width, height)
        } else {
            rect(x, y, width, height)
        };
    }

    let (right, bottom) = (left + w, top + h);
    let mut pb = PathBuilder::new();
    pb.move_to(right - rx, top);
    // Clockwise on screen from the top edge.
    arc_segments(&mut pb, right - rx, top + ry, rx, ry, FRAC_PI_2, -FRAC_PI_2, true);
    pb.line_to(right, bottom - ry);
    arc_segments(&mut pb, right - rx, bottom - ry, rx, ry, 0.0, -FRAC_PI_2, true);
    pb.line_to(left + rx, bottom);
    arc_segments(&mut pb, left + rx, bottom - ry, rx, ry, -FRAC_PI_2, -FRAC_PI_2, true);
    pb.line_to(left, top + ry);
    arc_segments(&mut pb, left + rx, top + ry, rx, ry, 2.0 * FRAC_PI_2, -FRAC_PI_2, true);
    pb.close();
    pb.finish()
}

/// Elliptical arc inscribed in the `width x height` box at `(x, y)`.
///
/// With `pie` set the arc is closed through the center, as a filled arc is.
#[allow(clippy::too_many_arguments)]
pub fn arc(
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    start_angle: i32,
    arc_angle: i32,
    pie: bool,
) -> Option<Path> {
    if width <= 0 || height <= 0 || arc_angle == 0 {
        return None;
    }
    let offset = if pie { 0.0 } else { 0.5 };
    let rx = width as f32 / 2.0;
    let ry = height as f32 / 2.0;
    let cx = x as f32 + offset + rx;
    let cy = y as f32 + offset + ry;

    let full = arc_angle.abs() >= 360;
    let sweep = (arc_angle.clamp(-360, 360) as f32).to_radians();
    let start = (start_angle as f32).to_radians();

    let mut pb = PathBuilder::new();
    if pie && !full {
        pb.move_to(cx, cy);
        let (sx, sy) = ellipse_point(cx, cy, rx, ry, start);
        pb.line_to(sx, sy);
        arc_segments(&mut pb, cx, cy, rx, ry, start, sweep, true);
        pb.close();
    } else {
        arc_segments(&mut pb, cx, cy, rx, ry, start, sweep, false);
        if full {
            pb.close();
        }
    }
    pb.finish()
}

/// Filled triangle.
pub fn triangle(x1: i32, y1: i32, x2: i32, y2: i32, x3: i32, y3: i32) -> Option<Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(x1 as f32, y1 as f32);
    pb.line_to(x2 as f32, y2 as f32);
    pb.line_to(x3 as f32, y3 as f32);
    pb.close();
    pb.finish()
}

/// Point on the ellipse at `angle`, measured counterclockwise on screen.
fn ellipse_point(cx: f32, cy: f32, rx: f32, ry: f32, angle: f32) -> (f32, f32) {
    (cx + rx * angle.cos(), cy - ry * angle.sin())
}

/// Append an arc as cubic bezier segments of at most a quarter turn.
///
/// With `connected` set the path is assumed to already end at the arc's
/// start point; otherwise a new subpath is started there.
#[allow(clippy::too_many_arguments)]
fn arc_segments(
    pb: &mut PathBuilder,
    cx: f32,
    cy: f32,
    rx: f32,
    ry: f32,
    start: f32,
    sweep: f32,
    connected: bool,
) {
    if !connected {
        let (sx, sy) = ellipse_point(cx, cy, rx, ry, start);
        pb.move_to(sx, sy);
    }

    let num_segments = ((sweep.abs() / FRAC_PI_2).ceil() as usize).max(1);
    let segment_angle = sweep / num_segments as f32;
    let k = 4.0 / 3.0 * (segment_angle / 4.0).tan();

    for i in 0..num_segments {
        let a1 = start + i as f32 * segment_angle;
        let a2 = a1 + segment_angle;

        let (x1, y1) = ellipse_point(cx, cy, rx, ry, a1);
        let (x2, y2) = ellipse_point(cx, cy, rx, ry, a2);

        // Tangent of (cos a, -sin a) is (-sin a, -cos a).
        let cp1 = (x1 - k * rx * a1.sin(), y1 - k * ry * a1.cos());
        let cp2 = (x2 + k * rx * a2.sin(), y2 + k * ry * a2.cos());

        pb.cubic_to(cp1.0, cp1.1, cp2.0, cp2.1, x2, y2);
    }
}

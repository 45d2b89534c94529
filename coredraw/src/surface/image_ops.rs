//! Image and pixel-buffer primitives for DrawingSurface.

use super::DrawingSurface;
use crate::anchor::{resolve_origin, resolve_region_origin, Anchor, AnchorContent};
use crate::error::{DrawError, DrawResult};
use crate::image::{argb_to_pixel, check_scanlines, scan_index, Image};
use crate::region::{check_region_bounds, plan_transform, RegionTransform};
use crate::target::{ClipRect, PaintTarget};
use tiny_skia::Pixmap;

impl<T: PaintTarget + 'static> DrawingSurface<T> {
    /// Draw `image` positioned by `anchor`. `BASELINE` is not valid here.
    pub fn draw_image(&mut self, image: &Image, x: i32, y: i32, anchor: Anchor) -> DrawResult<()> {
        log::debug!(target: "coredraw", "draw_image {:?} {} {} {:?}", image, x, y, anchor);
        let content = AnchorContent::Box {
            width: image.width(),
            height: image.height(),
        };
        let (left, top) = resolve_origin(anchor, content, x, y)?;
        let pixmap = image.to_pixmap();
        self.with_target(|t| t.draw_pixmap(pixmap.as_ref(), left, top))
    }

    /// Copy a region of `image`, transformed, onto this surface.
    ///
    /// `anchor` refers to the transformed region, so after a quarter turn the
    /// anchor box is `height x width`. The target transform is the same
    /// before and after the call.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_region(
        &mut self,
        image: &Image,
        x_src: i32,
        y_src: i32,
        width: i32,
        height: i32,
        transform: RegionTransform,
        x_dest: i32,
        y_dest: i32,
        anchor: Anchor,
    ) -> DrawResult<()> {
        log::debug!(
            target: "coredraw",
            "draw_region {} {} {} {} {:?} {} {} {:?}",
            x_src, y_src, width, height, transform, x_dest, y_dest, anchor
        );
        check_region_bounds(
            x_src,
            y_src,
            width,
            height,
            image.width() as u32,
            image.height() as u32,
        )?;
        let plan = plan_transform(transform, width, height);
        let (left, top) =
            resolve_region_origin(anchor, plan.dest_width, plan.dest_height, x_dest, y_dest)?;
        let region = image.region(x_src, y_src, width, height)?;

        self.with_target(|t| {
            let saved = t.transform();
            t.translate(left as f32, top as f32);
            t.concat(plan.to_transform());
            t.draw_pixmap(region.as_ref(), 0, 0);
            t.set_transform(saved);
        })
    }

    /// Copy an area of this surface's target to another position.
    ///
    /// Only `TOP | LEFT` is accepted as the destination anchor.
    #[allow(clippy::too_many_arguments)]
    pub fn copy_area(
        &mut self,
        x_src: i32,
        y_src: i32,
        width: i32,
        height: i32,
        x_dest: i32,
        y_dest: i32,
        anchor: Anchor,
    ) -> DrawResult<()> {
        log::debug!(
            target: "coredraw",
            "copy_area {} {} {} {} {} {} {:?}",
            x_src, y_src, width, height, x_dest, y_dest, anchor
        );
        if anchor != Anchor::TOP_LEFT {
            return Err(DrawError::NotImplemented(
                "copy_area only supports a TOP | LEFT anchor",
            ));
        }
        let (tx, ty) = (self.translate_x, self.translate_y);
        self.with_target(|t| {
            let (bounds_width, bounds_height) = t.size();
            check_region_bounds(
                x_src.wrapping_add(tx),
                y_src.wrapping_add(ty),
                width,
                height,
                bounds_width,
                bounds_height,
            )?;
            t.copy_area(
                ClipRect::new(x_src, y_src, width, height),
                x_dest - x_src,
                y_dest - y_src,
            )
        })?
    }

    /// Draw a `width x height` block of ARGB values with its top-left corner
    /// at `(x, y)`.
    ///
    /// Row `r` is read from `offset + r * scanlength`. Without
    /// `process_alpha` every pixel is drawn opaque. A zero width or height
    /// draws nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_rgb(
        &mut self,
        rgb_data: &[u32],
        offset: usize,
        scanlength: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        process_alpha: bool,
    ) -> DrawResult<()> {
        log::debug!(
            target: "coredraw",
            "draw_rgb offset={} scanlength={} {} {} {} {} {}",
            offset, scanlength, x, y, width, height, process_alpha
        );
        if width == 0 || height == 0 {
            return Ok(());
        }
        if width < 0 || height < 0 {
            return Err(DrawError::InvalidArgument(format!(
                "negative draw_rgb size {width}x{height}"
            )));
        }
        check_scanlines(rgb_data.len(), offset, scanlength, width, height)?;

        let mut pixmap = Pixmap::new(width as u32, height as u32)
            .ok_or(DrawError::InvalidDimensions { width, height })?;
        let pixels = pixmap.pixels_mut();
        for row in 0..height {
            for col in 0..width {
                let value = rgb_data[scan_index(offset, scanlength, col, row)];
                let value = if process_alpha { value } else { value | 0xFF00_0000 };
                pixels[(row * width + col) as usize] = argb_to_pixel(value);
            }
        }
        self.with_target(|t| t.draw_pixmap(pixmap.as_ref(), x, y))
    }
}

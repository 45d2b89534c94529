//! Images and their lazily created drawing surfaces.

use crate::context::CoreDraw;
use crate::error::{DrawError, DrawResult};
use crate::font_factory::FontFactory;
use crate::quality::QualityChannel;
use crate::surface::DrawingSurface;
use crate::target::{ClipRect, PaintTarget, PixmapTarget};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tiny_skia::{
    BlendMode, ColorU8, FilterQuality, IntRect, Pixmap, PixmapPaint, PremultipliedColorU8,
    Transform,
};

/// Maximum image dimension.
const MAX_DIMENSION: i32 = 32767;

/// Convert 0xAARRGGBB to a premultiplied pixel.
pub(crate) fn argb_to_pixel(argb: u32) -> PremultipliedColorU8 {
    let [a, r, g, b] = argb.to_be_bytes();
    ColorU8::from_rgba(r, g, b, a).premultiply()
}

/// Convert a premultiplied pixel to 0xAARRGGBB.
pub(crate) fn pixel_to_argb(pixel: PremultipliedColorU8) -> u32 {
    let c = pixel.demultiply();
    u32::from_be_bytes([c.alpha(), c.red(), c.green(), c.blue()])
}

/// Validate a scanline layout of `height` rows of `width` pixels, `scanlength`
/// apart, starting at `offset` in a buffer of `len` entries.
pub(crate) fn check_scanlines(
    len: usize,
    offset: usize,
    scanlength: i32,
    width: i32,
    height: i32,
) -> DrawResult<()> {
    let len = len as i64;
    let offset = offset as i64;
    let first = offset;
    let last = offset + scanlength as i64 * (height as i64 - 1);
    let lowest = first.min(last);
    let highest = first.max(last) + width as i64;
    if offset >= len || lowest < 0 || highest > len {
        return Err(DrawError::InvalidArgument(format!(
            "{height} rows of {width} at offset {offset} with scanlength {scanlength} \
             exceed buffer of {len}"
        )));
    }
    Ok(())
}

/// Index of pixel `(col, row)` in a scanline buffer. Callers validate first.
pub(crate) fn scan_index(offset: usize, scanlength: i32, col: i32, row: i32) -> usize {
    (offset as i64 + row as i64 * scanlength as i64 + col as i64) as usize
}

/// A raster image.
///
/// Blank images are mutable and get a drawing surface on first call to
/// [`Image::graphics`]. Decoded and RGB images are immutable.
pub struct Image {
    width: i32,
    height: i32,
    mutable: bool,
    /// Background still to be painted, if any.
    background: Cell<Option<u32>>,
    pixmap: Rc<RefCell<Pixmap>>,
    fonts: Rc<FontFactory>,
    channel: QualityChannel,
    surface: Option<DrawingSurface>,
}

impl Image {
    fn with_pixmap(ctx: &CoreDraw, pixmap: Pixmap, mutable: bool, background: Option<u32>) -> Self {
        Self {
            width: pixmap.width() as i32,
            height: pixmap.height() as i32,
            mutable,
            background: Cell::new(background),
            pixmap: Rc::new(RefCell::new(pixmap)),
            fonts: ctx.fonts().clone(),
            channel: ctx.quality().clone(),
            surface: None,
        }
    }

    fn new_pixmap(width: i32, height: i32) -> DrawResult<Pixmap> {
        let invalid = DrawError::InvalidDimensions { width, height };
        if width <= 0 || height <= 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(invalid);
        }
        Pixmap::new(width as u32, height as u32).ok_or(invalid)
    }

    /// Mutable blank image filled with the configured default background.
    pub fn blank(ctx: &CoreDraw, width: i32, height: i32) -> DrawResult<Self> {
        Self::blank_with_background(ctx, width, height, ctx.config().default_image_background)
    }

    /// Mutable blank image with an ARGB background.
    ///
    /// A background with zero alpha leaves the image fully transparent.
    pub fn blank_with_background(
        ctx: &CoreDraw,
        width: i32,
        height: i32,
        background: u32,
    ) -> DrawResult<Self> {
        log::debug!(target: "coredraw", "image blank {}x{} {:#010x}", width, height, background);
        let pixmap = Self::new_pixmap(width, height)?;
        Ok(Self::with_pixmap(ctx, pixmap, true, Some(background)))
    }

    /// Immutable image decoded from PNG bytes.
    pub fn from_png(ctx: &CoreDraw, bytes: &[u8]) -> DrawResult<Self> {
        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(png::Transformations::normalize_to_color8());
        let mut reader = decoder.read_info()?;
        let (png_width, png_height) = (reader.info().width, reader.info().height);
        if png_width > MAX_DIMENSION as u32 || png_height > MAX_DIMENSION as u32 {
            return Err(DrawError::InvalidDimensions {
                width: i32::try_from(png_width).unwrap_or(i32::MAX),
                height: i32::try_from(png_height).unwrap_or(i32::MAX),
            });
        }
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        let data = &buf[..info.buffer_size()];

        let width = info.width as i32;
        let height = info.height as i32;
        let mut pixmap = Self::new_pixmap(width, height)?;
        let channels = match info.color_type {
            png::ColorType::Grayscale => 1,
            png::ColorType::GrayscaleAlpha => 2,
            png::ColorType::Rgb => 3,
            png::ColorType::Rgba => 4,
            png::ColorType::Indexed => {
                return Err(DrawError::PngError("unexpanded indexed color".to_string()));
            }
        };

        for (pixel, src) in pixmap
            .pixels_mut()
            .iter_mut()
            .zip(data.chunks_exact(channels))
        {
            let (r, g, b, a) = match *src {
                [v] => (v, v, v, 255),
                [v, a] => (v, v, v, a),
                [r, g, b] => (r, g, b, 255),
                [r, g, b, a] => (r, g, b, a),
                _ => (0, 0, 0, 0),
            };
            *pixel = ColorU8::from_rgba(r, g, b, a).premultiply();
        }

        log::debug!(target: "coredraw", "image from_png {}x{}", width, height);
        Ok(Self::with_pixmap(ctx, pixmap, false, None))
    }

    /// Immutable image from `width * height` ARGB values.
    ///
    /// Without `process_alpha` every pixel is fully opaque.
    pub fn from_rgb(
        ctx: &CoreDraw,
        argb: &[u32],
        width: i32,
        height: i32,
        process_alpha: bool,
    ) -> DrawResult<Self> {
        let mut pixmap = Self::new_pixmap(width, height)?;
        let count = width as usize * height as usize;
        if argb.len() < count {
            return Err(DrawError::InvalidArgument(format!(
                "{} values for a {width}x{height} image",
                argb.len()
            )));
        }
        for (pixel, &value) in pixmap.pixels_mut().iter_mut().zip(argb) {
            let value = if process_alpha { value } else { value | 0xFF00_0000 };
            *pixel = argb_to_pixel(value);
        }
        Ok(Self::with_pixmap(ctx, pixmap, false, None))
    }

    /// Immutable copy of this image's current pixels.
    pub fn immutable_copy(&self) -> Self {
        self.settle_background();
        Self {
            width: self.width,
            height: self.height,
            mutable: false,
            background: Cell::new(None),
            pixmap: Rc::new(RefCell::new(self.pixmap.borrow().clone())),
            fonts: self.fonts.clone(),
            channel: self.channel.clone(),
            surface: None,
        }
    }

    /// Immutable copy resampled to `width` x `height`.
    ///
    /// With `higher_quality` the pixels are filtered bilinearly, halving the
    /// size step by step while the source is more than twice the target.
    /// Otherwise a single nearest-neighbour pass is used.
    pub fn scaled(&self, width: i32, height: i32, higher_quality: bool) -> DrawResult<Self> {
        Self::new_pixmap(width, height)?;
        log::debug!(
            target: "coredraw",
            "image scaled {}x{} -> {}x{} {}",
            self.width, self.height, width, height, higher_quality
        );
        self.settle_background();
        let (width, height) = (width as u32, height as u32);
        let mut current = self.pixmap.borrow().clone();
        let quality = if higher_quality {
            while current.width() > width * 2 || current.height() > height * 2 {
                let step_width = (current.width() / 2).max(width);
                let step_height = (current.height() / 2).max(height);
                current = resample(&current, step_width, step_height, FilterQuality::Bilinear)?;
            }
            FilterQuality::Bilinear
        } else {
            FilterQuality::Nearest
        };
        let pixmap = resample(&current, width, height, quality)?;

        Ok(Self {
            width: width as i32,
            height: height as i32,
            mutable: false,
            background: Cell::new(None),
            pixmap: Rc::new(RefCell::new(pixmap)),
            fonts: self.fonts.clone(),
            channel: self.channel.clone(),
            surface: None,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// The drawing surface for this image, created on first use.
    ///
    /// Creation paints the initial background (or clears to transparent when
    /// its alpha is zero) and clips to the image bounds.
    pub fn graphics(&mut self) -> DrawResult<&mut DrawingSurface> {
        if !self.mutable {
            return Err(DrawError::IllegalState("image is immutable"));
        }
        let surface = match self.surface.take() {
            Some(surface) => surface,
            None => self.realize_surface()?,
        };
        Ok(self.surface.insert(surface))
    }

    /// The drawing surface, only if [`Image::graphics`] already created it.
    pub fn surface(&mut self) -> DrawResult<&mut DrawingSurface> {
        self.surface
            .as_mut()
            .ok_or(DrawError::IllegalState("image surface has not been realized"))
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Drop the drawing surface. A later [`Image::graphics`] creates a fresh
    /// one over the same pixels.
    pub fn dispose(&mut self) {
        log::debug!(target: "coredraw", "image dispose");
        self.surface = None;
    }

    fn realize_surface(&mut self) -> DrawResult<DrawingSurface> {
        log::debug!(target: "coredraw", "image realize surface {}x{}", self.width, self.height);
        let mut surface = DrawingSurface::new(self.fonts.clone(), self.channel.clone());
        surface.bind(PixmapTarget::new(self.pixmap.clone()));

        let full = ClipRect::new(0, 0, self.width, self.height);
        if let Some(background) = self.background.take() {
            let fill = crate::shapes::rect(0, 0, self.width, self.height);
            let color = surface.color();
            surface.with_target(|t| {
                if background >> 24 == 0 {
                    t.clear_rect(full);
                } else {
                    t.set_color(0xFF00_0000 | background);
                    if let Some(path) = &fill {
                        t.fill_path(path);
                    }
                    t.set_color(0xFF00_0000 | color);
                }
            })?;
        }
        surface.set_clip(full.x, full.y, full.width, full.height)?;
        Ok(surface)
    }

    /// Paint a pending background straight into the pixels.
    fn settle_background(&self) {
        if let Some(background) = self.background.take() {
            let pixel = if background >> 24 == 0 {
                PremultipliedColorU8::TRANSPARENT
            } else {
                argb_to_pixel(0xFF00_0000 | background)
            };
            self.pixmap.borrow_mut().pixels_mut().fill(pixel);
        }
    }

    /// Copy of the current pixels.
    pub fn to_pixmap(&self) -> Pixmap {
        self.settle_background();
        self.pixmap.borrow().clone()
    }

    /// Copy of a sub-rectangle, validated against the image bounds.
    pub fn region(&self, x: i32, y: i32, width: i32, height: i32) -> DrawResult<Pixmap> {
        crate::region::check_region_bounds(x, y, width, height, self.width as u32, self.height as u32)?;
        self.settle_background();
        IntRect::from_xywh(x, y, width as u32, height as u32)
            .and_then(|rect| self.pixmap.borrow().clone_rect(rect))
            .ok_or(DrawError::RegionOutOfBounds {
                x,
                y,
                width,
                height,
                bounds_width: self.width as u32,
                bounds_height: self.height as u32,
            })
    }

    /// Read ARGB pixels of a rectangle into `rgb_data`.
    ///
    /// Row `r` is written at `offset + r * scanlength`. A non-positive width
    /// or height reads nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn get_rgb(
        &self,
        rgb_data: &mut [u32],
        offset: usize,
        scanlength: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> DrawResult<()> {
        if width <= 0 || height <= 0 {
            return Ok(());
        }
        self.check_area(x, y, width, height)?;
        if scanlength.unsigned_abs() < width as u32 {
            return Err(DrawError::InvalidArgument(format!(
                "abs value of scanlength {scanlength} is less than width {width}"
            )));
        }
        check_scanlines(rgb_data.len(), offset, scanlength, width, height)?;

        self.settle_background();
        let pixmap = self.pixmap.borrow();
        for row in 0..height {
            for col in 0..width {
                let pixel = pixmap
                    .pixel((x + col) as u32, (y + row) as u32)
                    .unwrap_or(PremultipliedColorU8::TRANSPARENT);
                rgb_data[scan_index(offset, scanlength, col, row)] = pixel_to_argb(pixel);
            }
        }
        Ok(())
    }

    /// Write ARGB pixels of a rectangle directly, without compositing.
    #[allow(clippy::too_many_arguments)]
    pub fn set_rgb(
        &mut self,
        rgb_data: &[u32],
        offset: usize,
        scanlength: i32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> DrawResult<()> {
        if !self.mutable {
            return Err(DrawError::IllegalState("image is immutable"));
        }
        if width <= 0 || height <= 0 {
            return Ok(());
        }
        self.check_area(x, y, width, height)?;
        check_scanlines(rgb_data.len(), offset, scanlength, width, height)?;

        self.settle_background();
        let mut pixmap = self.pixmap.borrow_mut();
        let stride = self.width as usize;
        let pixels = pixmap.pixels_mut();
        for row in 0..height {
            for col in 0..width {
                let value = rgb_data[scan_index(offset, scanlength, col, row)];
                pixels[(y + row) as usize * stride + (x + col) as usize] = argb_to_pixel(value);
            }
        }
        Ok(())
    }

    fn check_area(&self, x: i32, y: i32, width: i32, height: i32) -> DrawResult<()> {
        let outside = x < 0
            || y < 0
            || x as i64 + width as i64 > self.width as i64
            || y as i64 + height as i64 > self.height as i64;
        if outside {
            return Err(DrawError::InvalidArgument(format!(
                "area {x},{y} {width}x{height} exceeds image bounds {}x{}",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Encode the current pixels as PNG.
    pub fn to_png(&self) -> DrawResult<Vec<u8>> {
        self.settle_background();
        let pixmap = self.pixmap.borrow();
        let data: Vec<u8> = pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect();

        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, pixmap.width(), pixmap.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header()?;
            writer.write_image_data(&data)?;
        }
        Ok(buf)
    }
}

/// Scale `src` onto a new `width` x `height` pixmap.
fn resample(src: &Pixmap, width: u32, height: u32, quality: FilterQuality) -> DrawResult<Pixmap> {
    let mut dst = Pixmap::new(width, height).ok_or(DrawError::InvalidDimensions {
        width: width as i32,
        height: height as i32,
    })?;
    let paint = PixmapPaint {
        opacity: 1.0,
        blend_mode: BlendMode::Source,
        quality,
    };
    let transform = Transform::from_scale(
        width as f32 / src.width() as f32,
        height as f32 / src.height() as f32,
    );
    dst.draw_pixmap(0, 0, src.as_ref(), &paint, transform, None);
    Ok(dst)
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("mutable", &self.mutable)
            .field("has_surface", &self.surface.is_some())
            .finish()
    }
}

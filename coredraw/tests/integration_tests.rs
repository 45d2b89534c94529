//! Integration tests for coredraw.

use coredraw::{
    Anchor, ClipRect, CoreDraw, DrawConfig, DrawError, DrawingSurface, Feature, Font, FontConfig,
    Image, PaintTarget, RegionTransform, StrokeStyle,
};
use rstest::rstest;
use tiny_skia::{Path, PixmapRef, Point, Transform};

/// A host call seen by [`RecordingTarget`].
#[derive(Debug, Clone, PartialEq)]
enum Call {
    String {
        text: String,
        x: f32,
        y: f32,
    },
    Pixmap {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        transform: Transform,
    },
    CopyArea {
        rect: ClipRect,
        dx: i32,
        dy: i32,
    },
    Fill,
    Stroke,
    Clear(ClipRect),
}

/// Paint target that records what it is asked to draw.
#[derive(Debug)]
struct RecordingTarget {
    width: u32,
    height: u32,
    transform: Transform,
    clip: Option<ClipRect>,
    anti_alias: bool,
    text_anti_alias: bool,
    calls: Vec<Call>,
}

impl RecordingTarget {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            transform: Transform::identity(),
            clip: None,
            anti_alias: true,
            text_anti_alias: true,
            calls: Vec::new(),
        }
    }
}

impl PaintTarget for RecordingTarget {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn set_transform(&mut self, transform: Transform) {
        self.transform = transform;
    }

    fn set_color(&mut self, _argb: u32) {}

    fn set_font(&mut self, _font: &Font) {}

    fn set_stroke_style(&mut self, _style: StrokeStyle) {}

    fn set_clip(&mut self, rect: Option<ClipRect>) {
        self.clip = rect.map(|r| {
            ClipRect::new(
                r.x + self.transform.tx as i32,
                r.y + self.transform.ty as i32,
                r.width,
                r.height,
            )
        });
    }

    fn clip_bounds(&self) -> ClipRect {
        let device = self
            .clip
            .unwrap_or_else(|| ClipRect::new(0, 0, self.width as i32, self.height as i32));
        ClipRect::new(
            device.x - self.transform.tx as i32,
            device.y - self.transform.ty as i32,
            device.width,
            device.height,
        )
    }

    fn set_anti_alias(&mut self, enabled: bool) {
        self.anti_alias = enabled;
    }

    fn set_text_anti_alias(&mut self, enabled: bool) {
        self.text_anti_alias = enabled;
    }

    fn stroke_path(&mut self, _path: &Path) {
        self.calls.push(Call::Stroke);
    }

    fn fill_path(&mut self, _path: &Path) {
        self.calls.push(Call::Fill);
    }

    fn clear_rect(&mut self, rect: ClipRect) {
        self.calls.push(Call::Clear(rect));
    }

    fn draw_string(&mut self, text: &str, x: f32, y: f32) {
        self.calls.push(Call::String {
            text: text.to_string(),
            x,
            y,
        });
    }

    fn draw_pixmap(&mut self, pixmap: PixmapRef<'_>, x: i32, y: i32) {
        self.calls.push(Call::Pixmap {
            x,
            y,
            width: pixmap.width(),
            height: pixmap.height(),
            transform: self.transform,
        });
    }

    fn copy_area(&mut self, rect: ClipRect, dx: i32, dy: i32) -> coredraw::DrawResult<()> {
        self.calls.push(Call::CopyArea { rect, dx, dy });
        Ok(())
    }
}

fn test_context() -> CoreDraw {
    CoreDraw::new(DrawConfig {
        font: FontConfig {
            load_system_fonts: false,
            ..FontConfig::default()
        },
        ..DrawConfig::default()
    })
}

fn recording(ctx: &CoreDraw) -> DrawingSurface<RecordingTarget> {
    ctx.surface(RecordingTarget::new(100, 100))
}

fn calls(surface: &DrawingSurface<RecordingTarget>) -> Vec<Call> {
    surface
        .target()
        .map(|t| t.calls.clone())
        .unwrap_or_default()
}

/// Device-space bounding box of a `width x height` pixmap drawn at `(x, y)`.
fn device_bounds(call: &Call) -> (i32, i32, i32, i32) {
    let Call::Pixmap {
        x,
        y,
        width,
        height,
        transform,
    } = call
    else {
        panic!("expected a pixmap call, got {call:?}");
    };
    let (l, t) = (*x as f32, *y as f32);
    let (r, b) = (l + *width as f32, t + *height as f32);
    let mut points = [
        Point::from_xy(l, t),
        Point::from_xy(r, t),
        Point::from_xy(r, b),
        Point::from_xy(l, b),
    ];
    transform.map_points(&mut points);
    let min_x = points.iter().map(|p| p.x).fold(f32::MAX, f32::min);
    let min_y = points.iter().map(|p| p.y).fold(f32::MAX, f32::min);
    let max_x = points.iter().map(|p| p.x).fold(f32::MIN, f32::max);
    let max_y = points.iter().map(|p| p.y).fold(f32::MIN, f32::max);
    (
        min_x.round() as i32,
        min_y.round() as i32,
        max_x.round() as i32,
        max_y.round() as i32,
    )
}

/// Read every pixel of an image as ARGB.
fn image_pixels(image: &Image) -> Vec<u32> {
    let mut buf = vec![0; (image.width() * image.height()) as usize];
    image
        .get_rgb(&mut buf, 0, image.width(), 0, 0, image.width(), image.height())
        .unwrap();
    buf
}

/// 3x2 image with a distinct opaque color per pixel.
fn numbered_image(ctx: &CoreDraw) -> Image {
    let data: Vec<u32> = (1..=6).map(|v| 0xFF00_0000 | (v * 0x10)).collect();
    Image::from_rgb(ctx, &data, 3, 2, false).unwrap()
}

#[rstest]
#[case(Anchor::TOP | Anchor::LEFT, 100, 100)]
#[case(Anchor::empty(), 100, 100)]
#[case(Anchor::BOTTOM | Anchor::RIGHT, 90, 80)]
#[case(Anchor::VCENTER | Anchor::HCENTER, 95, 90)]
#[case(Anchor::TOP | Anchor::HCENTER, 95, 100)]
#[case(Anchor::BOTTOM | Anchor::LEFT, 100, 80)]
#[case(Anchor::RIGHT, 90, 100)]
fn test_draw_image_anchor(#[case] anchor: Anchor, #[case] x: i32, #[case] y: i32) {
    let ctx = test_context();
    let image = Image::blank(&ctx, 10, 20).unwrap();
    let mut surface = recording(&ctx);
    surface.draw_image(&image, 100, 100, anchor).unwrap();
    assert_eq!(
        calls(&surface),
        vec![Call::Pixmap {
            x,
            y,
            width: 10,
            height: 20,
            transform: Transform::identity(),
        }]
    );
}

#[rstest]
#[case(Anchor::TOP | Anchor::LEFT, 10.0, 20.0)]
#[case(Anchor::BASELINE | Anchor::RIGHT, -4.0, 10.0)]
#[case(Anchor::BOTTOM | Anchor::HCENTER, 3.0, 8.0)]
#[case(Anchor::VCENTER | Anchor::LEFT, 10.0, 16.0)]
#[case(Anchor::LEFT, 10.0, 10.0)]
#[case(Anchor::HCENTER, 3.0, 10.0)]
fn test_draw_string_anchor(#[case] anchor: Anchor, #[case] x: f32, #[case] y: f32) {
    // Default font: 12pt fallback, ascent 10, descent 2, "Hi" is 14 wide.
    let ctx = test_context();
    let mut surface = recording(&ctx);
    surface.draw_string("Hi", 10, 10, anchor).unwrap();
    assert_eq!(
        calls(&surface),
        vec![Call::String {
            text: "Hi".to_string(),
            x,
            y,
        }]
    );
}

#[rstest]
#[case(Anchor::TOP | Anchor::BOTTOM)]
#[case(Anchor::LEFT | Anchor::RIGHT | Anchor::TOP)]
#[case(Anchor::BASELINE | Anchor::VCENTER)]
fn test_contradictory_anchor_draws_nothing(#[case] anchor: Anchor) {
    let ctx = test_context();
    let image = Image::blank(&ctx, 4, 4).unwrap();
    let mut surface = recording(&ctx);
    assert!(matches!(
        surface.draw_string("x", 0, 0, anchor),
        Err(DrawError::InvalidAnchor(_))
    ));
    assert!(matches!(
        surface.draw_image(&image, 0, 0, anchor),
        Err(DrawError::InvalidAnchor(_))
    ));
    assert!(calls(&surface).is_empty());
}

#[test]
fn test_raw_anchor_codes() {
    assert_eq!(Anchor::from_raw(20), Ok(Anchor::TOP | Anchor::LEFT));
    assert_eq!(Anchor::from_raw(128), Err(DrawError::InvalidAnchor(128)));
}

#[rstest]
#[case(RegionTransform::None)]
#[case(RegionTransform::Mirror)]
#[case(RegionTransform::Rot90)]
#[case(RegionTransform::Rot180)]
#[case(RegionTransform::Rot270)]
#[case(RegionTransform::MirrorRot90)]
#[case(RegionTransform::MirrorRot180)]
#[case(RegionTransform::MirrorRot270)]
fn test_draw_region_lands_in_anchor_box(#[case] transform: RegionTransform) {
    let ctx = test_context();
    let image = numbered_image(&ctx);
    let mut surface = recording(&ctx);
    surface.translate(5, 7).unwrap();
    surface
        .draw_region(&image, 0, 0, 3, 2, transform, 20, 20, Anchor::BOTTOM | Anchor::RIGHT)
        .unwrap();

    let (w, h) = if transform.swaps_dimensions() { (2, 3) } else { (3, 2) };
    let recorded = calls(&surface);
    assert_eq!(recorded.len(), 1);
    assert_eq!(
        device_bounds(&recorded[0]),
        (25 - w, 27 - h, 25, 27),
        "{transform:?}"
    );

    let t = surface.target().unwrap().transform();
    assert_eq!(t, Transform::from_translate(5.0, 7.0));
}

#[test]
fn test_draw_region_restores_transform() {
    let ctx = test_context();
    let image = numbered_image(&ctx);
    let mut surface = recording(&ctx);
    surface.draw_image(&image, 3, 3, Anchor::TOP_LEFT).unwrap();
    surface
        .draw_region(&image, 1, 0, 2, 2, RegionTransform::Rot270, 40, 40, Anchor::TOP_LEFT)
        .unwrap();
    surface.draw_image(&image, 3, 3, Anchor::TOP_LEFT).unwrap();

    let recorded = calls(&surface);
    assert_eq!(recorded.len(), 3);
    assert_eq!(recorded[0], recorded[2]);
}

#[rstest]
#[case(5, 0, 10, 10)]
#[case(-1, 0, 2, 2)]
#[case(0, 0, 0, 5)]
#[case(0, 9, 10, 2)]
fn test_draw_region_out_of_bounds(
    #[case] x: i32,
    #[case] y: i32,
    #[case] width: i32,
    #[case] height: i32,
) {
    let ctx = test_context();
    let image = Image::blank(&ctx, 10, 10).unwrap();
    let mut surface = recording(&ctx);
    let err = surface.draw_region(
        &image,
        x,
        y,
        width,
        height,
        RegionTransform::None,
        0,
        0,
        Anchor::TOP_LEFT,
    );
    assert!(matches!(err, Err(DrawError::RegionOutOfBounds { .. })));
    assert!(calls(&surface).is_empty());
}

#[test]
fn test_invalid_transform_code() {
    assert_eq!(RegionTransform::try_from(5), Ok(RegionTransform::Rot90));
    assert_eq!(
        RegionTransform::try_from(8),
        Err(DrawError::InvalidTransform(8))
    );
}

#[rstest]
#[case(RegionTransform::None)]
#[case(RegionTransform::Mirror)]
#[case(RegionTransform::Rot90)]
#[case(RegionTransform::Rot180)]
#[case(RegionTransform::Rot270)]
#[case(RegionTransform::MirrorRot90)]
#[case(RegionTransform::MirrorRot180)]
#[case(RegionTransform::MirrorRot270)]
fn test_inverse_transform_restores_pixels(#[case] transform: RegionTransform) {
    let ctx = test_context();
    let source = numbered_image(&ctx);
    let (w, h) = if transform.swaps_dimensions() { (2, 3) } else { (3, 2) };

    let mut turned = Image::blank_with_background(&ctx, w, h, 0).unwrap();
    turned
        .graphics()
        .unwrap()
        .draw_region(&source, 0, 0, 3, 2, transform, 0, 0, Anchor::TOP_LEFT)
        .unwrap();

    let mut restored = Image::blank_with_background(&ctx, 3, 2, 0).unwrap();
    restored
        .graphics()
        .unwrap()
        .draw_region(&turned, 0, 0, w, h, transform.inverse(), 0, 0, Anchor::TOP_LEFT)
        .unwrap();

    assert_eq!(image_pixels(&restored), image_pixels(&source), "{transform:?}");
}

#[test]
fn test_copy_area_anchor_and_offsets() {
    let ctx = test_context();
    let mut surface = recording(&ctx);
    assert!(matches!(
        surface.copy_area(0, 0, 10, 10, 20, 20, Anchor::BOTTOM | Anchor::RIGHT),
        Err(DrawError::NotImplemented(_))
    ));
    assert!(calls(&surface).is_empty());

    surface.translate(10, 10).unwrap();
    surface
        .copy_area(0, 0, 10, 10, 30, 25, Anchor::TOP_LEFT)
        .unwrap();
    assert_eq!(
        calls(&surface),
        vec![Call::CopyArea {
            rect: ClipRect::new(0, 0, 10, 10),
            dx: 30,
            dy: 25,
        }]
    );
    assert!(matches!(
        surface.copy_area(85, 0, 10, 10, 0, 0, Anchor::TOP_LEFT),
        Err(DrawError::RegionOutOfBounds { .. })
    ));
}

#[test]
fn test_translate_and_clip_read_back() {
    let ctx = test_context();
    let mut surface = recording(&ctx);
    surface.translate(5, 5).unwrap();
    surface.translate(3, 0).unwrap();
    assert_eq!(surface.target().unwrap().transform(), Transform::from_translate(8.0, 5.0));

    surface.set_clip(0, 0, 20, 10).unwrap();
    surface.translate(-8, -5).unwrap();
    assert_eq!(surface.clip().unwrap(), ClipRect::new(8, 5, 20, 10));
}

#[test]
fn test_translate_wraps_on_overflow() {
    let ctx = test_context();
    let mut surface = recording(&ctx);
    surface.translate(i32::MAX, 0).unwrap();
    surface.translate(1, 0).unwrap();
    assert_eq!(surface.translate_x(), i32::MIN);

    surface.translate(-1, i32::MIN).unwrap();
    surface.translate(0, -1).unwrap();
    assert_eq!((surface.translate_x(), surface.translate_y()), (i32::MAX, i32::MAX));
}

#[test]
fn test_shapes_reach_target() {
    let ctx = test_context();
    let mut surface = recording(&ctx);
    surface.draw_line(0, 0, 5, 5).unwrap();
    surface.fill_rect(0, 0, 5, 5).unwrap();
    surface.fill_rect(0, 0, 0, 5).unwrap();
    surface.draw_arc(0, 0, 10, 10, 0, 90).unwrap();
    assert_eq!(calls(&surface), vec![Call::Stroke, Call::Fill, Call::Stroke]);
}

#[test]
fn test_draw_rgb_validation() {
    let ctx = test_context();
    let mut surface = recording(&ctx);
    let data = vec![0xFF00_0000; 16];
    surface.draw_rgb(&data, 0, 4, 1, 2, 4, 4, false).unwrap();
    surface.draw_rgb(&data, 0, 4, 1, 2, 0, 4, false).unwrap();
    assert!(matches!(
        surface.draw_rgb(&data, 0, 4, 0, 0, -2, 4, false),
        Err(DrawError::InvalidArgument(_))
    ));
    assert!(matches!(
        surface.draw_rgb(&data, 16, 4, 0, 0, 1, 1, false),
        Err(DrawError::InvalidArgument(_))
    ));
    assert!(matches!(
        surface.draw_rgb(&data, 0, 3, 0, 0, 4, 6, false),
        Err(DrawError::InvalidArgument(_))
    ));
    assert_eq!(calls(&surface).len(), 1);
}

#[test]
fn test_transparent_blank_image() {
    let ctx = test_context();
    let mut image = Image::blank_with_background(&ctx, 4, 4, 0x00FF_FFFF).unwrap();
    image.graphics().unwrap();
    assert!(image_pixels(&image).iter().all(|&p| p >> 24 == 0));
}

#[test]
fn test_surface_before_realization_is_illegal() {
    let ctx = test_context();
    let mut image = Image::blank(&ctx, 4, 4).unwrap();
    assert!(matches!(image.surface(), Err(DrawError::IllegalState(_))));

    let mut surface: DrawingSurface<RecordingTarget> = ctx.unbound_surface();
    assert!(matches!(
        surface.fill_rect(0, 0, 1, 1),
        Err(DrawError::IllegalState(_))
    ));
}

#[test]
fn test_quality_reaches_every_surface() {
    let ctx = test_context();
    let mut a = Image::blank(&ctx, 2, 2).unwrap();
    let mut b = Image::blank(&ctx, 2, 2).unwrap();
    a.graphics().unwrap();
    b.graphics().unwrap();
    let recorder = recording(&ctx);
    assert_eq!(ctx.quality().subscriber_count(), 3);

    assert!(ctx.feature_enable(Feature::TextAntiAlias, false));
    assert!(!a.surface().unwrap().has_feature_enabled(Feature::TextAntiAlias));
    assert!(!b.surface().unwrap().has_feature_enabled(Feature::TextAntiAlias));
    assert!(!recorder.target().unwrap().text_anti_alias);
    assert!(recorder.target().unwrap().anti_alias);

    b.dispose();
    assert_eq!(ctx.quality().subscriber_count(), 2);
    assert!(ctx.feature_enable(Feature::TextAntiAlias, true));
    assert!(recorder.target().unwrap().text_anti_alias);
    assert!(!ctx.feature_enable(Feature::OpenGl, true));
    assert_eq!(Feature::try_from(9), Err(DrawError::UnknownFeature(9)));
}

#[test]
fn test_png_round_trip() {
    let ctx = test_context();
    let mut image = Image::blank(&ctx, 8, 8).unwrap();
    let g = image.graphics().unwrap();
    g.set_color(0x00FF00);
    g.fill_rect(2, 2, 4, 4).unwrap();

    let png = image.to_png().unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    let decoded = Image::from_png(&ctx, &png).unwrap();
    assert_eq!(image_pixels(&decoded), image_pixels(&image));
    assert_eq!(image_pixels(&decoded)[3 * 8 + 3], 0xFF00_FF00);
}

#[rstest]
#[case(2, 2, 4, 4, false)]
#[case(2, 2, 4, 4, true)]
#[case(8, 8, 2, 2, false)]
#[case(8, 8, 2, 2, true)]
#[case(64, 40, 3, 5, true)]
#[case(1, 1, 3, 2, true)]
#[case(5, 5, 1, 1, true)]
fn test_scaled_keeps_uniform_color(
    #[case] width: i32,
    #[case] height: i32,
    #[case] scaled_width: i32,
    #[case] scaled_height: i32,
    #[case] higher_quality: bool,
) {
    let ctx = test_context();
    let image = Image::blank_with_background(&ctx, width, height, 0xFFFF_0000).unwrap();
    let scaled = image.scaled(scaled_width, scaled_height, higher_quality).unwrap();
    assert!(!scaled.is_mutable());
    assert_eq!((scaled.width(), scaled.height()), (scaled_width, scaled_height));
    assert!(image_pixels(&scaled).iter().all(|&p| p == 0xFFFF_0000));
}

#[test]
fn test_scaled_upscale_replicates_pixels() {
    let ctx = test_context();
    let data = [0xFFFF_0000, 0xFF00_FF00, 0xFF00_00FF, 0xFFFF_FFFF];
    let image = Image::from_rgb(&ctx, &data, 2, 2, false).unwrap();
    let pixels = image_pixels(&image.scaled(4, 4, false).unwrap());
    for (i, &p) in pixels.iter().enumerate() {
        let (x, y) = (i % 4, i / 4);
        assert_eq!(p, data[(y / 2) * 2 + x / 2], "pixel {x},{y}");
    }
}

#[rstest]
#[case(0, 4)]
#[case(4, -1)]
#[case(40000, 4)]
fn test_scaled_rejects_invalid_dimensions(#[case] width: i32, #[case] height: i32) {
    let ctx = test_context();
    let image = Image::blank(&ctx, 4, 4).unwrap();
    assert_eq!(
        image.scaled(width, height, true).unwrap_err(),
        DrawError::InvalidDimensions { width, height }
    );
}

#[test]
fn test_font_metrics() {
    let ctx = test_context();
    let font = ctx.fonts().default_font();
    assert_eq!(font.baseline_position(), 10);
    assert_eq!(font.height(), 12);
    assert_eq!(font.string_width("Hi"), 14);
    assert_eq!(font.substring_width("Hello", 1, 2), Ok(14));
    assert!(matches!(
        font.substring_width("Hello", 4, 2),
        Err(DrawError::InvalidArgument(_))
    ));
}

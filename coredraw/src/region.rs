//! The 8 discrete region transforms and their affine plans.

use crate::error::{DrawError, DrawResult};
use tiny_skia::Transform;

/// A rotation and/or mirror applied when copying an image region.
///
/// Discriminants are the MIDP `Sprite.TRANS_*` codes. Rotations are
/// clockwise on screen. Mirroring flips about the vertical axis and happens
/// before the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum RegionTransform {
    #[default]
    None = 0,
    /// Flip vertical, expressed as mirror then rotate 180.
    MirrorRot180 = 1,
    /// Flip horizontal.
    Mirror = 2,
    Rot180 = 3,
    MirrorRot270 = 4,
    Rot90 = 5,
    Rot270 = 6,
    MirrorRot90 = 7,
}

impl RegionTransform {
    pub const ALL: [RegionTransform; 8] = [
        RegionTransform::None,
        RegionTransform::MirrorRot180,
        RegionTransform::Mirror,
        RegionTransform::Rot180,
        RegionTransform::MirrorRot270,
        RegionTransform::Rot90,
        RegionTransform::Rot270,
        RegionTransform::MirrorRot90,
    ];

    /// Raw transform code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether the destination width and height are the source's swapped.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            RegionTransform::Rot90
                | RegionTransform::Rot270
                | RegionTransform::MirrorRot90
                | RegionTransform::MirrorRot270
        )
    }

    /// The transform that undoes this one.
    ///
    /// Pure rotations by a quarter turn invert to each other; every other
    /// transform is its own inverse.
    pub fn inverse(self) -> RegionTransform {
        match self {
            RegionTransform::Rot90 => RegionTransform::Rot270,
            RegionTransform::Rot270 => RegionTransform::Rot90,
            other => other,
        }
    }
}

impl TryFrom<i32> for RegionTransform {
    type Error = DrawError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RegionTransform::None),
            1 => Ok(RegionTransform::MirrorRot180),
            2 => Ok(RegionTransform::Mirror),
            3 => Ok(RegionTransform::Rot180),
            4 => Ok(RegionTransform::MirrorRot270),
            5 => Ok(RegionTransform::Rot90),
            6 => Ok(RegionTransform::Rot270),
            7 => Ok(RegionTransform::MirrorRot90),
            _ => Err(DrawError::InvalidTransform(code)),
        }
    }
}

/// A rotation by a whole number of quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuarterTurn {
    Quarter,
    Half,
    ThreeQuarter,
}

impl QuarterTurn {
    /// Exact rotation matrix, free of trigonometric rounding.
    pub fn to_transform(self) -> Transform {
        match self {
            QuarterTurn::Quarter => Transform::from_row(0.0, 1.0, -1.0, 0.0, 0.0, 0.0),
            QuarterTurn::Half => Transform::from_row(-1.0, 0.0, 0.0, -1.0, 0.0, 0.0),
            QuarterTurn::ThreeQuarter => Transform::from_row(0.0, -1.0, 1.0, 0.0, 0.0, 0.0),
        }
    }
}

/// One step of a transform plan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AffineOp {
    Translate(f32, f32),
    Rotate(QuarterTurn),
    /// `scale(-1, 1)`.
    FlipX,
}

impl AffineOp {
    pub fn to_transform(self) -> Transform {
        match self {
            AffineOp::Translate(tx, ty) => Transform::from_translate(tx, ty),
            AffineOp::Rotate(turn) => turn.to_transform(),
            AffineOp::FlipX => Transform::from_scale(-1.0, 1.0),
        }
    }
}

/// Ordered affine steps that map a region at the origin onto a destination
/// box of `dest_width x dest_height` at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformPlan {
    pub ops: Vec<AffineOp>,
    pub dest_width: i32,
    pub dest_height: i32,
}

impl TransformPlan {
    /// Fold the steps into one matrix.
    ///
    /// Each step is concatenated onto the right, the same way successive
    /// `translate`/`rotate` calls compose on a graphics context.
    pub fn to_transform(&self) -> Transform {
        self.ops
            .iter()
            .fold(Transform::identity(), |acc, op| acc.pre_concat(op.to_transform()))
    }

    /// Map a point in region space to destination space.
    pub fn map_point(&self, x: f32, y: f32) -> (f32, f32) {
        let t = self.to_transform();
        (t.sx * x + t.kx * y + t.tx, t.ky * x + t.sy * y + t.ty)
    }
}

/// Plan the affine steps for copying a `width x height` region.
pub fn plan_transform(transform: RegionTransform, width: i32, height: i32) -> TransformPlan {
    use AffineOp::{FlipX, Rotate, Translate};

    let (w, h) = (width as f32, height as f32);
    let ops = match transform {
        RegionTransform::None => vec![],
        RegionTransform::Mirror => vec![Translate(w, 0.0), FlipX],
        RegionTransform::Rot180 => vec![Translate(w, h), Rotate(QuarterTurn::Half)],
        RegionTransform::MirrorRot180 => vec![
            Translate(w, 0.0),
            FlipX,
            Translate(w, h),
            Rotate(QuarterTurn::Half),
        ],
        RegionTransform::Rot90 => vec![Translate(h, 0.0), Rotate(QuarterTurn::Quarter)],
        RegionTransform::MirrorRot90 => vec![
            Translate(h, 0.0),
            Rotate(QuarterTurn::Quarter),
            Translate(w, 0.0),
            FlipX,
        ],
        RegionTransform::Rot270 => vec![Translate(0.0, w), Rotate(QuarterTurn::ThreeQuarter)],
        RegionTransform::MirrorRot270 => vec![Rotate(QuarterTurn::ThreeQuarter), FlipX],
    };

    let (dest_width, dest_height) = if transform.swaps_dimensions() {
        (height, width)
    } else {
        (width, height)
    };

    TransformPlan {
        ops,
        dest_width,
        dest_height,
    }
}

/// Validate a source rectangle against the source bounds.
pub fn check_region_bounds(
    x: i32,
    y: i32,
    width: i32,
    height: i32,
    bounds_width: u32,
    bounds_height: u32,
) -> DrawResult<()> {
    let out_of_bounds = x < 0
        || y < 0
        || width <= 0
        || height <= 0
        || x as i64 + width as i64 > bounds_width as i64
        || y as i64 + height as i64 > bounds_height as i64;
    if out_of_bounds {
        Err(DrawError::RegionOutOfBounds {
            x,
            y,
            width,
            height,
            bounds_width,
            bounds_height,
        })
    } else {
        Ok(())
    }
}

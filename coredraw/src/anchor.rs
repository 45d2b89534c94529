//! Anchor bit-sets and anchor resolution.
//!
//! An anchor names which point of a content's bounding box a requested
//! `(x, y)` refers to. Resolution turns that into the top-left origin (for
//! boxes) or the baseline origin (for text) the host backend draws from.

use crate::error::{DrawError, DrawResult};

bitflags::bitflags! {
    /// Anchor bits, one optional bit per axis.
    ///
    /// The numeric values are the MIDP ones so raw codes from callers map
    /// one to one.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Anchor: u32 {
        /// Horizontal center.
        const HCENTER  = 1;
        /// Vertical center.
        const VCENTER  = 2;
        /// Left edge.
        const LEFT     = 4;
        /// Right edge.
        const RIGHT    = 8;
        /// Top edge.
        const TOP      = 16;
        /// Bottom edge.
        const BOTTOM   = 32;
        /// Text baseline (text only).
        const BASELINE = 64;
    }
}

impl Default for Anchor {
    fn default() -> Self {
        Self::TOP_LEFT
    }
}

/// Vertical component of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAnchor {
    Top,
    VCenter,
    Bottom,
    Baseline,
}

/// Horizontal component of an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAnchor {
    Left,
    HCenter,
    Right,
}

impl Anchor {
    /// The normalized form of a zero anchor.
    pub const TOP_LEFT: Anchor = Anchor::TOP.union(Anchor::LEFT);

    /// Bits that belong to the vertical axis.
    pub const VERTICAL_MASK: Anchor = Anchor::TOP
        .union(Anchor::VCENTER)
        .union(Anchor::BOTTOM)
        .union(Anchor::BASELINE);

    /// Bits that belong to the horizontal axis.
    pub const HORIZONTAL_MASK: Anchor = Anchor::LEFT.union(Anchor::HCENTER).union(Anchor::RIGHT);

    /// Build an anchor from a raw code, rejecting reserved bits.
    pub fn from_raw(bits: u32) -> DrawResult<Anchor> {
        Anchor::from_bits(bits).ok_or(DrawError::InvalidAnchor(bits))
    }

    /// Zero is the default anchor and means `TOP | LEFT`.
    pub fn normalized(self) -> Anchor {
        if self.is_empty() {
            Self::TOP_LEFT
        } else {
            self
        }
    }

    /// Vertical axis of this anchor, `None` when no vertical bit is set.
    pub fn vertical(self) -> DrawResult<Option<VerticalAnchor>> {
        self.check_reserved()?;
        let v = self.intersection(Self::VERTICAL_MASK);
        if v.is_empty() {
            Ok(None)
        } else if v == Anchor::TOP {
            Ok(Some(VerticalAnchor::Top))
        } else if v == Anchor::VCENTER {
            Ok(Some(VerticalAnchor::VCenter))
        } else if v == Anchor::BOTTOM {
            Ok(Some(VerticalAnchor::Bottom))
        } else if v == Anchor::BASELINE {
            Ok(Some(VerticalAnchor::Baseline))
        } else {
            Err(DrawError::InvalidAnchor(self.bits()))
        }
    }

    /// Horizontal axis of this anchor, `None` when no horizontal bit is set.
    pub fn horizontal(self) -> DrawResult<Option<HorizontalAnchor>> {
        self.check_reserved()?;
        let h = self.intersection(Self::HORIZONTAL_MASK);
        if h.is_empty() {
            Ok(None)
        } else if h == Anchor::LEFT {
            Ok(Some(HorizontalAnchor::Left))
        } else if h == Anchor::HCENTER {
            Ok(Some(HorizontalAnchor::HCenter))
        } else if h == Anchor::RIGHT {
            Ok(Some(HorizontalAnchor::Right))
        } else {
            Err(DrawError::InvalidAnchor(self.bits()))
        }
    }

    fn check_reserved(self) -> DrawResult<()> {
        if Anchor::all().contains(self) {
            Ok(())
        } else {
            Err(DrawError::InvalidAnchor(self.bits()))
        }
    }
}

/// What is being anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorContent {
    /// A box drawn from its top-left corner (images, regions).
    Box { width: i32, height: i32 },
    /// A text run drawn from its baseline.
    Text {
        width: i32,
        ascent: i32,
        descent: i32,
        line_height: i32,
    },
}

/// Map an anchor and content box to the origin handed to the host backend.
///
/// A zero anchor is treated as `TOP | LEFT`. An axis without a bit keeps the
/// requested coordinate. `BASELINE` is only meaningful for text.
pub fn resolve_origin(
    anchor: Anchor,
    content: AnchorContent,
    x: i32,
    y: i32,
) -> DrawResult<(i32, i32)> {
    let anchor = anchor.normalized();
    let vertical = anchor.vertical()?;
    let horizontal = anchor.horizontal()?;

    let (width, dy) = match content {
        AnchorContent::Box { width, height } => {
            let dy = match vertical {
                None | Some(VerticalAnchor::Top) => 0,
                Some(VerticalAnchor::VCenter) => -(height >> 1),
                Some(VerticalAnchor::Bottom) => -height,
                Some(VerticalAnchor::Baseline) => {
                    return Err(DrawError::InvalidAnchor(anchor.bits()));
                }
            };
            (width, dy)
        }
        AnchorContent::Text {
            width,
            ascent,
            descent,
            line_height,
        } => {
            let dy = match vertical {
                Some(VerticalAnchor::Top) => ascent,
                Some(VerticalAnchor::VCenter) => line_height / 2,
                Some(VerticalAnchor::Bottom) => -descent,
                None | Some(VerticalAnchor::Baseline) => 0,
            };
            (width, dy)
        }
    };

    let dx = match horizontal {
        None | Some(HorizontalAnchor::Left) => 0,
        Some(HorizontalAnchor::HCenter) => -(width / 2),
        Some(HorizontalAnchor::Right) => -width,
    };

    Ok((x + dx, y + dy))
}

/// Strict resolution used for region copies.
///
/// Both axes must carry exactly one bit, `BASELINE` is rejected, and a zero
/// anchor is an error rather than `TOP | LEFT`.
///
/// Offsets use the full destination extent: `BOTTOM` moves up by `height`
/// and `VCENTER` by `height >> 1`, never `height - 1`.
pub fn resolve_region_origin(
    anchor: Anchor,
    width: i32,
    height: i32,
    x: i32,
    y: i32,
) -> DrawResult<(i32, i32)> {
    let invalid = || DrawError::InvalidAnchor(anchor.bits());
    let vertical = anchor.vertical()?.ok_or_else(invalid)?;
    let horizontal = anchor.horizontal()?.ok_or_else(invalid)?;

    let dy = match vertical {
        VerticalAnchor::Top => 0,
        VerticalAnchor::VCenter => -(height >> 1),
        VerticalAnchor::Bottom => -height,
        VerticalAnchor::Baseline => return Err(invalid()),
    };
    let dx = match horizontal {
        HorizontalAnchor::Left => 0,
        HorizontalAnchor::HCenter => -(width >> 1),
        HorizontalAnchor::Right => -width,
    };

    Ok((x + dx, y + dy))
}

//! Error types for coredraw.

use thiserror::Error;

/// Result type alias using DrawError.
pub type DrawResult<T> = Result<T, DrawError>;

/// Errors raised by drawing operations.
///
/// All of these signal programmer error at the call site. Nothing is retried
/// and no partial state is committed when one is returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    /// Malformed or contradictory anchor bits.
    #[error("Invalid anchor: {0:#x}")]
    InvalidAnchor(u32),

    /// Transform code outside the 8 defined region transforms.
    #[error("Invalid region transform: {0}")]
    InvalidTransform(i32),

    /// Source rectangle exceeds the source bounds or has a non-positive size.
    #[error(
        "Region out of bounds: x={x}, y={y}, width={width}, height={height} \
         (source is {bounds_width}x{bounds_height})"
    )]
    RegionOutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        bounds_width: u32,
        bounds_height: u32,
    },

    /// Bad string or array offsets, or a required buffer that is missing.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation variant that the host backend does not provide.
    #[error("Not implemented: {0}")]
    NotImplemented(&'static str),

    /// Surface or image used in a state where the operation is not allowed.
    #[error("Illegal state: {0}")]
    IllegalState(&'static str),

    /// Invalid image dimensions (must be positive).
    #[error("Invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// Feature id that is not recognized.
    #[error("Unknown feature id: {0}")]
    UnknownFeature(u32),

    /// PNG encoding or decoding error.
    #[error("PNG error: {0}")]
    PngError(String),
}

impl From<png::EncodingError> for DrawError {
    fn from(err: png::EncodingError) -> Self {
        DrawError::PngError(err.to_string())
    }
}

impl From<png::DecodingError> for DrawError {
    fn from(err: png::DecodingError) -> Self {
        DrawError::PngError(err.to_string())
    }
}

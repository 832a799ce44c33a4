use thiserror::Error;

use crate::pixel_buffer::PixelFormat;

/// Errors raised synchronously by the picker's validating calls.
///
/// These are caller errors: none of them is retried internally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HueRingError {
    #[error("hue should be between 0 and 360, got {0}")]
    HueOutOfRange(f64),
    #[error("inner radius can't be a negative value, got {0}")]
    NegativeInnerRadius(f64),
    #[error("thumb arc angle only supports values in the 0..180 range, got {0}")]
    ThumbArcAngleOutOfRange(f64),
    #[error("{name} can't be a negative value, got {value}")]
    NegativeThickness { name: &'static str, value: f64 },
    #[error("{entry_point} only supports {expected} buffers, got {actual}")]
    UnsupportedPixelFormat {
        entry_point: &'static str,
        expected: PixelFormat,
        actual: PixelFormat,
    },
    #[error("invalid pixel buffer size {width}x{height}")]
    InvalidBufferSize { width: u32, height: u32 },
}

pub type Result<T, E = HueRingError> = std::result::Result<T, E>;

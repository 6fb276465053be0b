//! Error types for thermalign.

use thiserror::Error;

/// Result alias for engine operations.
pub type AlignResult<T> = std::result::Result<T, AlignError>;

/// Errors reported to callers of the engine.
///
/// Only invalid inputs surface as errors. Geometric-pipeline failures
/// (too few keypoints, too few matches, no usable homography) are recovered
/// internally by the fallback resampler and never reach the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignError {
    /// Zero width or height, or a pixel count that overflows `usize`.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Channel count outside the supported range (1 to 4 interleaved).
    #[error("unsupported channel count {channels}")]
    InvalidChannels { channels: usize },
    /// Pixel buffer length does not match the declared dimensions.
    #[error("pixel buffer length {got} does not match the {needed} required")]
    BufferSizeMismatch { needed: usize, got: usize },
    /// Borrowed pixel buffer shorter than the view requires.
    #[error("pixel buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Decoding or encoding through the `image` crate failed.
    #[cfg(feature = "image-io")]
    #[error("image i/o failed: {reason}")]
    ImageIo { reason: String },
}

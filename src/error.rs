// src/error.rs
//
// Unified error handling for optipix.
// Uses thiserror for simple, type-safe error handling.
//
// All errors are terminal from this layer's point of view: retry
// policy, if any, belongs to the host. Nothing is logged and
// swallowed, and no partial output is ever returned with an error.

use std::borrow::Cow;
use thiserror::Error;

/// optipix error types
///
/// All errors are type-safe and provide clear, actionable messages.
/// No numeric error codes - just clear error variants.
#[derive(Debug, Error)]
pub enum OptipixError {
    /// The input stream could not be read into memory.
    #[error("failed to read image stream: {source}")]
    ReadFailed {
        #[source]
        source: std::io::Error,
    },

    /// The input bytes are not a parseable image in any registered codec,
    /// or are truncated/corrupt. Wraps the underlying codec's diagnostic.
    #[error("failed to decode image: {message}")]
    DecodeFailed { message: Cow<'static, str> },

    /// The pixel grid could not be serialized into the target container.
    #[error("failed to encode {format}: {message}")]
    EncodeFailed {
        format: Cow<'static, str>,
        message: Cow<'static, str>,
    },

    /// The resolved format token matches none of the known encoders.
    /// Carries the offending token for diagnostics.
    #[error("unsupported format: {format}")]
    UnsupportedFormat { format: Cow<'static, str> },

    // Decompression-bomb guards
    #[error("image dimension {dimension} exceeds maximum {max}")]
    DimensionExceedsLimit { dimension: u32, max: u32 },

    #[error("image pixel count {pixels} exceeds maximum {max}")]
    PixelCountExceedsLimit { pixels: u64, max: u64 },

    /// The resampler rejected the image.
    #[error("resize failed ({source_width}x{source_height} -> {target_width}x{target_height}): {message}")]
    ResizeFailed {
        source_width: u32,
        source_height: u32,
        target_width: u32,
        target_height: u32,
        message: Cow<'static, str>,
    },
}

// Constructor Helpers
impl OptipixError {
    pub fn read_failed(source: std::io::Error) -> Self {
        Self::ReadFailed { source }
    }

    pub fn decode_failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::DecodeFailed {
            message: message.into(),
        }
    }

    pub fn encode_failed(
        format: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::EncodeFailed {
            format: format.into(),
            message: message.into(),
        }
    }

    pub fn unsupported_format(format: impl Into<Cow<'static, str>>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub fn dimension_exceeds_limit(dimension: u32, max: u32) -> Self {
        Self::DimensionExceedsLimit { dimension, max }
    }

    pub fn pixel_count_exceeds_limit(pixels: u64, max: u64) -> Self {
        Self::PixelCountExceedsLimit { pixels, max }
    }

    pub fn resize_failed(
        source_dims: (u32, u32),
        target_dims: (u32, u32),
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self::ResizeFailed {
            source_width: source_dims.0,
            source_height: source_dims.1,
            target_width: target_dims.0,
            target_height: target_dims.1,
            message: message.into(),
        }
    }
}

// Result type alias
pub type Result<T> = std::result::Result<T, OptipixError>;

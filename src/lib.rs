// lib.rs
//
// optipix: decode, shrink and re-encode upload images.
//
// Pipeline: decode (format detected from magic bytes) -> optional
// aspect-ratio-preserving shrink -> re-encode as JPEG, PNG, GIF or
// WebP. Hosts feed raw bytes in and get re-encoded bytes back; stream
// sourcing/sinking, retries and caching are the host's business.

pub mod config;
pub mod engine;
pub mod error;

pub use config::{
    valid_extension, Config, Conversion, Format, JpegOptions, PngOptions, ResizeLimits,
    WebpOptions,
};
pub use engine::{ImageProcessor, Processor};
pub use error::{OptipixError, Result};

use image::ImageReader;
use std::io::Cursor;

/// Image metadata returned by [`inspect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Detected container, when it is one we can re-encode
    pub format: Option<Format>,
}

/// Inspect image metadata WITHOUT decoding pixels.
/// This reads only the header bytes - extremely fast.
///
/// Use this to check dimensions before processing, or to reject
/// uploads that are too large without wasting CPU on decoding.
pub fn inspect(data: &[u8]) -> Result<ImageMetadata> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| OptipixError::decode_failed(format!("failed to read image header: {e}")))?;

    let format = reader.format().and_then(Format::from_image_format);
    let (width, height) = reader
        .into_dimensions()
        .map_err(|e| OptipixError::decode_failed(format!("failed to read dimensions: {e}")))?;

    Ok(ImageMetadata {
        width,
        height,
        format,
    })
}

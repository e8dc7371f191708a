// src/engine.rs
//
// The decode -> resize -> encode pipeline.
// This file is a facade over the decomposed modules in engine/

// =============================================================================
// SECURITY LIMITS
// =============================================================================

/// Maximum allowed image dimension (width or height).
/// Images larger than 32768x32768 are rejected to prevent decompression bombs.
pub const MAX_DIMENSION: u32 = 32768;

/// Maximum allowed total pixels (width * height).
/// 100 megapixels = 400MB uncompressed RGBA. Beyond this is likely malicious.
pub const MAX_PIXELS: u64 = 100_000_000;

mod api;
mod common;
mod decoder;
mod encoder;
mod resize;

pub use api::{ImageProcessor, Processor};
pub use decoder::{check_dimensions, decode_image, detect_format, ensure_dimensions_safe};
pub use encoder::{encode, encode_with_token};
pub use resize::{fit_within, shrink_to_bounds};

// src/engine/decoder.rs
//
// Decoder operations: format detection by magic bytes, JPEG via
// mozjpeg (libjpeg-turbo), PNG/GIF/WebP via the image crate.

use crate::config::Format;
use crate::engine::common::run_with_panic_policy;
use crate::engine::{MAX_DIMENSION, MAX_PIXELS};
use crate::error::{OptipixError, Result};
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use mozjpeg::Decompress;
use std::io::Cursor;

/// Detect input format using magic bytes. Returns None if unknown.
/// Caller-supplied hints are never consulted.
pub fn detect_format(bytes: &[u8]) -> Option<ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Unified decode entrypoint:
/// - Detect the container once (magic bytes)
/// - Reject oversized images from header dimensions before decoding
/// - Route JPEG to mozjpeg, PNG/GIF/WebP to the image crate
/// - Return the decoded image and the detected format token
pub fn decode_image(bytes: &[u8]) -> Result<(DynamicImage, Format)> {
    let detected = detect_format(bytes)
        .ok_or_else(|| OptipixError::decode_failed("unrecognized image container"))?;
    let format = Format::from_image_format(detected).ok_or_else(|| {
        OptipixError::decode_failed(format!("no registered codec for {detected:?} input"))
    })?;

    ensure_dimensions_safe(bytes)?;

    let img = match format {
        Format::Jpeg => decode_jpeg_mozjpeg(bytes)?,
        _ => decode_with_image_crate(bytes, detected)?,
    };

    // Header dimensions can lie on crafted files; re-check the real ones.
    check_dimensions(img.width(), img.height())?;

    Ok((img, format))
}

/// Decode JPEG using mozjpeg (backed by libjpeg-turbo).
/// Significantly faster than the image crate's pure Rust decoder.
pub fn decode_jpeg_mozjpeg(data: &[u8]) -> Result<DynamicImage> {
    run_with_panic_policy("decode:mozjpeg", || {
        if !data.windows(2).any(|pair| pair == [0xFF, 0xD9]) {
            return Err(OptipixError::decode_failed(
                "mozjpeg: missing JPEG EOI marker",
            ));
        }

        let decompress = Decompress::new_mem(data).map_err(|e| {
            OptipixError::decode_failed(format!("mozjpeg decompress init failed: {e:?}"))
        })?;

        let mut decompress = decompress.rgb().map_err(|e| {
            OptipixError::decode_failed(format!("mozjpeg rgb conversion failed: {e:?}"))
        })?;

        let width = decompress.width();
        let height = decompress.height();
        if width > MAX_DIMENSION as usize || height > MAX_DIMENSION as usize {
            return Err(OptipixError::dimension_exceeds_limit(
                width.max(height) as u32,
                MAX_DIMENSION,
            ));
        }
        let width = width as u32;
        let height = height as u32;
        check_dimensions(width, height)?;

        let pixels: Vec<[u8; 3]> = decompress.read_scanlines().map_err(|e| {
            OptipixError::decode_failed(format!("mozjpeg: failed to read scanlines: {e:?}"))
        })?;
        let flat_pixels: Vec<u8> = pixels.into_iter().flatten().collect();

        let rgb_image = RgbImage::from_raw(width, height, flat_pixels).ok_or_else(|| {
            OptipixError::decode_failed("mozjpeg: failed to create image from raw data")
        })?;

        Ok(DynamicImage::ImageRgb8(rgb_image))
    })
}

/// Decode non-JPEG formats using the image crate.
fn decode_with_image_crate(data: &[u8], format: ImageFormat) -> Result<DynamicImage> {
    run_with_panic_policy("decode:image", || {
        image::load_from_memory_with_format(data, format)
            .map_err(|e| OptipixError::decode_failed(format!("decode failed: {e}")))
    })
}

/// Check if image dimensions are within safe limits.
/// Returns an error if the image is too large (potential decompression bomb).
pub fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(OptipixError::dimension_exceeds_limit(
            width.max(height),
            MAX_DIMENSION,
        ));
    }
    let pixels = width as u64 * height as u64;
    if pixels > MAX_PIXELS {
        return Err(OptipixError::pixel_count_exceeds_limit(pixels, MAX_PIXELS));
    }
    Ok(())
}

/// Inspect encoded bytes and ensure the image dimensions are safe before
/// decoding. Unreadable headers are left for the decoder to diagnose.
pub fn ensure_dimensions_safe(bytes: &[u8]) -> Result<()> {
    let cursor = Cursor::new(bytes);
    if let Ok(reader) = ImageReader::new(cursor).with_guessed_format() {
        if let Ok((width, height)) = reader.into_dimensions() {
            return check_dimensions(width, height);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb};

    fn encode_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |_, _| Rgb([0, 0, 0]));
        let mut buffer = Vec::new();
        DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([9, 8, 7])))
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
            .unwrap();
        buf
    }

    #[test]
    fn test_detect_format_jpeg_and_png() {
        assert_eq!(detect_format(&encode_png(2, 2)), Some(ImageFormat::Png));
        assert_eq!(detect_format(&encode_jpeg(2, 2)), Some(ImageFormat::Jpeg));
        assert_eq!(detect_format(b"not an image"), None);
    }

    #[test]
    fn test_decode_image_reports_detected_format() {
        let (img, format) = decode_image(&encode_png(3, 2)).unwrap();
        assert_eq!(format, Format::Png);
        assert_eq!(img.dimensions(), (3, 2));
    }

    #[test]
    fn test_decode_image_routes_jpeg_to_mozjpeg() {
        let (img, format) = decode_image(&encode_jpeg(2, 2)).unwrap();
        assert_eq!(format, Format::Jpeg);
        assert_eq!(img.dimensions(), (2, 2));
    }

    #[test]
    fn test_decode_image_rejects_garbage() {
        let err = decode_image(b"\x00\x01\x02\x03 garbage").unwrap_err();
        assert!(matches!(err, OptipixError::DecodeFailed { .. }));
    }

    #[test]
    fn test_decode_image_rejects_truncated_jpeg() {
        let mut jpeg = encode_jpeg(4, 4);
        jpeg.truncate(jpeg.len() / 2);
        let err = decode_image(&jpeg).unwrap_err();
        assert!(matches!(err, OptipixError::DecodeFailed { .. }));
    }

    #[test]
    fn test_ensure_dimensions_safe_allows_small_image() {
        assert!(ensure_dimensions_safe(&encode_png(64, 64)).is_ok());
    }

    #[test]
    fn test_check_dimensions_limits() {
        assert!(check_dimensions(64, 64).is_ok());
        assert!(matches!(
            check_dimensions(MAX_DIMENSION + 1, 1),
            Err(OptipixError::DimensionExceedsLimit { .. })
        ));
        assert!(matches!(
            check_dimensions(20_000, 20_000),
            Err(OptipixError::PixelCountExceedsLimit { .. })
        ));
    }
}

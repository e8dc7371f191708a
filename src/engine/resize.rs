// src/engine/resize.rs
//
// Shrink-only, aspect-ratio-preserving resize. Dimension selection is
// pure integer arithmetic; resampling goes through fast_image_resize
// with a Lanczos3 convolution kernel.

use crate::error::{OptipixError, Result};
use fast_image_resize::{self as fir, MulDiv, PixelType, ResizeOptions};
use image::{DynamicImage, RgbImage, RgbaImage};

/// Compute the target dimensions for fitting `width` x `height` inside
/// `max_width` x `max_height`.
///
/// Returns None when the image already fits (resize never upscales) or
/// when either bound is zero, which means unconstrained. The binding
/// dimension is chosen by comparing integer cross-products instead of
/// ratios, so no floating-point rounding can flip the comparison. The
/// non-binding dimension truncates, floored at 1 pixel for degenerate
/// aspect ratios.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> Option<(u32, u32)> {
    if max_width == 0 || max_height == 0 {
        return None;
    }
    if width <= max_width && height <= max_height {
        return None;
    }

    if width as u64 * max_height as u64 > height as u64 * max_width as u64 {
        // Width is the binding constraint
        let new_height = (height as u64 * max_width as u64 / width as u64) as u32;
        Some((max_width, new_height.max(1)))
    } else {
        let new_width = (width as u64 * max_height as u64 / height as u64) as u32;
        Some((new_width.max(1), max_height))
    }
}

/// Resize `img` so both dimensions fit within the given bounds,
/// preserving aspect ratio. Returns the image unchanged when it already
/// fits or when a bound is zero (unconstrained).
pub fn shrink_to_bounds(img: DynamicImage, max_width: u32, max_height: u32) -> Result<DynamicImage> {
    match fit_within(img.width(), img.height(), max_width, max_height) {
        None => Ok(img),
        Some((new_width, new_height)) => resample(img, new_width, new_height),
    }
}

/// Lanczos3 resample via fast_image_resize. RGB8/RGBA8 buffers are
/// consumed zero-copy; other pixel layouts convert to RGBA8 first.
fn resample(img: DynamicImage, dst_width: u32, dst_height: u32) -> Result<DynamicImage> {
    let src_width = img.width();
    let src_height = img.height();

    let fail = |message: String| {
        OptipixError::resize_failed(
            (src_width, src_height),
            (dst_width, dst_height),
            message,
        )
    };

    if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
        return Err(fail("invalid dimensions for resize".to_string()));
    }

    let (pixel_type, src_pixels): (PixelType, Vec<u8>) = match img {
        DynamicImage::ImageRgb8(rgb) => (PixelType::U8x3, rgb.into_raw()),
        DynamicImage::ImageRgba8(rgba) => (PixelType::U8x4, rgba.into_raw()),
        other => (PixelType::U8x4, other.to_rgba8().into_raw()),
    };

    let mut src_image = fir::images::Image::from_vec_u8(src_width, src_height, src_pixels, pixel_type)
        .map_err(|e| fail(format!("fir source image error: {e:?}")))?;
    let mut dst_image = fir::images::Image::new(dst_width, dst_height, pixel_type);

    // Straight-alpha sources must be premultiplied around convolution
    let needs_premultiply = pixel_type == PixelType::U8x4;
    let mul_div = MulDiv::default();
    if needs_premultiply {
        mul_div
            .multiply_alpha_inplace(&mut src_image)
            .map_err(|e| fail(format!("failed to premultiply alpha: {e}")))?;
    }

    let options = ResizeOptions::new().resize_alg(fir::ResizeAlg::Convolution(
        fir::FilterType::Lanczos3,
    ));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| fail(format!("fir resize error: {e:?}")))?;

    if needs_premultiply {
        mul_div
            .divide_alpha_inplace(&mut dst_image)
            .map_err(|e| fail(format!("failed to unpremultiply alpha: {e}")))?;
    }

    let dst_pixels = dst_image.into_vec();
    match pixel_type {
        PixelType::U8x3 => RgbImage::from_raw(dst_width, dst_height, dst_pixels)
            .map(DynamicImage::ImageRgb8)
            .ok_or_else(|| fail("failed to create rgb image from resized data".to_string())),
        _ => RgbaImage::from_raw(dst_width, dst_height, dst_pixels)
            .map(DynamicImage::ImageRgba8)
            .ok_or_else(|| fail("failed to create rgba image from resized data".to_string())),
    }
}

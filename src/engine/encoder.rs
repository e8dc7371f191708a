// src/engine/encoder.rs
//
// Encoder operations: JPEG (mozjpeg), PNG (image + oxipng), WebP
// (libwebp), GIF (image crate), plus the format dispatch.

use crate::config::{Config, Format, PngOptions, WebpOptions};
use crate::engine::common::run_with_panic_policy;
use crate::error::{OptipixError, Result};
use image::codecs::png::{FilterType as PngFilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};
use mozjpeg::{ColorSpace, Compress};
use std::io::Cursor;

/// Encode the pixel grid into `format`, pulling per-format options from
/// the configuration. Dispatch is enum-keyed; string tokens resolve
/// through [`encode_with_token`].
pub fn encode(img: &DynamicImage, format: Format, config: &Config) -> Result<Vec<u8>> {
    match format {
        Format::Jpeg => encode_jpeg(img, config.jpeg.quality),
        Format::Png => encode_png(img, &config.png),
        Format::WebP => encode_webp(img, &config.webp),
        Format::Gif => encode_gif(img),
    }
}

/// Resolve a caller-supplied format token (case-insensitive) and encode.
/// Unknown tokens - the empty string included - fail with an
/// unsupported-format error naming the token.
pub fn encode_with_token(img: &DynamicImage, token: &str, config: &Config) -> Result<Vec<u8>> {
    let format = Format::from_token(token)
        .ok_or_else(|| OptipixError::unsupported_format(token.to_string()))?;
    encode(img, format, config)
}

/// Encode to JPEG using mozjpeg with progressive scan and optimized
/// coding. Quality is passed through uninterpreted beyond the u8 range.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    run_with_panic_policy("encode:jpeg", || {
        use std::borrow::Cow;

        // Zero-copy when already RGB8
        let rgb: Cow<'_, image::RgbImage> = match img {
            DynamicImage::ImageRgb8(rgb_img) => Cow::Borrowed(rgb_img),
            _ => Cow::Owned(img.to_rgb8()),
        };
        let (w, h) = rgb.dimensions();
        let pixels: &[u8] = rgb.as_raw();

        if w == 0 || h == 0 {
            return Err(OptipixError::encode_failed(
                "jpeg",
                "image has zero width or height",
            ));
        }

        let mut comp = Compress::new(ColorSpace::JCS_RGB);
        comp.set_size(w as usize, h as usize);
        comp.set_color_space(ColorSpace::JCS_YCbCr);
        comp.set_quality(quality as f32);
        comp.set_progressive_mode();
        comp.set_optimize_coding(true);

        let estimated_size = (w as usize * h as usize * 3 / 10).max(4096);
        let mut output = Vec::with_capacity(estimated_size);

        let mut writer = comp.start_compress(&mut output).map_err(|e| {
            OptipixError::encode_failed("jpeg", format!("mozjpeg: failed to start compress: {e:?}"))
        })?;

        let stride = w as usize * 3;
        for row in pixels.chunks(stride) {
            writer.write_scanlines(row).map_err(|e| {
                OptipixError::encode_failed(
                    "jpeg",
                    format!("mozjpeg: failed to write scanlines: {e:?}"),
                )
            })?;
        }

        writer.finish().map_err(|e| {
            OptipixError::encode_failed("jpeg", format!("mozjpeg: failed to finish: {e:?}"))
        })?;

        Ok(output)
    })
}

/// Encode to PNG honouring the configured compression level; when
/// `optimize` is set the result is re-compressed losslessly with oxipng.
/// The `lossless` flag is accepted but uninterpreted - PNG cannot be lossy.
pub fn encode_png(img: &DynamicImage, options: &PngOptions) -> Result<Vec<u8>> {
    run_with_panic_policy("encode:png", || {
        let mut buf = Vec::new();
        let encoder = PngEncoder::new_with_quality(
            Cursor::new(&mut buf),
            options.compression,
            PngFilterType::Adaptive,
        );
        img.write_with_encoder(encoder)
            .map_err(|e| OptipixError::encode_failed("png", format!("PNG encode failed: {e}")))?;

        if !options.optimize {
            return Ok(buf);
        }

        let mut oxi_options = oxipng::Options::from_preset(4);
        oxi_options.strip = oxipng::StripChunks::None;

        oxipng::optimize_from_memory(&buf, &oxi_options).map_err(|e| {
            OptipixError::encode_failed("png", format!("oxipng optimization failed: {e}"))
        })
    })
}

/// Encode to WebP with the configured lossless flag and quality.
pub fn encode_webp(img: &DynamicImage, options: &WebpOptions) -> Result<Vec<u8>> {
    run_with_panic_policy("encode:webp", || {
        use std::borrow::Cow;

        let has_alpha = img.color().has_alpha();
        let rgba: Cow<'_, image::RgbaImage>;
        let rgb: Cow<'_, image::RgbImage>;
        let encoder = if has_alpha {
            rgba = match img {
                DynamicImage::ImageRgba8(rgba_img) => Cow::Borrowed(rgba_img),
                _ => Cow::Owned(img.to_rgba8()),
            };
            let (w, h) = rgba.dimensions();
            webp::Encoder::from_rgba(&rgba, w, h)
        } else {
            rgb = match img {
                DynamicImage::ImageRgb8(rgb_img) => Cow::Borrowed(rgb_img),
                _ => Cow::Owned(img.to_rgb8()),
            };
            let (w, h) = rgb.dimensions();
            webp::Encoder::from_rgb(&rgb, w, h)
        };

        let mut config = webp::WebPConfig::new()
            .map_err(|_| OptipixError::encode_failed("webp", "failed to create WebPConfig"))?;
        config.lossless = if options.lossless { 1 } else { 0 };
        config.quality = options.quality;
        // Method 4 is libwebp's speed/quality sweet spot
        config.method = 4;

        let mem = encoder.encode_advanced(&config).map_err(|e| {
            OptipixError::encode_failed("webp", format!("WebP encode failed: {e:?}"))
        })?;

        Ok(mem.to_vec())
    })
}

/// Encode to GIF using the image crate with default options.
pub fn encode_gif(img: &DynamicImage) -> Result<Vec<u8>> {
    run_with_panic_policy("encode:gif", || {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Gif)
            .map_err(|e| OptipixError::encode_failed("gif", format!("GIF encode failed: {e}")))?;
        Ok(buf)
    })
}

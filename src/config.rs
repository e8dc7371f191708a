// src/config.rs
//
// Configuration model: an immutable-after-construction settings bundle
// describing the conversion target, per-format encode parameters and
// resize limits. Constructed once, read-only thereafter, owned by the
// Processor that embeds it.

use image::codecs::png::CompressionType;
use image::ImageFormat;

/// Output container formats known to the encoder dispatch.
///
/// Dispatch is enum-keyed; string tokens only enter through
/// [`Format::from_token`], which is case-insensitive and accepts both
/// `jpeg` and `jpg` for JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl Format {
    /// Resolve a format token, case-insensitively. Returns None for
    /// anything outside {jpeg, jpg, gif, png, webp}.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            _ => None,
        }
    }

    /// Canonical lowercase token for this format.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::WebP => "webp",
        }
    }

    /// Map a container detected by the image crate to our format set.
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// Whether optimize() forces the output into a fixed target format.
#[derive(Debug, Clone, Copy)]
pub struct Conversion {
    pub enabled: bool,
    pub format: Format,
}

#[derive(Debug, Clone, Copy)]
pub struct JpegOptions {
    /// 0-100, passed through to the encoder uninterpreted.
    pub quality: u8,
}

#[derive(Debug, Clone, Copy)]
pub struct PngOptions {
    pub compression: CompressionType,
    /// PNG is inherently lossless; the flag is accepted for parity with
    /// the other per-format options but never interpreted.
    pub lossless: bool,
    /// Re-compress the encoded PNG with oxipng (lossless).
    pub optimize: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct WebpOptions {
    /// 0-100 for lossy; effort level for lossless.
    pub quality: f32,
    pub lossless: bool,
}

/// Upper bounds for the shrink-only resize step. A zero bound means
/// unconstrained, so the default 0x0 limits leave images untouched.
#[derive(Debug, Clone, Copy)]
pub struct ResizeLimits {
    /// Gates resizing in optimize() only; resize() always applies it.
    pub enabled: bool,
    pub max_width: u32,
    pub max_height: u32,
}

/// Settings bundle for a [`Processor`](crate::Processor).
///
/// No runtime validation is performed: an out-of-range quality value is
/// handed to the underlying encoder, whose own behavior governs the
/// outcome.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub conversion: Conversion,
    pub jpeg: JpegOptions,
    pub png: PngOptions,
    pub webp: WebpOptions,
    pub resize: ResizeLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            conversion: Conversion {
                enabled: true,
                format: Format::WebP,
            },
            jpeg: JpegOptions { quality: 100 },
            png: PngOptions {
                compression: CompressionType::Best,
                lossless: true,
                optimize: true,
            },
            webp: WebpOptions {
                quality: 100.0,
                lossless: true,
            },
            resize: ResizeLimits {
                enabled: false,
                max_width: 0,
                max_height: 0,
            },
        }
    }
}

/// Case-sensitive predicate over the five recognized format tokens.
///
/// Used by callers to gate input (e.g. file extensions) before invoking
/// the service; the service itself never enforces it.
pub fn valid_extension(ext: &str) -> bool {
    matches!(ext, "jpeg" | "jpg" | "gif" | "png" | "webp")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_lossless_webp() {
        let cfg = Config::default();
        assert!(cfg.conversion.enabled);
        assert_eq!(cfg.conversion.format, Format::WebP);
        assert!(cfg.webp.lossless);
        assert_eq!(cfg.webp.quality, 100.0);
        assert_eq!(cfg.jpeg.quality, 100);
        assert!(cfg.png.lossless);
        assert!(cfg.png.optimize);
        assert!(!cfg.resize.enabled);
    }

    #[test]
    fn test_format_from_token_is_case_insensitive() {
        assert_eq!(Format::from_token("jpeg"), Some(Format::Jpeg));
        assert_eq!(Format::from_token("JPG"), Some(Format::Jpeg));
        assert_eq!(Format::from_token("Png"), Some(Format::Png));
        assert_eq!(Format::from_token("WEBP"), Some(Format::WebP));
        assert_eq!(Format::from_token("gif"), Some(Format::Gif));
        assert_eq!(Format::from_token("bogus"), None);
        assert_eq!(Format::from_token(""), None);
    }

    #[test]
    fn test_format_token_round_trip() {
        for format in [Format::Jpeg, Format::Png, Format::Gif, Format::WebP] {
            assert_eq!(Format::from_token(format.token()), Some(format));
        }
    }

    #[test]
    fn test_valid_extension_exact_literal_set() {
        for ext in ["jpeg", "jpg", "gif", "png", "webp"] {
            assert!(valid_extension(ext));
        }
        // Case-sensitive by contract, unlike format dispatch
        assert!(!valid_extension("JPEG"));
        assert!(!valid_extension("Png"));
        assert!(!valid_extension(""));
        assert!(!valid_extension("tiff"));
        assert!(!valid_extension("jpeg "));
    }
}

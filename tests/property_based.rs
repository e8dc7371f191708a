// tests/property_based.rs
//
// Property-based tests for the bound-fitting arithmetic and the
// convert pipeline, over randomized dimensions and format tokens.

use image::{DynamicImage, ImageFormat, RgbImage};
use optipix::engine::{fit_within, shrink_to_bounds};
use optipix::{Config, ImageProcessor, Processor, WebpOptions};
use proptest::prelude::*;
use std::io::Cursor;

fn create_test_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    }))
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_fit_within_never_upscales(
        w in 1u32..=4096,
        h in 1u32..=4096,
        max_w in 0u32..=4096,
        max_h in 0u32..=4096,
    ) {
        match fit_within(w, h, max_w, max_h) {
            None => {
                // Either a zero bound disabled the constraint or the
                // image already fits.
                prop_assert!(max_w == 0 || max_h == 0 || (w <= max_w && h <= max_h));
            }
            Some((new_w, new_h)) => {
                prop_assert!(new_w <= w);
                prop_assert!(new_h <= h);
            }
        }
    }

    #[test]
    fn prop_fit_within_respects_bounds_and_clamps_binding_dimension(
        w in 1u32..=4096,
        h in 1u32..=4096,
        max_w in 1u32..=4096,
        max_h in 1u32..=4096,
    ) {
        if let Some((new_w, new_h)) = fit_within(w, h, max_w, max_h) {
            prop_assert!(new_w <= max_w);
            prop_assert!(new_h <= max_h);
            // One dimension is clamped exactly to its bound; the other is
            // the truncated proportional value.
            if w as u64 * max_h as u64 > h as u64 * max_w as u64 {
                prop_assert_eq!(new_w, max_w);
                prop_assert_eq!(new_h, ((h as u64 * max_w as u64 / w as u64) as u32).max(1));
            } else {
                prop_assert_eq!(new_h, max_h);
                prop_assert_eq!(new_w, ((w as u64 * max_h as u64 / h as u64) as u32).max(1));
            }
        }
    }

    #[test]
    fn prop_fit_within_is_idempotent(
        w in 1u32..=4096,
        h in 1u32..=4096,
        max_w in 2u32..=4096,
        max_h in 2u32..=4096,
    ) {
        if let Some((new_w, new_h)) = fit_within(w, h, max_w, max_h) {
            // A second pass over the shrunk dimensions is a no-op
            prop_assert_eq!(fit_within(new_w, new_h, max_w, max_h), None);
        }
    }

    #[test]
    fn prop_shrink_to_bounds_matches_fit_within(
        w in 1u32..=64,
        h in 1u32..=64,
        max_w in 1u32..=64,
        max_h in 1u32..=64,
    ) {
        let img = create_test_image(w, h);
        let expected = fit_within(w, h, max_w, max_h).unwrap_or((w, h));
        let resized = shrink_to_bounds(img, max_w, max_h).unwrap();
        prop_assert_eq!((resized.width(), resized.height()), expected);
    }

    #[test]
    fn prop_within_bounds_resize_preserves_pixels(
        w in 1u32..=64,
        h in 1u32..=64,
    ) {
        let img = create_test_image(w, h);
        let original = img.to_rgb8().into_raw();
        let result = shrink_to_bounds(img, 64, 64).unwrap();
        prop_assert_eq!((result.width(), result.height()), (w, h));
        prop_assert_eq!(result.to_rgb8().into_raw(), original);
    }

    #[test]
    fn prop_convert_preserves_dimensions(
        w in 1u32..=48,
        h in 1u32..=48,
        token_idx in 0usize..4,
    ) {
        let token = ["jpeg", "png", "gif", "webp"][token_idx];

        let mut buf = Vec::new();
        create_test_image(w, h)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();

        let mut config = Config::default();
        config.webp = WebpOptions { quality: 75.0, lossless: false };
        config.png.optimize = false;
        let processor = Processor::with_config(config);

        let out = processor.convert(&mut Cursor::new(buf), token).unwrap();
        let decoded = image::load_from_memory(&out).unwrap();
        // Lossy codecs may alter pixel values but never dimensions
        prop_assert_eq!((decoded.width(), decoded.height()), (w, h));
    }
}

// src/engine/api.rs
//
// The conversion service: decode -> optional shrink -> format dispatch.
// This is the main public API of the crate.

use crate::config::Config;
use crate::engine::decoder::decode_image;
use crate::engine::encoder::{encode, encode_with_token};
use crate::engine::resize::shrink_to_bounds;
use crate::error::{OptipixError, Result};
use std::io::Read;
use tracing::debug;

/// Image conversion service.
///
/// One concrete implementation exists ([`Processor`]); the trait is the
/// seam hosts mock in their own tests.
pub trait ImageProcessor: Send + Sync {
    /// The settings this service was constructed with.
    fn config(&self) -> &Config;

    /// Decode the stream (format detected from magic bytes), shrink it
    /// if resizing is enabled in the configuration, re-encode into the
    /// configured target format when conversion is enabled, otherwise
    /// into the detected format.
    fn optimize(&self, reader: &mut dyn Read) -> Result<Vec<u8>>;

    /// Decode the stream and unconditionally apply the shrink step -
    /// the configuration's resize toggle is ignored here by contract.
    /// Re-encodes in the detected format.
    fn resize(&self, reader: &mut dyn Read) -> Result<Vec<u8>>;

    /// Decode the stream and re-encode into `to_format`
    /// (case-insensitive token), skipping resize entirely and ignoring
    /// the configured conversion target.
    fn convert(&self, reader: &mut dyn Read, to_format: &str) -> Result<Vec<u8>>;
}

/// The concrete [`ImageProcessor`]. Holds its configuration by value;
/// nothing is mutated after construction, so a single instance is safe
/// to share across threads.
pub struct Processor {
    config: Config,
}

impl Processor {
    /// Service with the default configuration (lossless WebP target).
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// The input contract is a complete, fully-buffered image; slurp the
    /// stream before handing it to the codecs.
    fn read_source(reader: &mut dyn Read) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(OptipixError::read_failed)?;
        Ok(bytes)
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageProcessor for Processor {
    fn config(&self) -> &Config {
        &self.config
    }

    fn optimize(&self, reader: &mut dyn Read) -> Result<Vec<u8>> {
        let bytes = Self::read_source(reader)?;
        let (mut img, detected) = decode_image(&bytes)?;

        if self.config.resize.enabled {
            img = shrink_to_bounds(
                img,
                self.config.resize.max_width,
                self.config.resize.max_height,
            )?;
        }

        let format = if self.config.conversion.enabled {
            self.config.conversion.format
        } else {
            detected
        };
        debug!(
            detected = detected.token(),
            output = format.token(),
            width = img.width(),
            height = img.height(),
            "optimize"
        );

        encode(&img, format, &self.config)
    }

    fn resize(&self, reader: &mut dyn Read) -> Result<Vec<u8>> {
        let bytes = Self::read_source(reader)?;
        let (img, detected) = decode_image(&bytes)?;

        // Applied regardless of the resize toggle by contract
        let img = shrink_to_bounds(
            img,
            self.config.resize.max_width,
            self.config.resize.max_height,
        )?;
        debug!(
            detected = detected.token(),
            width = img.width(),
            height = img.height(),
            "resize"
        );

        encode(&img, detected, &self.config)
    }

    fn convert(&self, reader: &mut dyn Read, to_format: &str) -> Result<Vec<u8>> {
        let bytes = Self::read_source(reader)?;
        let (img, detected) = decode_image(&bytes)?;
        debug!(detected = detected.token(), output = to_format, "convert");

        encode_with_token(&img, to_format, &self.config)
    }
}

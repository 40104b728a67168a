//! # Normalizer Module
//!
//! Turns encoded image bytes into a fixed-envelope RGBA pixel buffer that
//! can be compared byte-for-byte and pixel-by-pixel.
//!
//! ## How It Works
//! 1. Decode (zune-jpeg for JPEG, image crate for everything else)
//! 2. Force an alpha channel (RGBA, 4 channels)
//! 3. Shrink to fit inside the envelope, preserving aspect ratio; never upscale
//! 4. Hash the resulting pixels with BLAKE3
//!
//! Two images that decode successfully under the same envelope always have
//! the same channel count, and the same dimensions whenever their aspect
//! ratios agree.

mod decode;
mod resize;

pub use decode::FastDecoder;
pub use resize::resize_rgba;

use crate::error::NormalizeError;
use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Channel count of every normalized buffer (RGBA)
pub const NORMALIZED_CHANNELS: u8 = 4;

/// Bounding box images are shrunk into before comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub max_width: u32,
    pub max_height: u32,
}

impl Envelope {
    /// Create an envelope with the given maximum dimensions
    pub fn new(max_width: u32, max_height: u32) -> Self {
        Self {
            max_width,
            max_height,
        }
    }

    /// Dimensions an image of `width`x`height` is resized to.
    ///
    /// Images already inside the envelope keep their size.
    pub fn fit(&self, width: u32, height: u32) -> (u32, u32) {
        if width <= self.max_width && height <= self.max_height {
            return (width, height);
        }

        let ratio = f64::min(
            self.max_width as f64 / width as f64,
            self.max_height as f64 / height as f64,
        );
        let fitted_width = ((width as f64 * ratio).round() as u32).clamp(1, self.max_width);
        let fitted_height = ((height as f64 * ratio).round() as u32).clamp(1, self.max_height);

        (fitted_width, fitted_height)
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new(800, 533)
    }
}

/// A decoded, resized pixel buffer plus the content hash of its pixels
#[derive(Clone)]
pub struct NormalizedImage {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Vec<u8>,
    digest: [u8; 32],
}

impl NormalizedImage {
    /// Wrap a raw pixel buffer, hashing it once up front
    pub fn new(width: u32, height: u32, channels: u8, pixels: Vec<u8>) -> Self {
        let digest = *blake3::hash(&pixels).as_bytes();
        Self {
            width,
            height,
            channels,
            pixels,
            digest,
        }
    }

    /// Wrap an RGBA image buffer
    pub fn from_rgba(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width, height, NORMALIZED_CHANNELS, image.into_raw())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// BLAKE3 digest of the pixel bytes
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Whether width, height and channel count all agree
    pub fn same_shape(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.channels == other.channels
    }

    /// `WxHxC`, for logs and error messages
    pub fn shape(&self) -> String {
        format!("{}x{}x{}", self.width, self.height, self.channels)
    }
}

impl std::fmt::Debug for NormalizedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NormalizedImage")
            .field("shape", &self.shape())
            .field("digest", &blake3::Hash::from(self.digest).to_hex().to_string())
            .finish()
    }
}

/// Decodes encoded image bytes into a [`NormalizedImage`]
pub trait ImageNormalizer: Send + Sync {
    fn normalize(&self, bytes: &[u8]) -> Result<NormalizedImage, NormalizeError>;
}

/// Default normalizer: decode, force RGBA, shrink into the envelope
#[derive(Debug, Clone, Default)]
pub struct StandardNormalizer {
    envelope: Envelope,
}

impl StandardNormalizer {
    pub fn new(envelope: Envelope) -> Self {
        Self { envelope }
    }

    pub fn envelope(&self) -> Envelope {
        self.envelope
    }
}

impl ImageNormalizer for StandardNormalizer {
    fn normalize(&self, bytes: &[u8]) -> Result<NormalizedImage, NormalizeError> {
        let decoded = FastDecoder::decode(bytes)?;
        let rgba = decoded.to_rgba8();

        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(NormalizeError::EmptyImage);
        }

        let (target_width, target_height) = self.envelope.fit(width, height);
        let fitted = if (target_width, target_height) == (width, height) {
            rgba
        } else {
            resize_rgba(rgba, target_width, target_height)?
        };

        Ok(NormalizedImage::from_rgba(fitted))
    }
}

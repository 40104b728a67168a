//! Fixtures shared by unit tests.

use crate::core::normalizer::NormalizedImage;
use crate::core::oracle::SimilarityOracle;
use crate::error::OracleError;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

pub fn encode_png(image: RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn solid_png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
    encode_png(RgbaImage::from_pixel(width, height, color))
}

pub fn checkerboard_png(width: u32, height: u32, cell: u32) -> Vec<u8> {
    encode_png(RgbaImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    }))
}

pub fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Oracle that always reports the same count and records how often it ran
pub struct CountingOracle {
    result: u64,
    calls: AtomicUsize,
}

impl CountingOracle {
    pub fn new(result: u64) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SimilarityOracle for CountingOracle {
    fn count_differing_pixels(
        &self,
        _a: &NormalizedImage,
        _b: &NormalizedImage,
        _tolerance: f64,
    ) -> Result<u64, OracleError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.result)
    }
}

/// Oracle that always errors
pub struct FailingOracle;

impl SimilarityOracle for FailingOracle {
    fn count_differing_pixels(
        &self,
        _a: &NormalizedImage,
        _b: &NormalizedImage,
        _tolerance: f64,
    ) -> Result<u64, OracleError> {
        Err(OracleError::Failed("oracle offline".to_string()))
    }
}

//! Comparator configuration.

use crate::core::normalizer::Envelope;
use crate::error::CompareError;
use serde::{Deserialize, Serialize};

/// Tunables for the pairwise comparator
///
/// Defaults:
/// - envelope: 800x533
/// - pixel tolerance: 0.1 (10% of channel intensity)
/// - max differing pixels: 200 (absolute, independent of resolution)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparatorConfig {
    /// Bounding box images are shrunk into
    pub envelope: Envelope,
    /// Per-channel difference, as a fraction of 255, that still counts as equal
    pub pixel_tolerance: f64,
    /// Pairs with fewer differing pixels than this are duplicates
    pub max_differing_pixels: u64,
}

impl ComparatorConfig {
    pub fn new() -> Self {
        Self {
            envelope: Envelope::default(),
            pixel_tolerance: 0.1,
            max_differing_pixels: 200,
        }
    }

    /// Set the resize envelope
    pub fn envelope(mut self, max_width: u32, max_height: u32) -> Self {
        self.envelope = Envelope::new(max_width, max_height);
        self
    }

    /// Set the per-pixel tolerance
    pub fn pixel_tolerance(mut self, tolerance: f64) -> Self {
        self.pixel_tolerance = tolerance;
        self
    }

    /// Set the differing-pixel threshold
    pub fn max_differing_pixels(mut self, count: u64) -> Self {
        self.max_differing_pixels = count;
        self
    }

    /// Check that every value is usable
    pub fn validate(&self) -> Result<(), CompareError> {
        if !(0.0..=1.0).contains(&self.pixel_tolerance) {
            return Err(CompareError::InvalidTolerance {
                value: self.pixel_tolerance,
            });
        }
        if self.envelope.max_width == 0 || self.envelope.max_height == 0 {
            return Err(CompareError::InvalidEnvelope {
                width: self.envelope.max_width,
                height: self.envelope.max_height,
            });
        }
        Ok(())
    }
}

impl Default for ComparatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

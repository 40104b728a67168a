//! # Oracle Module
//!
//! Pixel-level difference measurement between two equal-shaped buffers.
//!
//! The comparator only relies on the contract of [`SimilarityOracle`]:
//! given two buffers of identical shape and a per-channel tolerance in
//! `[0, 1]`, return how many pixels differ by more than the tolerance.

use crate::core::normalizer::NormalizedImage;
use crate::error::OracleError;
use rayon::prelude::*;

/// Counts differing pixels between two normalized images
pub trait SimilarityOracle: Send + Sync {
    /// Number of pixels whose difference exceeds `tolerance`.
    ///
    /// `tolerance` is a fraction of the full channel intensity range.
    fn count_differing_pixels(
        &self,
        a: &NormalizedImage,
        b: &NormalizedImage,
        tolerance: f64,
    ) -> Result<u64, OracleError>;
}

/// Default oracle: a pixel differs when any channel moves by more than
/// `tolerance * 255`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelDiffOracle;

impl ChannelDiffOracle {
    pub fn new() -> Self {
        Self
    }
}

impl SimilarityOracle for ChannelDiffOracle {
    fn count_differing_pixels(
        &self,
        a: &NormalizedImage,
        b: &NormalizedImage,
        tolerance: f64,
    ) -> Result<u64, OracleError> {
        if !a.same_shape(b) {
            return Err(OracleError::ShapeMismatch {
                left: a.shape(),
                right: b.shape(),
            });
        }
        if !(0.0..=1.0).contains(&tolerance) {
            return Err(OracleError::Failed(format!(
                "tolerance {} outside [0, 1]",
                tolerance
            )));
        }

        let channels = a.channels() as usize;
        if channels == 0 {
            return Err(OracleError::Failed("buffers have no channels".to_string()));
        }

        let max_delta = (tolerance * 255.0).floor() as u8;

        let differing = a
            .pixels()
            .par_chunks_exact(channels)
            .zip(b.pixels().par_chunks_exact(channels))
            .filter(|(pa, pb)| {
                pa.iter()
                    .zip(pb.iter())
                    .any(|(ca, cb)| ca.abs_diff(*cb) > max_delta)
            })
            .count();

        Ok(differing as u64)
    }
}

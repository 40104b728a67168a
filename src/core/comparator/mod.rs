//! # Comparator Module
//!
//! Decides whether two images are duplicates.
//!
//! ## How It Works
//! 1. Normalize both images into the same envelope (RGBA, bounded size)
//! 2. Different width, height or channel count: not duplicates
//! 3. Equal BLAKE3 digests of the pixel buffers: duplicates (fast path)
//! 4. Otherwise ask the similarity oracle how many pixels differ beyond the
//!    per-pixel tolerance; fewer than the threshold means duplicates
//!
//! Every failure resolves to "not duplicate". A missed duplicate only keeps
//! an extra file around; a false match can delete a unique image.
//!
//! ## Verdicts
//! | Outcome                | Duplicate |
//! |------------------------|-----------|
//! | `ExactMatch`           | yes       |
//! | `WithinTolerance`      | yes       |
//! | `Different`            | no        |
//! | `ShapeMismatch`        | no        |
//! | `Inconclusive`         | no        |

mod config;

pub use config::ComparatorConfig;

use crate::core::normalizer::{ImageNormalizer, NormalizedImage, StandardNormalizer};
use crate::core::oracle::{ChannelDiffOracle, SimilarityOracle};
use crate::error::{CompareError, NormalizeError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// How a duplicate pair matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MatchKind {
    /// Pixel buffers are identical after normalization
    Exact,
    /// Pixel buffers differ in fewer pixels than the threshold
    Similar,
}

impl MatchKind {
    /// The looser of two match kinds
    pub fn weakest(self, other: Self) -> Self {
        self.max(other)
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchKind::Exact => write!(f, "Exact Match"),
            MatchKind::Similar => write!(f, "Visually Identical"),
        }
    }
}

/// Outcome of comparing two images
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Normalized pixel buffers hash identically
    ExactMatch,
    /// The oracle found fewer differing pixels than the threshold
    WithinTolerance { differing_pixels: u64 },
    /// The oracle found too many differing pixels
    Different { differing_pixels: u64 },
    /// Normalized buffers do not have the same shape
    ShapeMismatch,
    /// Decoding or the oracle failed; treated as not duplicate
    Inconclusive,
}

impl Verdict {
    pub fn is_duplicate(&self) -> bool {
        self.match_kind().is_some()
    }

    /// Match kind for duplicate verdicts, `None` otherwise
    pub fn match_kind(&self) -> Option<MatchKind> {
        match self {
            Verdict::ExactMatch => Some(MatchKind::Exact),
            Verdict::WithinTolerance { .. } => Some(MatchKind::Similar),
            _ => None,
        }
    }
}

/// Pairwise duplicate decision built on a normalizer and a similarity oracle
#[derive(Clone)]
pub struct PairwiseComparator {
    config: ComparatorConfig,
    normalizer: Arc<dyn ImageNormalizer>,
    oracle: Arc<dyn SimilarityOracle>,
}

impl PairwiseComparator {
    /// Create a comparator with the standard normalizer and oracle
    pub fn new(config: ComparatorConfig) -> Result<Self, CompareError> {
        config.validate()?;
        Ok(Self {
            config,
            normalizer: Arc::new(StandardNormalizer::new(config.envelope)),
            oracle: Arc::new(ChannelDiffOracle::new()),
        })
    }

    /// Replace the similarity oracle
    pub fn with_oracle(mut self, oracle: Arc<dyn SimilarityOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    /// Replace the image normalizer
    pub fn with_normalizer(mut self, normalizer: Arc<dyn ImageNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &ComparatorConfig {
        &self.config
    }

    /// Normalize encoded bytes with this comparator's normalizer
    pub fn normalize(&self, bytes: &[u8]) -> Result<NormalizedImage, NormalizeError> {
        self.normalizer.normalize(bytes)
    }

    /// `true` when the two encoded images are duplicates. Never fails.
    pub fn are_duplicates(&self, a: &[u8], b: &[u8]) -> bool {
        self.compare(a, b).is_duplicate()
    }

    /// Compare two encoded images
    pub fn compare(&self, a: &[u8], b: &[u8]) -> Verdict {
        let normalized = self
            .normalize(a)
            .and_then(|image_a| Ok((image_a, self.normalize(b)?)));

        match normalized {
            Ok((image_a, image_b)) => self.compare_normalized(&image_a, &image_b),
            Err(e) => {
                debug!(error = %e, "normalization failed, treating pair as distinct");
                Verdict::Inconclusive
            }
        }
    }

    /// Compare two already-normalized images
    pub fn compare_normalized(&self, a: &NormalizedImage, b: &NormalizedImage) -> Verdict {
        if !a.same_shape(b) {
            debug!(left = %a.shape(), right = %b.shape(), "shape mismatch");
            return Verdict::ShapeMismatch;
        }

        if a.digest() == b.digest() {
            return Verdict::ExactMatch;
        }

        match self
            .oracle
            .count_differing_pixels(a, b, self.config.pixel_tolerance)
        {
            Ok(differing_pixels) if differing_pixels < self.config.max_differing_pixels => {
                Verdict::WithinTolerance { differing_pixels }
            }
            Ok(differing_pixels) => Verdict::Different { differing_pixels },
            Err(e) => {
                // The hash check already failed, so the fallback verdict is "different"
                warn!(error = %e, "similarity oracle failed, using hash verdict");
                Verdict::Inconclusive
            }
        }
    }
}

impl std::fmt::Debug for PairwiseComparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairwiseComparator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

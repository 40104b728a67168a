//! # Scanner Module
//!
//! Discovers candidate image files in a directory.
//!
//! ## Supported Formats
//! - JPEG (.jpg, .jpeg)
//! - PNG (.png)
//! - WebP (.webp)
//! - GIF (.gif)
//!
//! Extensions are matched case-insensitively. Anything else is skipped
//! without being reported.
//!
//! ## Example
//! ```rust,ignore
//! use image_dedup::core::scanner::{CandidateScanner, ScanConfig, WalkDirScanner};
//!
//! let scanner = WalkDirScanner::new(ScanConfig::default());
//! let files = scanner.scan(Path::new("/Users/photos"))?;
//! ```

mod filter;
mod walker;

pub use filter::ImageFilter;
pub use walker::{ScanConfig, WalkDirScanner};

use crate::error::ScanError;
use crate::events::EventSender;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A discovered candidate image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    /// Path to the file
    pub path: PathBuf,
}

/// Trait for candidate scanners
///
/// Implement this trait to create custom scanners (e.g., for testing).
pub trait CandidateScanner: Send + Sync {
    /// Discover candidate images under `root`, in discovery order
    fn scan(&self, root: &Path) -> Result<Vec<ImageFile>, ScanError>;

    /// Scan with progress reporting via events
    fn scan_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<Vec<ImageFile>, ScanError>;
}

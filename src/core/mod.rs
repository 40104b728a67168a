//! # Core Module
//!
//! The UI-agnostic duplicate detection engine.
//!
//! ## Modules
//! - `scanner` - Discovers candidate images in a directory
//! - `normalizer` - Decodes and fits images into the comparison envelope
//! - `oracle` - Counts pixels that differ beyond a tolerance
//! - `comparator` - Decides whether two images are duplicates
//! - `grouper` - Clusters candidates into duplicate groups
//! - `resolver` - Applies the retention policy and deletes files
//! - `reporter` - Builds and writes the JSON run report
//! - `pipeline` - Orchestrates the full workflow

pub mod comparator;
pub mod grouper;
pub mod normalizer;
pub mod oracle;
pub mod pipeline;
pub mod reporter;
pub mod resolver;
pub mod scanner;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use comparator::{ComparatorConfig, MatchKind, PairwiseComparator, Verdict};
pub use grouper::{DuplicateGroup, DuplicateGrouper, GroupingMode};
pub use reporter::RunReport;
pub use resolver::{RetentionMode, RetentionPolicy};
pub use scanner::ImageFile;

//! # Pipeline Module
//!
//! Orchestrates one duplicate-detection run.
//!
//! ## Pipeline Stages
//! 1. **Scan** - Discover candidate images in the directory
//! 2. **Compare** - Read, normalize and group duplicates
//! 3. **Resolve** - Apply the retention policy and delete files
//! 4. **Report** - Write the JSON run report (always, even when empty)
//!
//! Scan, read and report failures end the run. Decode, oracle and
//! deletion failures are recovered inside their stage.

mod executor;

pub use executor::{Pipeline, PipelineBuilder, PipelineConfig, PipelineResult};

//! # Image Dedup
//!
//! Finds visually duplicate images in a directory, groups them, and applies
//! a retention policy.
//!
//! ## Core Philosophy
//! - **List by default** - Nothing is deleted unless a policy asks for it
//! - **Tolerate noise** - Re-encoded copies still match within a pixel budget
//! - **Always report** - Every run leaves a JSON record of what it found and did
//!
//! ## Architecture
//! - `core` - The duplicate detection engine
//! - `events` - Event-driven progress reporting
//! - `error` - Typed error taxonomy
//!
//! ## Example
//! ```no_run
//! use image_dedup::core::pipeline::Pipeline;
//! use image_dedup::core::RetentionPolicy;
//!
//! let mut pipeline = Pipeline::builder()
//!     .directory("./photos")
//!     .policy(RetentionPolicy::ListOnly)
//!     .build()?;
//! let result = pipeline.run()?;
//! println!("{} duplicate groups", result.groups.len());
//! # Ok::<(), image_dedup::DedupError>(())
//! ```

pub mod core;
pub mod error;
pub mod events;

// Re-export commonly used types at the crate root
pub use error::{DedupError, Result};

use tracing_subscriber::EnvFilter;

/// Initialize tracing for the library
///
/// This should be called by the application entry point. `RUST_LOG` wins
/// when set; otherwise `verbose` selects `debug` over `warn`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    // A subscriber may already be installed by an embedding application.
    let _ = tracing::subscriber::set_global_default(subscriber);
}

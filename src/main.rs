//! # image-dedup CLI
//!
//! Command-line interface for the duplicate image finder.
//!
//! ## Usage
//! ```bash
//! image-dedup scan ~/Pictures --mode list-only
//! image-dedup scan ~/Pictures --mode auto-keep-first --output json
//! ```

mod cli;

use image_dedup::{DedupError, Result};
use std::process::ExitCode;

/// Exit status for a finished run: 0 on success, 2 when cancelled, 1 on error
fn exit_status(result: &Result<()>) -> u8 {
    match result {
        Ok(()) => 0,
        Err(DedupError::Cancelled) => 2,
        Err(_) => 1,
    }
}

fn main() -> ExitCode {
    let result = cli::run();
    match &result {
        Ok(()) => {}
        Err(DedupError::Cancelled) => eprintln!("Operation cancelled."),
        Err(e) => eprintln!("Error: {e}"),
    }
    ExitCode::from(exit_status(&result))
}

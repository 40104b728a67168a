//! # Error Module
//!
//! Error types for the duplicate image engine.
//!
//! ## Design Principles
//! - **Never panic** on user data - return errors instead
//! - **Include context** - paths, file names, what went wrong
//! - **Recover where it is safe** - decode, oracle and deletion failures are
//!   handled inside their stage; scan and report failures end the run

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum DedupError {
    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Comparison error: {0}")]
    Compare(#[from] CompareError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Operation cancelled")]
    Cancelled,
}

/// Errors that occur while discovering or reading candidate files
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read image file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that occur while turning encoded bytes into a normalized pixel buffer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("Failed to decode image: {reason}")]
    Decode { reason: String },

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Resize failed: {reason}")]
    Resize { reason: String },
}

/// Errors raised by a similarity oracle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("Buffers differ in shape: {left} vs {right}")]
    ShapeMismatch { left: String, right: String },

    #[error("Similarity oracle failed: {0}")]
    Failed(String),
}

/// Errors in comparator configuration
#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Invalid pixel tolerance: {value} (must be between 0 and 1)")]
    InvalidTolerance { value: f64 },

    #[error("Invalid resize envelope: {width}x{height} (both sides must be non-zero)")]
    InvalidEnvelope { width: u32, height: u32 },
}

/// Per-file deletion failures; recorded, never fatal
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteError {
    #[error("File not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied deleting {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Failed to delete {path}: {reason}")]
    Io { path: PathBuf, reason: String },
}

/// Errors that occur while writing the run report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to create report directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, DedupError>;

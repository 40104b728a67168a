//! File removal port.

use crate::error::DeleteError;
use std::io::ErrorKind;
use std::path::Path;

/// Removes a single file
pub trait FileRemover: Send + Sync {
    fn remove(&self, path: &Path) -> Result<(), DeleteError>;
}

/// Deletes files from the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsRemover;

impl FileRemover for FsRemover {
    fn remove(&self, path: &Path) -> Result<(), DeleteError> {
        std::fs::remove_file(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => DeleteError::NotFound {
                path: path.to_path_buf(),
            },
            ErrorKind::PermissionDenied => DeleteError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => DeleteError::Io {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })
    }
}

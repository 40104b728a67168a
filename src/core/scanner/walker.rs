//! Directory walking implementation using walkdir.

use super::filter::{is_hidden, ImageFilter};
use super::{CandidateScanner, ImageFile};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Descend into subdirectories
    pub recursive: bool,
    /// Whether to follow symbolic links. When off, a symlink is not a
    /// regular file and is skipped, even if it points at an image.
    pub follow_symlinks: bool,
    /// Whether to include hidden files and directories
    pub include_hidden: bool,
    /// Custom extensions to include (None = use defaults)
    pub extensions: Option<Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            recursive: false,
            follow_symlinks: false,
            include_hidden: true,
            extensions: None,
        }
    }
}

/// Scanner implementation using the walkdir crate
///
/// Entries are visited sorted by file name so discovery order is stable
/// across platforms and runs.
pub struct WalkDirScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl WalkDirScanner {
    /// Create a new scanner with the given configuration
    pub fn new(config: ScanConfig) -> Self {
        let mut filter = ImageFilter::new().with_hidden(config.include_hidden);

        if let Some(ref extensions) = config.extensions {
            filter = filter.with_extensions(extensions.clone());
        }

        Self { config, filter }
    }
}

impl CandidateScanner for WalkDirScanner {
    fn scan(&self, root: &Path) -> Result<Vec<ImageFile>, ScanError> {
        self.scan_with_events(root, &null_sender())
    }

    fn scan_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<Vec<ImageFile>, ScanError> {
        if !root.exists() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let include_hidden = self.config.include_hidden;
        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                include_hidden
                    || entry.depth() == 0
                    || !entry.file_type().is_dir()
                    || !is_hidden(entry.path())
            });

        let mut files = Vec::new();

        for entry_result in walker {
            let entry = entry_result.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| root.to_path_buf());
                ScanError::ReadDirectory {
                    path,
                    source: std::io::Error::other(e.to_string()),
                }
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !self.filter.should_include(path) {
                continue;
            }

            events.send(Event::Scan(ScanEvent::CandidateFound {
                path: path.to_path_buf(),
            }));

            files.push(ImageFile {
                path: path.to_path_buf(),
            });
        }

        debug!(root = %root.display(), candidates = files.len(), "scan complete");

        events.send(Event::Scan(ScanEvent::Completed {
            total_candidates: files.len(),
        }));

        Ok(files)
    }
}

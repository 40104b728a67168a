//! Writes run reports to disk.

use super::RunReport;
use crate::error::ReportError;
use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name for a report completed at `timestamp`
///
/// Colons are avoided so the name is valid on every platform.
pub fn report_file_name(timestamp: &DateTime<Utc>) -> String {
    format!("duplicates-{}.json", timestamp.format("%Y%m%dT%H%M%S%3fZ"))
}

/// Writes reports into a directory, creating it if needed
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `report` and return the path of the new file
    ///
    /// Existing reports are never overwritten; a name collision gets a
    /// numeric suffix.
    pub fn write(&self, report: &RunReport) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;

        let json = serde_json::to_vec_pretty(report)?;
        let (path, file) = self.create_new_file(&report.timestamp)?;

        let write_err = |source: std::io::Error| ReportError::Write {
            path: path.clone(),
            source,
        };
        let mut writer = BufWriter::new(file);
        writer.write_all(&json).map_err(write_err)?;
        writer.flush().map_err(write_err)?;

        info!(path = %path.display(), groups = report.duplicate_groups.len(), "report written");

        Ok(path)
    }

    fn create_new_file(&self, timestamp: &DateTime<Utc>) -> Result<(PathBuf, File), ReportError> {
        let name = report_file_name(timestamp);
        let stem = name.trim_end_matches(".json");

        let mut attempt = 0u32;
        loop {
            let path = if attempt == 0 {
                self.output_dir.join(&name)
            } else {
                self.output_dir.join(format!("{}-{}.json", stem, attempt))
            };

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(source) => return Err(ReportError::Write { path, source }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 5).unwrap()
    }

    #[test]
    fn file_name_is_timestamped() {
        assert_eq!(
            report_file_name(&timestamp()),
            "duplicates-20261018T093005000Z.json"
        );
    }

    #[test]
    fn write_creates_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("nested").join("reports");
        let writer = ReportWriter::new(&output_dir);

        let path = writer.write(&RunReport::empty(timestamp())).unwrap();

        assert!(path.starts_with(&output_dir));
        let parsed: RunReport = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert!(parsed.duplicate_groups.is_empty());
        assert!(parsed.deleted_files.is_empty());
    }

    #[test]
    fn write_into_existing_directory_is_fine() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path());

        writer.write(&RunReport::empty(timestamp())).unwrap();
        let later = timestamp() + chrono::Duration::seconds(1);
        writer.write(&RunReport::empty(later)).unwrap();

        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn same_timestamp_never_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let writer = ReportWriter::new(temp_dir.path());
        let first = RunReport::empty(timestamp());
        let mut second = RunReport::empty(timestamp());
        second.deleted_files.push(PathBuf::from("/photos/b.png"));

        let first_path = writer.write(&first).unwrap();
        let second_path = writer.write(&second).unwrap();

        assert_ne!(first_path, second_path);
        assert!(second_path.ends_with("duplicates-20261018T093005000Z-1.json"));

        let kept: RunReport = serde_json::from_slice(&fs::read(&first_path).unwrap()).unwrap();
        assert!(kept.deleted_files.is_empty());
        let written: RunReport = serde_json::from_slice(&fs::read(&second_path).unwrap()).unwrap();
        assert_eq!(written.deleted_files, vec![PathBuf::from("/photos/b.png")]);
    }

    #[test]
    fn unwritable_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, b"file, not a directory").unwrap();

        let writer = ReportWriter::new(blocker.join("reports"));
        let result = writer.write(&RunReport::empty(timestamp()));

        assert!(matches!(result, Err(ReportError::CreateDir { .. })));
    }
}

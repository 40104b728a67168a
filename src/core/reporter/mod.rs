//! # Reporter Module
//!
//! The durable record of a run.
//!
//! One JSON document per run, written even when nothing was found:
//! ```json
//! {
//!   "duplicateGroups": [["/photos/a.png", "/photos/b.png"]],
//!   "deletedFiles": ["/photos/b.png"],
//!   "failedDeletions": [],
//!   "timestamp": "2026-10-18T09:30:00.123Z"
//! }
//! ```

mod writer;

pub use writer::{report_file_name, ReportWriter};

use crate::core::grouper::DuplicateGroup;
use crate::core::resolver::{deleted_files, failed_deletions, ResolutionOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A deletion that failed, as recorded in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedDeletion {
    pub path: PathBuf,
    pub reason: String,
}

/// Groups and deletions of a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Member paths of every duplicate group, in discovery order
    pub duplicate_groups: Vec<Vec<PathBuf>>,
    /// Files that were actually removed
    pub deleted_files: Vec<PathBuf>,
    /// Files whose removal was attempted and failed
    #[serde(default)]
    pub failed_deletions: Vec<FailedDeletion>,
    /// When the run completed
    pub timestamp: DateTime<Utc>,
}

impl RunReport {
    /// Build a report from groups and resolution outcomes
    pub fn new(
        groups: &[DuplicateGroup],
        outcomes: &[ResolutionOutcome],
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            duplicate_groups: groups.iter().map(|g| g.members.clone()).collect(),
            deleted_files: deleted_files(outcomes),
            failed_deletions: failed_deletions(outcomes)
                .into_iter()
                .map(|f| FailedDeletion {
                    path: f.path,
                    reason: f.error.to_string(),
                })
                .collect(),
            timestamp,
        }
    }

    /// A report with no groups and no deletions
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self::new(&[], &[], timestamp)
    }

    /// Number of files across all groups that were not the kept copy
    pub fn duplicate_count(&self) -> usize {
        self.duplicate_groups
            .iter()
            .map(|g| g.len().saturating_sub(1))
            .sum()
    }
}

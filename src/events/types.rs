//! Event type definitions for progress reporting.

use crate::core::resolver::RetentionMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// All events emitted by the duplicate image pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    /// File discovery events
    Scan(ScanEvent),
    /// Grouping events
    Compare(CompareEvent),
    /// Retention policy events
    Resolve(ResolveEvent),
    /// Pipeline-level events
    Pipeline(PipelineEvent),
}

/// Events during file discovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScanEvent {
    /// Discovery has started
    Started { root: PathBuf },
    /// A candidate image was found
    CandidateFound { path: PathBuf },
    /// Discovery completed
    Completed { total_candidates: usize },
}

/// Events during normalization and grouping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompareEvent {
    /// Grouping has started
    Started { total_candidates: usize },
    /// A candidate could not be normalized; it will match nothing
    Unreadable { path: PathBuf, message: String },
    /// Progress update after each anchor scan
    Progress(CompareProgress),
    /// A duplicate group was formed
    DuplicateFound { group_id: Uuid, member_count: usize },
    /// Grouping completed
    Completed { total_groups: usize },
}

/// Progress information during grouping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareProgress {
    /// Candidates that are claimed by a group or have served as an anchor
    pub candidates_settled: usize,
    /// Total number of candidates
    pub total_candidates: usize,
    /// Number of duplicate groups found so far
    pub groups_found: usize,
}

/// Events during resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResolveEvent {
    /// Resolution has started
    Started { total_groups: usize, mode: RetentionMode },
    /// A file was removed
    FileDeleted { path: PathBuf },
    /// A file could not be removed; the run continues
    DeletionFailed { path: PathBuf, message: String },
    /// A group has been resolved
    GroupResolved {
        group_id: Uuid,
        kept: Option<PathBuf>,
        deleted: usize,
    },
    /// Resolution completed
    Completed { deleted: usize, failed: usize },
}

/// Pipeline-level events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PipelineEvent {
    /// Pipeline has started
    Started,
    /// Moving to a new phase
    PhaseChanged { phase: PipelinePhase },
    /// Pipeline completed successfully
    Completed { summary: PipelineSummary },
    /// Pipeline encountered a fatal error
    Error { message: String },
}

/// Phases of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelinePhase {
    Scanning,
    Comparing,
    Resolving,
    Reporting,
}

/// Summary of pipeline results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Candidate images discovered
    pub total_candidates: usize,
    /// Number of duplicate groups found
    pub duplicate_groups: usize,
    /// Files actually removed
    pub deleted_files: usize,
    /// Files whose removal failed
    pub failed_deletions: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl std::fmt::Display for PipelinePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelinePhase::Scanning => write!(f, "Scanning"),
            PipelinePhase::Comparing => write!(f, "Comparing"),
            PipelinePhase::Resolving => write!(f, "Resolving"),
            PipelinePhase::Reporting => write!(f, "Reporting"),
        }
    }
}

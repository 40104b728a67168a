//! # Grouper Module
//!
//! Partitions candidate images into duplicate groups.
//!
//! ## Modes
//! - **Anchor** (default): walk candidates in discovery order; each unclaimed
//!   candidate anchors a group and claims every later unclaimed candidate
//!   that duplicates it. Members are only guaranteed to match the anchor, not
//!   each other.
//! - **Connected**: compare every pair and take connected components of the
//!   duplicate graph. Transitive, so it can merge groups the anchor mode
//!   keeps apart.
//!
//! Each candidate is decoded and normalized exactly once, up front and in
//! parallel; its raw bytes are dropped as soon as the normalized buffer
//! exists. A candidate that fails to normalize never matches anything.

mod anchor;
mod connected;

use crate::core::comparator::{MatchKind, PairwiseComparator, Verdict};
use crate::core::normalizer::NormalizedImage;
use crate::error::ScanError;
use crate::events::{null_sender, CompareEvent, Event, EventSender};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

/// A file path plus its raw content
#[derive(Debug, Clone)]
pub struct Candidate {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl Candidate {
    pub fn new(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }

    /// Read a candidate from disk
    pub fn load(path: &Path) -> Result<Self, ScanError> {
        let bytes = std::fs::read(path).map_err(|source| ScanError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(path, bytes))
    }
}

/// A candidate after normalization; `image` is `None` when decoding failed
#[derive(Debug)]
pub(crate) struct PreparedCandidate {
    path: PathBuf,
    image: Option<NormalizedImage>,
}

/// A group of duplicate images, in discovery order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Unique identifier for this group
    pub id: Uuid,
    /// Member paths; the first is the anchor
    pub members: Vec<PathBuf>,
    /// `Exact` if every match was a pixel-identical hash match
    pub match_kind: MatchKind,
}

impl DuplicateGroup {
    pub fn new(members: Vec<PathBuf>, match_kind: MatchKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            members,
            match_kind,
        }
    }

    /// First member in discovery order
    pub fn first(&self) -> Option<&Path> {
        self.members.first().map(PathBuf::as_path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.members.iter().any(|m| m == path)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Number of members beyond the one that would be kept
    pub fn duplicate_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }
}

/// How candidates are clustered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GroupingMode {
    /// Members must match the group's first member
    #[default]
    Anchor,
    /// Connected components of the pairwise duplicate graph
    Connected,
}

/// Runs the pairwise comparator across a working set
#[derive(Debug, Clone)]
pub struct DuplicateGrouper {
    comparator: PairwiseComparator,
    mode: GroupingMode,
}

impl DuplicateGrouper {
    pub fn new(comparator: PairwiseComparator, mode: GroupingMode) -> Self {
        Self { comparator, mode }
    }

    pub fn mode(&self) -> GroupingMode {
        self.mode
    }

    /// Group in-memory candidates
    pub fn group(&self, candidates: Vec<Candidate>) -> Vec<DuplicateGroup> {
        self.group_with_events(candidates, &null_sender())
    }

    /// Group in-memory candidates with progress events
    pub fn group_with_events(
        &self,
        candidates: Vec<Candidate>,
        events: &EventSender,
    ) -> Vec<DuplicateGroup> {
        let prepared: Vec<_> = candidates
            .into_par_iter()
            .map(|candidate| self.prepare(candidate, events))
            .collect();
        self.group_prepared(&prepared, events)
    }

    /// Read, normalize and group files.
    ///
    /// A read failure on any file aborts the whole run.
    pub fn group_files(
        &self,
        paths: &[PathBuf],
        events: &EventSender,
    ) -> Result<Vec<DuplicateGroup>, ScanError> {
        let prepared = paths
            .par_iter()
            .map(|path| Candidate::load(path).map(|c| self.prepare(c, events)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(self.group_prepared(&prepared, events))
    }

    fn prepare(&self, candidate: Candidate, events: &EventSender) -> PreparedCandidate {
        let Candidate { path, bytes } = candidate;
        let image = match self.comparator.normalize(&bytes) {
            Ok(image) => Some(image),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "candidate will not match anything");
                events.send(Event::Compare(CompareEvent::Unreadable {
                    path: path.clone(),
                    message: e.to_string(),
                }));
                None
            }
        };
        PreparedCandidate { path, image }
    }

    fn group_prepared(
        &self,
        prepared: &[PreparedCandidate],
        events: &EventSender,
    ) -> Vec<DuplicateGroup> {
        events.send(Event::Compare(CompareEvent::Started {
            total_candidates: prepared.len(),
        }));

        let groups = match self.mode {
            GroupingMode::Anchor => anchor::group_by_anchor(&self.comparator, prepared, events),
            GroupingMode::Connected => {
                connected::group_connected(&self.comparator, prepared, events)
            }
        };

        info!(
            candidates = prepared.len(),
            groups = groups.len(),
            mode = ?self.mode,
            "grouping complete"
        );

        events.send(Event::Compare(CompareEvent::Completed {
            total_groups: groups.len(),
        }));

        groups
    }
}

fn verdict(
    comparator: &PairwiseComparator,
    a: &PreparedCandidate,
    b: &PreparedCandidate,
) -> Verdict {
    match (&a.image, &b.image) {
        (Some(image_a), Some(image_b)) => comparator.compare_normalized(image_a, image_b),
        _ => Verdict::Inconclusive,
    }
}

fn announce(group: &DuplicateGroup, events: &EventSender) {
    events.send(Event::Compare(CompareEvent::DuplicateFound {
        group_id: group.id,
        member_count: group.len(),
    }));
}

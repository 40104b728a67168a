//! # Resolver Module
//!
//! Applies a retention policy to duplicate groups and deletes files.
//!
//! ## Policies
//! - **List only** - report groups, delete nothing
//! - **Interactive** - a [`KeepChooser`] picks one member to keep per group;
//!   no choice keeps everything
//! - **Auto keep first** - keep the first member in discovery order, delete
//!   the rest
//!
//! Each deletion is independent. A failure is recorded against its path and
//! the run moves on to the next file.

mod remover;

pub use remover::{FileRemover, FsRemover};

use crate::core::grouper::DuplicateGroup;
use crate::error::DeleteError;
use crate::events::{null_sender, Event, EventSender, ResolveEvent};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Picks which member of a group to keep.
///
/// Returning `None` keeps every member.
pub trait KeepChooser {
    fn choose_keep(&mut self, group: &DuplicateGroup) -> Option<PathBuf>;
}

impl<F> KeepChooser for F
where
    F: FnMut(&DuplicateGroup) -> Option<PathBuf>,
{
    fn choose_keep(&mut self, group: &DuplicateGroup) -> Option<PathBuf> {
        self(group)
    }
}

/// Retention mode without the interactive port attached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetentionMode {
    ListOnly,
    Interactive,
    AutoKeepFirst,
}

impl std::fmt::Display for RetentionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RetentionMode::ListOnly => write!(f, "list-only"),
            RetentionMode::Interactive => write!(f, "interactive"),
            RetentionMode::AutoKeepFirst => write!(f, "auto-keep-first"),
        }
    }
}

/// Retention policy, chosen once per run
#[derive(Default)]
pub enum RetentionPolicy {
    #[default]
    ListOnly,
    Interactive(Box<dyn KeepChooser>),
    AutoKeepFirst,
}

impl RetentionPolicy {
    /// Interactive policy backed by `chooser`
    pub fn interactive(chooser: impl KeepChooser + 'static) -> Self {
        RetentionPolicy::Interactive(Box::new(chooser))
    }

    pub fn mode(&self) -> RetentionMode {
        match self {
            RetentionPolicy::ListOnly => RetentionMode::ListOnly,
            RetentionPolicy::Interactive(_) => RetentionMode::Interactive,
            RetentionPolicy::AutoKeepFirst => RetentionMode::AutoKeepFirst,
        }
    }
}

impl std::fmt::Debug for RetentionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RetentionPolicy({})", self.mode())
    }
}

/// A deletion that did not happen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionFailure {
    pub path: PathBuf,
    pub error: DeleteError,
}

/// What happened to one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    pub group_id: Uuid,
    /// Member kept, `None` when nothing was chosen
    pub keep: Option<PathBuf>,
    /// Members actually removed
    pub deleted: Vec<PathBuf>,
    /// Members whose removal failed
    pub failed: Vec<DeletionFailure>,
}

impl ResolutionOutcome {
    fn untouched(group: &DuplicateGroup) -> Self {
        Self {
            group_id: group.id,
            keep: None,
            deleted: Vec::new(),
            failed: Vec::new(),
        }
    }
}

/// Every deleted path across outcomes, in group order
pub fn deleted_files(outcomes: &[ResolutionOutcome]) -> Vec<PathBuf> {
    outcomes
        .iter()
        .flat_map(|o| o.deleted.iter().cloned())
        .collect()
}

/// Every failed deletion across outcomes, in group order
pub fn failed_deletions(outcomes: &[ResolutionOutcome]) -> Vec<DeletionFailure> {
    outcomes
        .iter()
        .flat_map(|o| o.failed.iter().cloned())
        .collect()
}

/// Applies a retention policy and performs deletions
pub struct Resolver {
    remover: Box<dyn FileRemover>,
}

impl Resolver {
    pub fn new(remover: Box<dyn FileRemover>) -> Self {
        Self { remover }
    }

    /// Resolve every group in order
    pub fn resolve(
        &self,
        groups: &[DuplicateGroup],
        policy: &mut RetentionPolicy,
    ) -> Vec<ResolutionOutcome> {
        self.resolve_with_events(groups, policy, &null_sender())
    }

    /// Resolve with progress events
    pub fn resolve_with_events(
        &self,
        groups: &[DuplicateGroup],
        policy: &mut RetentionPolicy,
        events: &EventSender,
    ) -> Vec<ResolutionOutcome> {
        events.send(Event::Resolve(ResolveEvent::Started {
            total_groups: groups.len(),
            mode: policy.mode(),
        }));

        let outcomes: Vec<_> = groups
            .iter()
            .map(|group| {
                let keep = match policy {
                    RetentionPolicy::ListOnly => None,
                    RetentionPolicy::AutoKeepFirst => group.first().map(Path::to_path_buf),
                    RetentionPolicy::Interactive(chooser) => {
                        validate_choice(group, chooser.choose_keep(group))
                    }
                };

                let outcome = match keep {
                    Some(keep) => self.delete_all_but(group, keep, events),
                    None => ResolutionOutcome::untouched(group),
                };

                events.send(Event::Resolve(ResolveEvent::GroupResolved {
                    group_id: group.id,
                    kept: outcome.keep.clone(),
                    deleted: outcome.deleted.len(),
                }));

                outcome
            })
            .collect();

        let deleted = outcomes.iter().map(|o| o.deleted.len()).sum();
        let failed = outcomes.iter().map(|o| o.failed.len()).sum();
        info!(
            mode = %policy.mode(),
            groups = groups.len(),
            deleted,
            failed,
            "resolution complete"
        );
        events.send(Event::Resolve(ResolveEvent::Completed { deleted, failed }));

        outcomes
    }

    fn delete_all_but(
        &self,
        group: &DuplicateGroup,
        keep: PathBuf,
        events: &EventSender,
    ) -> ResolutionOutcome {
        let mut deleted = Vec::new();
        let mut failed = Vec::new();

        for path in group.members.iter().filter(|m| **m != keep) {
            match self.remover.remove(path) {
                Ok(()) => {
                    events.send(Event::Resolve(ResolveEvent::FileDeleted { path: path.clone() }));
                    deleted.push(path.clone());
                }
                Err(error) => {
                    warn!(path = %path.display(), error = %error, "deletion failed");
                    events.send(Event::Resolve(ResolveEvent::DeletionFailed {
                        path: path.clone(),
                        message: error.to_string(),
                    }));
                    failed.push(DeletionFailure {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        ResolutionOutcome {
            group_id: group.id,
            keep: Some(keep),
            deleted,
            failed,
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(Box::new(FsRemover))
    }
}

fn validate_choice(group: &DuplicateGroup, choice: Option<PathBuf>) -> Option<PathBuf> {
    let choice = choice?;
    if group.contains(&choice) {
        Some(choice)
    } else {
        warn!(
            choice = %choice.display(),
            group = %group.id,
            "chosen file is not in the group, keeping all"
        );
        None
    }
}

//! Anchor-based grouping: members are matched against the group's first
//! member only.

use super::{announce, verdict, DuplicateGroup, PreparedCandidate};
use crate::core::comparator::{MatchKind, PairwiseComparator};
use crate::events::{CompareEvent, CompareProgress, Event, EventSender};
use rayon::prelude::*;

pub(super) fn group_by_anchor(
    comparator: &PairwiseComparator,
    prepared: &[PreparedCandidate],
    events: &EventSender,
) -> Vec<DuplicateGroup> {
    let total = prepared.len();
    let mut claimed = vec![false; total];
    let mut settled = 0;
    let mut groups = Vec::new();

    for anchor in 0..total {
        if claimed[anchor] {
            continue;
        }
        claimed[anchor] = true;
        settled += 1;

        // Claims made during this scan never change which candidates it
        // visits, so the comparisons can run in parallel and be applied in
        // discovery order afterwards.
        let pending: Vec<usize> = ((anchor + 1)..total).filter(|&j| !claimed[j]).collect();
        let verdicts: Vec<_> = pending
            .par_iter()
            .map(|&j| (j, verdict(comparator, &prepared[anchor], &prepared[j])))
            .collect();

        let mut members = vec![prepared[anchor].path.clone()];
        let mut kind = MatchKind::Exact;

        for (j, verdict) in verdicts {
            if let Some(match_kind) = verdict.match_kind() {
                claimed[j] = true;
                settled += 1;
                members.push(prepared[j].path.clone());
                kind = kind.weakest(match_kind);
            }
        }

        if members.len() >= 2 {
            let group = DuplicateGroup::new(members, kind);
            announce(&group, events);
            groups.push(group);
        }

        events.send(Event::Compare(CompareEvent::Progress(CompareProgress {
            candidates_settled: settled,
            total_candidates: total,
            groups_found: groups.len(),
        })));
    }

    groups
}

//! Connected-components grouping.
//!
//! If A matches B and B matches C, then {A, B, C} forms a single group
//! even if A doesn't directly match C.

use super::{announce, verdict, DuplicateGroup, PreparedCandidate};
use crate::core::comparator::{MatchKind, PairwiseComparator};
use crate::events::{CompareEvent, CompareProgress, Event, EventSender};
use rayon::prelude::*;
use std::collections::HashMap;

/// Union-find over candidate indices
struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    /// Find root with path compression
    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a == root_b {
            return;
        }
        let (small, large) = if self.size[root_a] < self.size[root_b] {
            (root_a, root_b)
        } else {
            (root_b, root_a)
        };
        self.parent[small] = large;
        self.size[large] += self.size[small];
    }
}

pub(super) fn group_connected(
    comparator: &PairwiseComparator,
    prepared: &[PreparedCandidate],
    events: &EventSender,
) -> Vec<DuplicateGroup> {
    let total = prepared.len();

    let edges: Vec<(usize, usize, MatchKind)> = (0..total)
        .into_par_iter()
        .flat_map_iter(|i| {
            ((i + 1)..total).filter_map(move |j| {
                verdict(comparator, &prepared[i], &prepared[j])
                    .match_kind()
                    .map(|kind| (i, j, kind))
            })
        })
        .collect();

    let mut sets = DisjointSet::new(total);
    for &(a, b, _) in &edges {
        sets.union(a, b);
    }

    let mut kinds: HashMap<usize, MatchKind> = HashMap::new();
    for &(a, _, kind) in &edges {
        let root = sets.find(a);
        let entry = kinds.entry(root).or_insert(MatchKind::Exact);
        *entry = entry.weakest(kind);
    }

    // Components ordered by their earliest member; members in discovery order
    let mut slots: HashMap<usize, usize> = HashMap::new();
    let mut components: Vec<(usize, Vec<usize>)> = Vec::new();
    for index in 0..total {
        let root = sets.find(index);
        let slot = *slots.entry(root).or_insert_with(|| {
            components.push((root, Vec::new()));
            components.len() - 1
        });
        components[slot].1.push(index);
    }

    let mut groups = Vec::new();
    for (root, indices) in components {
        if indices.len() < 2 {
            continue;
        }
        let members = indices
            .into_iter()
            .map(|i| prepared[i].path.clone())
            .collect();
        let kind = kinds.get(&root).copied().unwrap_or(MatchKind::Exact);
        let group = DuplicateGroup::new(members, kind);
        announce(&group, events);
        groups.push(group);
    }

    events.send(Event::Compare(CompareEvent::Progress(CompareProgress {
        candidates_settled: total,
        total_candidates: total,
        groups_found: groups.len(),
    })));

    groups
}

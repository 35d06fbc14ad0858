use std::collections::HashSet;

use crate::classify::{OFFICIAL_COMMENT, OFFICIAL_REVIEW, PUBLIC_COMMENT};
use crate::forum::Forum;
use crate::note::Note;

const CHAIN_STARTER_MARKERS: &[&str] = &[OFFICIAL_REVIEW, PUBLIC_COMMENT, OFFICIAL_COMMENT];

#[derive(Clone, Debug, Default)]
pub struct RawChains<'a> {
    pub chains: Vec<Vec<&'a Note>>,
    pub visited: HashSet<String>,
}

impl<'a> RawChains<'a> {
    pub fn unreachable(&self, forum: &'a Forum) -> Vec<&'a Note> {
        forum
            .notes()
            .iter()
            .filter(|note| !self.visited.contains(&note.id))
            .collect()
    }
}

// Index into CHAIN_STARTER_MARKERS; a note carrying several markers takes the first.
fn starter_rank(note: &Note) -> Option<usize> {
    CHAIN_STARTER_MARKERS
        .iter()
        .position(|marker| note.has_invitation_marker(marker))
}

pub fn is_chain_starter(note: &Note) -> bool {
    starter_rank(note).is_some()
}

/// Reviews open chains first, then public comments, then official comments,
/// each in forum order. Top-level starters go before the ones whose parent is
/// another note.
pub fn build_raw_chains(forum: &Forum) -> RawChains<'_> {
    let mut visited = HashSet::new();
    let mut chains = Vec::new();

    let mut candidates: Vec<(usize, usize)> = forum
        .notes()
        .iter()
        .enumerate()
        .filter_map(|(position, note)| starter_rank(note).map(|rank| (rank, position)))
        .collect();
    candidates.sort_by_key(|(rank, _)| *rank);

    let (primary, secondary): (Vec<usize>, Vec<usize>) = candidates
        .into_iter()
        .map(|(_, position)| position)
        .partition(|position| forum.is_top_level(&forum.notes()[*position]));

    for root in primary.into_iter().chain(secondary) {
        if visited.contains(&forum.notes()[root].id) {
            continue;
        }
        let chain = flatten_chain(forum, root, &mut visited);
        if !chain.is_empty() {
            chains.push(chain);
        }
    }

    RawChains { chains, visited }
}

// Iterative DFS, children oldest first. The visited check on pop also cuts
// parent cycles.
pub fn flatten_chain<'a>(
    forum: &'a Forum,
    root: usize,
    visited: &mut HashSet<String>,
) -> Vec<&'a Note> {
    let mut chain = Vec::new();
    let mut stack = vec![root];

    while let Some(position) = stack.pop() {
        let note = &forum.notes()[position];
        if !visited.insert(note.id.clone()) {
            continue;
        }
        chain.push(note);
        stack.extend(forum.children_of(&note.id).iter().rev().copied());
    }

    chain
}

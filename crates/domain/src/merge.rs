use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::note::{COMMENT_FIELD, Note};

const TURN_SEPARATOR: &str = "\n\n";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FragmentKind {
    Author,
    ReviewerFollowup,
}

pub fn fragment_kind(note: &Note) -> Option<FragmentKind> {
    if note.is_author_response() {
        Some(FragmentKind::Author)
    } else if note.is_reviewer_followup() {
        Some(FragmentKind::ReviewerFollowup)
    } else {
        None
    }
}

fn continues_same_actor(note: &Note, parent: &Note) -> bool {
    let same_kind = (note.is_author_response() && parent.is_author_response())
        || (note.is_reviewer_followup() && parent.is_reviewer_followup());
    same_kind && note.signatures == parent.signatures
}

/// Walks up from `note` through same-actor fragments of the same kind and
/// returns the id that anchors the group.
///
/// The walk returns the parent id at the first break, the current id when the
/// parent is outside `nodes`, and the repeated id when it meets a cycle.
pub fn resolve_merge_root(note: &Note, nodes: &HashMap<&str, &Note>) -> String {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut current = note;

    loop {
        if !seen.insert(current.id.as_str()) {
            return current.id.clone();
        }
        let Some(parent_id) = current.parent_id.as_deref() else {
            return current.id.clone();
        };
        let Some(parent) = nodes.get(parent_id).copied() else {
            return current.id.clone();
        };
        if !continues_same_actor(current, parent) {
            return parent_id.to_string();
        }
        current = parent;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Turn {
    pub note: Note,
    pub merged_from: Vec<String>,
}

impl Turn {
    fn single(note: &Note) -> Self {
        Self {
            note: note.clone(),
            merged_from: Vec::new(),
        }
    }

    pub fn is_merged(&self) -> bool {
        !self.merged_from.is_empty()
    }
}

type MergeKey = (Vec<String>, String, FragmentKind);

// A merged turn keeps its earliest member's fields and chain slot and takes
// the latest member's timestamp.
pub fn merge_turns(chain: &[&Note]) -> Vec<Turn> {
    let nodes: HashMap<&str, &Note> = chain
        .iter()
        .map(|note| (note.id.as_str(), *note))
        .collect();

    let mut group_index: HashMap<MergeKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut placed: Vec<(usize, Turn)> = Vec::with_capacity(chain.len());

    for (position, note) in chain.iter().enumerate() {
        let Some(kind) = fragment_kind(note) else {
            placed.push((position, Turn::single(note)));
            continue;
        };
        let key = (note.signatures.clone(), resolve_merge_root(note, &nodes), kind);
        let index = *group_index.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[index].push(position);
    }

    for mut members in groups {
        members.sort_by_key(|position| chain[*position].timestamp);
        let first = members[0];
        if members.len() == 1 {
            placed.push((first, Turn::single(chain[first])));
            continue;
        }
        placed.push((first, merge_group(chain, &members)));
    }

    placed.sort_by_key(|(position, _)| *position);
    placed.into_iter().map(|(_, turn)| turn).collect()
}

fn merge_group(chain: &[&Note], members: &[usize]) -> Turn {
    let mut merged = chain[members[0]].clone();

    let comments: Vec<&str> = members
        .iter()
        .filter_map(|position| chain[*position].comment_text())
        .collect();
    if !comments.is_empty() {
        merged
            .content
            .insert(COMMENT_FIELD, Value::String(comments.join(TURN_SEPARATOR)));
    }
    if let Some(last) = members.last() {
        merged.timestamp = chain[*last].timestamp;
    }

    Turn {
        note: merged,
        merged_from: members
            .iter()
            .map(|position| chain[*position].id.clone())
            .collect(),
    }
}

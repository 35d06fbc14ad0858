use std::collections::HashMap;

use crate::note::Note;

/// Notes whose parent is null or the paper itself are indexed under the
/// forum id, which acts as the sentinel parent.
#[derive(Clone, Debug)]
pub struct Forum {
    forum_id: String,
    notes: Vec<Note>,
    positions: HashMap<String, usize>,
    children: HashMap<String, Vec<usize>>,
}

impl Forum {
    pub fn new(forum_id: impl Into<String>, mut notes: Vec<Note>) -> Self {
        let forum_id = forum_id.into();
        notes.sort_by_key(|note| note.sort_timestamp);

        let mut positions = HashMap::with_capacity(notes.len());
        let mut children: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, note) in notes.iter().enumerate() {
            positions.entry(note.id.clone()).or_insert(position);
            let parent_key = note
                .parent_id
                .as_deref()
                .unwrap_or(forum_id.as_str())
                .to_string();
            children.entry(parent_key).or_default().push(position);
        }

        Self {
            forum_id,
            notes,
            positions,
            children,
        }
    }

    pub fn forum_id(&self) -> &str {
        &self.forum_id
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn note(&self, id: &str) -> Option<&Note> {
        self.positions.get(id).map(|position| &self.notes[*position])
    }

    pub fn children_of(&self, parent_id: &str) -> &[usize] {
        self.children
            .get(parent_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_top_level(&self, note: &Note) -> bool {
        match note.parent_id.as_deref() {
            None => true,
            Some(parent_id) => parent_id == self.forum_id,
        }
    }

    pub fn submission(&self) -> Option<&Note> {
        self.note(&self.forum_id)
    }
}

pub fn group_into_forums(notes: impl IntoIterator<Item = Note>) -> Vec<Forum> {
    let mut order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<Note>> = HashMap::new();
    for note in notes {
        let bucket = grouped.entry(note.forum_id.clone()).or_insert_with(|| {
            order.push(note.forum_id.clone());
            Vec::new()
        });
        bucket.push(note);
    }

    order
        .into_iter()
        .filter_map(|forum_id| {
            let notes = grouped.remove(&forum_id)?;
            Some(Forum::new(forum_id, notes))
        })
        .collect()
}

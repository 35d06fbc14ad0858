use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::chain::build_raw_chains;
use crate::forum::{Forum, group_into_forums};
use crate::merge::{Turn, merge_turns};
use crate::note::{ActorRole, Note, NoteContent, NoteKind};
use crate::paper::{PaperInfo, PaperResult, extract_paper_info, extract_result};
use crate::util::format_ms_rfc3339;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChainEntry {
    pub id: String,
    pub signatures: Vec<String>,
    pub replyto: Option<String>,
    pub invitations: Vec<String>,
    pub actor_role: ActorRole,
    pub note_kind: NoteKind,
    pub timestamp: i64,
    pub time: Option<String>,
    pub content: NoteContent,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_from: Vec<String>,
}

impl From<Turn> for ChainEntry {
    fn from(turn: Turn) -> Self {
        let Turn { note, merged_from } = turn;
        Self {
            time: format_ms_rfc3339(note.timestamp),
            id: note.id,
            signatures: note.signatures,
            replyto: note.parent_id,
            invitations: note.invitations,
            actor_role: note.actor_role,
            note_kind: note.kind,
            timestamp: note.timestamp,
            content: note.content,
            merged_from,
        }
    }
}

pub type Conversation = Vec<ChainEntry>;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ForumRecord {
    pub paper_info: PaperInfo,
    pub result: PaperResult,
    pub conversations: Vec<Conversation>,
}

impl ForumRecord {
    pub fn merged_turns(&self) -> usize {
        self.conversations
            .iter()
            .flatten()
            .filter(|entry| !entry.merged_from.is_empty())
            .count()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversionSummary {
    pub forums_seen: usize,
    pub forums_emitted: usize,
    pub conversations: usize,
    pub merged_turns: usize,
}

impl ConversionSummary {
    pub fn record(&mut self, record: Option<&ForumRecord>) {
        self.forums_seen += 1;
        if let Some(record) = record {
            self.forums_emitted += 1;
            self.conversations += record.conversations.len();
            self.merged_turns += record.merged_turns();
        }
    }
}

pub fn build_conversations(forum: &Forum) -> Vec<Conversation> {
    build_raw_chains(forum)
        .chains
        .iter()
        .map(|chain| {
            merge_turns(chain)
                .into_iter()
                .map(ChainEntry::from)
                .collect()
        })
        .collect()
}

pub fn structure_forum(forum: &Forum, venue_id: &str) -> Option<ForumRecord> {
    let conversations = build_conversations(forum);
    if conversations.is_empty() {
        return None;
    }
    Some(ForumRecord {
        paper_info: extract_paper_info(forum),
        result: extract_result(forum, venue_id),
        conversations,
    })
}

pub fn structure_notes(
    notes: impl IntoIterator<Item = Note>,
    venue_id: &str,
) -> (BTreeMap<String, ForumRecord>, ConversionSummary) {
    let mut summary = ConversionSummary::default();
    let mut records = BTreeMap::new();

    for forum in group_into_forums(notes) {
        let record = structure_forum(&forum, venue_id);
        summary.record(record.as_ref());
        if let Some(record) = record {
            records.insert(forum.forum_id().to_string(), record);
        }
    }

    (records, summary)
}

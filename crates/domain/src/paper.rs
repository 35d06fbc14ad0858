use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::forum::Forum;
use crate::note::{Note, NoteContent, NoteKind};
use crate::util::format_ms_rfc3339;

pub const DEFAULT_VENUE_ID: &str = "ICLR.cc/2025/Conference";

const WITHDRAWN_MARKER: &str = "Withdrawn_Submission";
const REJECTED_MARKERS: &[&str] = &["Rejected_Submission", "Desk_Rejected_Submission"];
const SUBMISSION_MARKER: &str = "Submission";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaperState {
    Accept,
    Reject,
    Withdrawn,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PaperResult {
    pub state: Option<PaperState>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StaffNote {
    pub id: String,
    pub timestamp: i64,
    pub time: Option<String>,
    pub signatures: Vec<String>,
    pub content: NoteContent,
}

impl From<&Note> for StaffNote {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            timestamp: note.timestamp,
            time: format_ms_rfc3339(note.timestamp),
            signatures: note.signatures.clone(),
            content: note.content.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct PaperInfo {
    pub title: Option<Value>,
    pub keywords: Option<Value>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<Value>,
    pub primary_area: Option<Value>,
    pub pdf_url: Option<Value>,
    pub meta_review: Option<StaffNote>,
    pub decision: Option<StaffNote>,
    pub desk_rejection: Option<StaffNote>,
}

pub fn extract_paper_info(forum: &Forum) -> PaperInfo {
    let Some(submission) = forum.submission() else {
        return PaperInfo::default();
    };

    let field = |name: &str| submission.content.get(name).cloned();
    let mut info = PaperInfo {
        title: field("title"),
        keywords: field("keywords"),
        abstract_text: field("abstract"),
        primary_area: field("primary_area"),
        pdf_url: field("pdf"),
        ..PaperInfo::default()
    };

    for note in forum.notes() {
        match note.kind {
            NoteKind::MetaReview => info.meta_review = Some(StaffNote::from(note)),
            NoteKind::Decision => info.decision = Some(StaffNote::from(note)),
            NoteKind::DeskRejection => info.desk_rejection = Some(StaffNote::from(note)),
            _ => {}
        }
    }

    info
}

pub fn extract_result(forum: &Forum, venue_id: &str) -> PaperResult {
    let state = forum
        .submission()
        .and_then(|submission| submission.venue_id.as_deref())
        .and_then(|venue| paper_state(venue, venue_id));
    PaperResult { state }
}

pub fn paper_state(submission_venue: &str, venue_id: &str) -> Option<PaperState> {
    if submission_venue.contains(WITHDRAWN_MARKER) {
        return Some(PaperState::Withdrawn);
    }
    if REJECTED_MARKERS
        .iter()
        .any(|marker| submission_venue.contains(marker))
    {
        return Some(PaperState::Reject);
    }
    if !venue_id.is_empty()
        && submission_venue.contains(venue_id)
        && !submission_venue.contains(SUBMISSION_MARKER)
    {
        return Some(PaperState::Accept);
    }
    None
}

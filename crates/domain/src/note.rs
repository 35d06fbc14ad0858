use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::DomainResult;
use crate::classify::{self, OFFICIAL_REVIEW, is_author_signature};
use crate::error::DomainError;
use crate::util::epoch_ms_from_value;

pub const COMMENT_FIELD: &str = "comment";

const PRIORITY_FIELDS: &[&str] = &[
    "title",
    "abstract",
    "summary",
    "strengths",
    "weaknesses",
    "questions",
    "comment",
    "decision",
    "rating",
    "confidence",
    "soundness",
    "presentation",
    "contribution",
    "flag_for_ethics_review",
    "code_of_conduct",
];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Reviewer,
    Author,
    AreaChair,
    ProgramChair,
    Public,
    Other,
}


#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    Review,
    MetaReview,
    Decision,
    DeskRejection,
    Rebuttal,
    AuthorComment,
    ReviewerComment,
    AcComment,
    PublicComment,
    Other,
}


#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteContent {
    fields: Map<String, Value>,
}

impl NoteContent {
    // `{"value": v}` wrappers are unwrapped and bare nulls dropped.
    pub fn from_raw(raw: Map<String, Value>) -> Self {
        let mut unwrapped: Vec<(String, Value)> = raw
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::Null => None,
                Value::Object(mut wrapper) if wrapper.contains_key("value") => {
                    Some((key, wrapper.remove("value").unwrap_or(Value::Null)))
                }
                other => Some((key, other)),
            })
            .collect();

        let mut fields = Map::new();
        for priority in PRIORITY_FIELDS {
            if let Some(index) = unwrapped.iter().position(|(key, _)| key == priority) {
                let (key, value) = unwrapped.remove(index);
                fields.insert(key, value);
            }
        }
        for (key, value) in unwrapped {
            fields.insert(key, value);
        }
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.fields.insert(field.into(), value);
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_only(&self, field: &str) -> bool {
        self.fields.len() == 1 && self.fields.contains_key(field)
    }

    pub fn view(&self, kind: NoteKind) -> ContentView<'_> {
        match kind {
            NoteKind::Review => ContentView::Review {
                summary: self.text("summary"),
                strengths: self.text("strengths"),
                weaknesses: self.text("weaknesses"),
                questions: self.text("questions"),
                rating: self.get("rating"),
                confidence: self.get("confidence"),
            },
            NoteKind::MetaReview => ContentView::MetaReview {
                metareview: self.text("metareview"),
                recommendation: self.text("recommendation"),
            },
            NoteKind::Decision | NoteKind::DeskRejection => ContentView::Decision {
                decision: self.text("decision"),
                comment: self.text(COMMENT_FIELD),
            },
            NoteKind::Rebuttal
            | NoteKind::AuthorComment
            | NoteKind::ReviewerComment
            | NoteKind::AcComment
            | NoteKind::PublicComment => ContentView::Comment {
                title: self.text("title"),
                comment: self.text(COMMENT_FIELD),
            },
            NoteKind::Other => ContentView::Generic(&self.fields),
        }
    }
}

impl Serialize for NoteContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, &WrappedValue { value })?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NoteContent {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<Map<String, Value>>::deserialize(deserializer)?;
        Ok(Self::from_raw(raw.unwrap_or_default()))
    }
}

#[derive(Serialize)]
struct WrappedValue<'a> {
    value: &'a Value,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ContentView<'a> {
    Review {
        summary: Option<&'a str>,
        strengths: Option<&'a str>,
        weaknesses: Option<&'a str>,
        questions: Option<&'a str>,
        rating: Option<&'a Value>,
        confidence: Option<&'a Value>,
    },
    MetaReview {
        metareview: Option<&'a str>,
        recommendation: Option<&'a str>,
    },
    Decision {
        decision: Option<&'a str>,
        comment: Option<&'a str>,
    },
    Comment {
        title: Option<&'a str>,
        comment: Option<&'a str>,
    },
    Generic(&'a Map<String, Value>),
}

impl<'a> ContentView<'a> {
    /// Free-text comment. Review and meta-review forms have none.
    pub fn comment(&self) -> Option<&'a str> {
        match *self {
            Self::Decision { comment, .. } | Self::Comment { comment, .. } => comment,
            Self::Generic(fields) => fields.get(COMMENT_FIELD).and_then(Value::as_str),
            Self::Review { .. } | Self::MetaReview { .. } => None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RawNote {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub forum: Option<String>,
    #[serde(default)]
    pub replyto: Option<String>,
    #[serde(default)]
    pub invitations: Option<Vec<String>>,
    #[serde(default)]
    pub signatures: Option<Vec<String>>,
    #[serde(default)]
    pub cdate: Option<Value>,
    #[serde(default)]
    pub tcdate: Option<Value>,
    #[serde(default)]
    pub odate: Option<Value>,
    #[serde(default)]
    pub mdate: Option<Value>,
    #[serde(default)]
    pub content: Option<Map<String, Value>>,
    #[serde(default)]
    pub venueid: Option<Value>,
}

impl RawNote {
    // Entries report cdate first; forum order is tcdate first.
    fn timestamp(&self) -> i64 {
        first_epoch_ms([&self.cdate, &self.tcdate, &self.odate, &self.mdate])
    }

    fn sort_timestamp(&self) -> i64 {
        first_epoch_ms([&self.tcdate, &self.cdate, &self.odate, &self.mdate])
    }
}

fn first_epoch_ms(candidates: [&Option<Value>; 4]) -> i64 {
    candidates
        .into_iter()
        .flatten()
        .find_map(epoch_ms_from_value)
        .unwrap_or(0)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Note {
    pub id: String,
    pub forum_id: String,
    pub parent_id: Option<String>,
    pub invitations: Vec<String>,
    pub signatures: Vec<String>,
    pub actor_role: ActorRole,
    pub kind: NoteKind,
    pub timestamp: i64,
    pub sort_timestamp: i64,
    pub content: NoteContent,
    pub venue_id: Option<String>,
}

impl Note {
    pub fn new(id: impl Into<String>, forum_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            forum_id: forum_id.into(),
            parent_id: None,
            invitations: Vec::new(),
            signatures: Vec::new(),
            actor_role: ActorRole::Other,
            kind: NoteKind::Other,
            timestamp: 0,
            sort_timestamp: 0,
            content: NoteContent::default(),
            venue_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_invitations<I, S>(mut self, invitations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.invitations = invitations.into_iter().map(Into::into).collect();
        self.reclassify();
        self
    }

    pub fn with_signatures<I, S>(mut self, signatures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signatures = signatures.into_iter().map(Into::into).collect();
        self.reclassify();
        self
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self.sort_timestamp = timestamp;
        self
    }

    pub fn with_content(mut self, content: NoteContent) -> Self {
        self.content = content;
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.content = NoteContent::default();
        self.content.insert(COMMENT_FIELD, Value::String(comment.into()));
        self
    }

    fn reclassify(&mut self) {
        let (actor_role, kind) = classify::classify(&self.invitations, &self.signatures);
        self.actor_role = actor_role;
        self.kind = kind;
    }

    pub fn has_invitation_marker(&self, marker: &str) -> bool {
        self.invitations.iter().any(|inv| inv.contains(marker))
    }

    pub fn is_author_response(&self) -> bool {
        self.signatures.iter().any(|sig| is_author_signature(sig))
    }

    /// Content must be exactly one `comment` field; any extra field, even a
    /// wrapped null, disqualifies the note.
    pub fn is_reviewer_followup(&self) -> bool {
        let Some(first) = self.signatures.first() else {
            return false;
        };
        first.contains("Reviewer_")
            && self.content.has_only(COMMENT_FIELD)
            && !self.has_invitation_marker(OFFICIAL_REVIEW)
            && self.parent_id.is_some()
    }

    pub fn comment_text(&self) -> Option<&str> {
        self.content.view(self.kind).comment()
    }
}

impl TryFrom<RawNote> for Note {
    type Error = DomainError;

    fn try_from(raw: RawNote) -> DomainResult<Self> {
        let timestamp = raw.timestamp();
        let sort_timestamp = raw.sort_timestamp();
        let id = raw
            .id
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| DomainError::Validation("note id is required".into()))?;
        let forum_id = raw
            .forum
            .filter(|forum| !forum.trim().is_empty())
            .unwrap_or_else(|| id.clone());

        let content = NoteContent::from_raw(raw.content.unwrap_or_default());
        let venue_id = content
            .text("venueid")
            .map(str::to_string)
            .or_else(|| raw.venueid.as_ref().and_then(venue_id_from_value));

        let mut note = Note::new(id, forum_id).with_timestamp(timestamp);
        note.sort_timestamp = sort_timestamp;
        note.parent_id = raw.replyto.filter(|parent| !parent.is_empty());
        note.invitations = raw.invitations.unwrap_or_default();
        note.signatures = raw.signatures.unwrap_or_default();
        note.content = content;
        note.venue_id = venue_id;
        note.reclassify();
        Ok(note)
    }
}

fn venue_id_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(wrapper) => wrapper
            .get("value")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

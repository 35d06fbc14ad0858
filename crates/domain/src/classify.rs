use crate::note::{ActorRole, NoteKind};

pub const OFFICIAL_REVIEW: &str = "Official_Review";
pub const META_REVIEW: &str = "Meta_Review";
pub const DECISION: &str = "Decision";
pub const DESK_REJECTION: &str = "Desk_Rejection";
pub const REBUTTAL: &str = "Rebuttal";
pub const OFFICIAL_COMMENT: &str = "Official_Comment";
pub const PUBLIC_COMMENT: &str = "Public_Comment";
pub const COMMENT: &str = "Comment";

pub const AUTHORS_SIGNATURE: &str = "Authors";
pub const AREA_CHAIR_SIGNATURE: &str = "Area_Chair";
pub const REVIEWER_SIGNATURE: &str = "Reviewer";

/// First match wins, so a review edit that also carries a comment invitation
/// stays a review.
pub fn classify(invitations: &[String], signatures: &[String]) -> (ActorRole, NoteKind) {
    let ends_with = |suffix: &str| invitations.iter().any(|inv| inv.ends_with(suffix));

    if ends_with(OFFICIAL_REVIEW) {
        return (ActorRole::Reviewer, NoteKind::Review);
    }
    if ends_with(META_REVIEW) {
        return (ActorRole::AreaChair, NoteKind::MetaReview);
    }
    if ends_with(DECISION) {
        return (ActorRole::ProgramChair, NoteKind::Decision);
    }
    if ends_with(DESK_REJECTION) {
        return (ActorRole::ProgramChair, NoteKind::DeskRejection);
    }
    if ends_with(REBUTTAL) {
        return (ActorRole::Author, NoteKind::Rebuttal);
    }
    if ends_with(OFFICIAL_COMMENT) || ends_with(PUBLIC_COMMENT) || ends_with(COMMENT) {
        return classify_comment(signatures, ends_with(PUBLIC_COMMENT));
    }

    (ActorRole::Other, NoteKind::Other)
}

fn classify_comment(signatures: &[String], public_invitation: bool) -> (ActorRole, NoteKind) {
    if signatures.iter().any(|sig| is_author_signature(sig)) {
        return (ActorRole::Author, NoteKind::AuthorComment);
    }
    if signatures.iter().any(|sig| is_area_chair_signature(sig)) {
        return (ActorRole::AreaChair, NoteKind::AcComment);
    }
    if signatures.iter().any(|sig| sig.contains(REVIEWER_SIGNATURE)) {
        return (ActorRole::Reviewer, NoteKind::ReviewerComment);
    }
    if public_invitation {
        return (ActorRole::Public, NoteKind::PublicComment);
    }
    (ActorRole::Other, NoteKind::Other)
}

pub fn is_author_signature(signature: &str) -> bool {
    signature.contains(AUTHORS_SIGNATURE)
}

fn is_area_chair_signature(signature: &str) -> bool {
    signature.contains(AREA_CHAIR_SIGNATURE) || signature.rsplit('/').next() == Some("AC")
}

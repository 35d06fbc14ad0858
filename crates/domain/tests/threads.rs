use std::collections::HashSet;

use forumchain_domain::chain::build_raw_chains;
use forumchain_domain::forum::Forum;
use forumchain_domain::merge::merge_turns;
use forumchain_domain::note::{Note, RawNote};
use forumchain_domain::structure::{build_conversations, structure_notes};
use serde_json::json;

const FORUM: &str = "paper1";
const REVIEW: &str = "ICLR.cc/2025/Conference/Submission7/-/Official_Review";
const COMMENT: &str = "ICLR.cc/2025/Conference/Submission7/-/Official_Comment";
const AUTHORS: &str = "ICLR.cc/2025/Conference/Submission7/Authors";
const REVIEWER_X: &str = "ICLR.cc/2025/Conference/Submission7/Reviewer_Xx01";
const REVIEWER_Y: &str = "ICLR.cc/2025/Conference/Submission7/Reviewer_Yy02";

fn review(id: &str, reviewer: &str, timestamp: i64) -> Note {
    Note::new(id, FORUM)
        .with_invitations([REVIEW])
        .with_signatures([reviewer])
        .with_timestamp(timestamp)
}

fn reply(id: &str, parent: &str, signer: &str, text: &str, timestamp: i64) -> Note {
    Note::new(id, FORUM)
        .with_parent(parent)
        .with_invitations([COMMENT])
        .with_signatures([signer])
        .with_comment(text)
        .with_timestamp(timestamp)
}

fn conversation_ids(forum: &Forum) -> Vec<Vec<String>> {
    build_conversations(forum)
        .into_iter()
        .map(|chain| chain.into_iter().map(|entry| entry.id).collect())
        .collect()
}

#[test]
fn author_fragments_collapse_into_one_turn() {
    let forum = Forum::new(
        FORUM,
        vec![
            review("R", REVIEWER_X, 100),
            reply("C1", "R", AUTHORS, "fix 1", 200),
            reply("C2", "C1", AUTHORS, "fix 2", 300),
        ],
    );

    let conversations = build_conversations(&forum);
    assert_eq!(conversations.len(), 1);
    let chain = &conversations[0];
    assert_eq!(chain.len(), 2);
    assert_eq!(chain[0].id, "R");

    let merged = &chain[1];
    assert_eq!(merged.id, "C1");
    assert_eq!(merged.content.text("comment"), Some("fix 1\n\nfix 2"));
    assert_eq!(merged.timestamp, 300);
    assert_eq!(merged.merged_from, vec!["C1", "C2"]);
}

#[test]
fn dangling_parent_becomes_its_own_chain() {
    let forum = Forum::new(
        FORUM,
        vec![
            review("R", REVIEWER_X, 100),
            reply("D", "missing", REVIEWER_Y, "orphaned", 150),
        ],
    );

    assert_eq!(
        conversation_ids(&forum),
        vec![vec!["R".to_string()], vec!["D".to_string()]]
    );
}

#[test]
fn followups_from_different_reviewers_stay_separate() {
    let forum = Forum::new(
        FORUM,
        vec![
            review("R", REVIEWER_X, 100),
            reply("F1", "R", REVIEWER_X, "one more question", 200),
            reply("F2", "R", REVIEWER_Y, "I agree", 300),
        ],
    );

    let conversations = build_conversations(&forum);
    assert_eq!(conversation_ids(&forum), vec![vec!["R", "F1", "F2"]]);
    assert!(conversations[0].iter().all(|entry| entry.merged_from.is_empty()));
}

#[test]
fn same_reviewer_followups_merge_under_their_anchor() {
    let forum = Forum::new(
        FORUM,
        vec![
            review("R", REVIEWER_X, 100),
            reply("A", "R", AUTHORS, "rebuttal", 200),
            reply("F1", "A", REVIEWER_X, "thanks", 300),
            reply("F2", "F1", REVIEWER_X, "raising my score", 400),
        ],
    );

    let conversations = build_conversations(&forum);
    let chain = &conversations[0];
    let ids: Vec<&str> = chain.iter().map(|entry| entry.id.as_str()).collect();
    assert_eq!(ids, vec!["R", "A", "F1"]);
    assert_eq!(chain[2].content.text("comment"), Some("thanks\n\nraising my score"));
}

#[test]
fn review_threads_lead_the_conversation_list() {
    let public = Note::new("PUB", FORUM)
        .with_parent(FORUM)
        .with_invitations(["ICLR.cc/2025/Conference/Submission7/-/Public_Comment"])
        .with_signatures(["~Jane_Doe1"])
        .with_comment("nice work")
        .with_timestamp(15);
    let forum = Forum::new(
        FORUM,
        vec![
            review("R1", REVIEWER_X, 10).with_parent(FORUM),
            public,
            reply("GEN", FORUM, AUTHORS, "general response", 20),
            review("R2", REVIEWER_Y, 30).with_parent(FORUM),
        ],
    );

    assert_eq!(
        conversation_ids(&forum),
        vec![vec!["R1"], vec!["R2"], vec!["PUB"], vec!["GEN"]]
    );
}

#[test]
fn cyclic_parents_terminate_and_emit_each_note_once() {
    let forum = Forum::new(
        FORUM,
        vec![
            reply("X", "Y", AUTHORS, "x", 100),
            reply("Y", "X", AUTHORS, "y", 200),
        ],
    );

    let chains = build_raw_chains(&forum);
    let ids: Vec<&str> = chains
        .chains
        .iter()
        .flatten()
        .map(|note| note.id.as_str())
        .collect();
    assert_eq!(ids, vec!["X", "Y"]);

    let conversations = build_conversations(&forum);
    let total: usize = conversations.iter().map(Vec::len).sum();
    assert_eq!(total, 2);
}

#[test]
fn every_note_lands_in_one_chain_or_is_unreachable() {
    let forum = Forum::new(
        FORUM,
        vec![
            Note::new(FORUM, FORUM),
            review("R1", REVIEWER_X, 10).with_parent(FORUM),
            review("R2", REVIEWER_Y, 20).with_parent(FORUM),
            reply("A1", "R1", AUTHORS, "a", 30),
            reply("A2", "R2", AUTHORS, "b", 40),
            reply("A3", "A1", AUTHORS, "c", 50),
            reply("O", "elsewhere", REVIEWER_Y, "d", 60),
            Note::new("M", FORUM)
                .with_parent(FORUM)
                .with_invitations(["ICLR.cc/2025/Conference/Submission7/-/Meta_Review"]),
        ],
    );

    let chains = build_raw_chains(&forum);
    let mut seen = HashSet::new();
    for note in chains.chains.iter().flatten() {
        assert!(seen.insert(note.id.clone()), "{} appears twice", note.id);
    }
    for note in chains.unreachable(&forum) {
        assert!(seen.insert(note.id.clone()), "{} is both placed and unreachable", note.id);
    }
    let all: HashSet<String> = forum.notes().iter().map(|note| note.id.clone()).collect();
    assert_eq!(seen, all);
}

#[test]
fn merging_twice_changes_nothing() {
    let forum = Forum::new(
        FORUM,
        vec![
            review("R", REVIEWER_X, 100),
            reply("A1", "R", AUTHORS, "one", 200),
            reply("A2", "A1", AUTHORS, "two", 300),
            reply("F1", "A2", REVIEWER_X, "ok", 400),
            reply("F2", "F1", REVIEWER_X, "fine", 500),
        ],
    );

    let chains = build_raw_chains(&forum);
    let first = merge_turns(&chains.chains[0]);
    assert!(first.iter().any(|turn| turn.is_merged()));

    let merged_notes: Vec<Note> = first.iter().map(|turn| turn.note.clone()).collect();
    let refs: Vec<&Note> = merged_notes.iter().collect();
    let second = merge_turns(&refs);

    assert!(second.iter().all(|turn| !turn.is_merged()));
    let before: Vec<&Note> = first.iter().map(|turn| &turn.note).collect();
    let after: Vec<&Note> = second.iter().map(|turn| &turn.note).collect();
    assert_eq!(before, after);
}

#[test]
fn raw_dump_round_trips_into_structured_records() {
    let raw = json!([
        {
            "id": FORUM, "forum": FORUM,
            "invitations": ["ICLR.cc/2025/Conference/-/Submission"],
            "signatures": ["ICLR.cc/2025/Conference/Submission7/Authors"],
            "cdate": 1, "content": {
                "title": {"value": "Threads"},
                "venueid": {"value": "ICLR.cc/2025/Conference/Rejected_Submission"}
            }
        },
        {
            "id": "R", "forum": FORUM, "replyto": FORUM,
            "invitations": [REVIEW], "signatures": [REVIEWER_X],
            "cdate": 1_730_000_000_000_i64,
            "content": {"summary": {"value": "ok"}, "rating": {"value": 5}}
        },
        {
            "id": "C1", "forum": FORUM, "replyto": "R",
            "invitations": [COMMENT], "signatures": [AUTHORS],
            "cdate": 1_730_000_100_000_i64, "content": {"comment": {"value": "fix 1"}}
        },
        {
            "id": "C2", "forum": FORUM, "replyto": "C1",
            "invitations": [COMMENT], "signatures": [AUTHORS],
            "cdate": 1_730_000_200_000_i64, "content": {"comment": {"value": "fix 2"}}
        }
    ]);
    let raw: Vec<RawNote> = serde_json::from_value(raw).expect("raw notes");
    let notes: Vec<Note> = raw
        .into_iter()
        .map(|raw| Note::try_from(raw).expect("note"))
        .collect();

    let (records, summary) = structure_notes(notes, "ICLR.cc/2025/Conference");
    assert_eq!(summary.forums_emitted, 1);
    assert_eq!(summary.merged_turns, 1);

    let encoded = serde_json::to_value(&records).expect("encode");
    let record = &encoded[FORUM];
    assert_eq!(record["paper_info"]["title"], json!("Threads"));
    assert_eq!(record["result"]["state"], json!("reject"));
    assert_eq!(record["conversations"][0][0]["id"], json!("R"));
    assert_eq!(
        record["conversations"][0][1]["content"]["comment"]["value"],
        json!("fix 1\n\nfix 2")
    );
    assert_eq!(record["conversations"][0][1]["merged_from"], json!(["C1", "C2"]));
}

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use forumchain_domain::forum::Forum;
use forumchain_domain::structure::{ConversionSummary, ForumRecord, structure_forum};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::debug;

use crate::observability;

struct ForumOutcome {
    forum_id: String,
    record: Option<ForumRecord>,
}

fn process_forum(forum: Forum, venue_id: &str) -> ForumOutcome {
    let started = Instant::now();
    let record = structure_forum(&forum, venue_id);
    let duration_ms = started.elapsed().as_secs_f64() * 1000.0;

    let (conversations, merged_turns) = record
        .as_ref()
        .map(|record| (record.conversations.len(), record.merged_turns()))
        .unwrap_or_default();
    debug!(
        forum_id = %forum.forum_id(),
        notes = forum.len(),
        conversations,
        merged_turns,
        duration_ms,
        "structured forum"
    );
    observability::register_forum_processed(record.is_some(), duration_ms);
    observability::register_forum_output(conversations, merged_turns);

    ForumOutcome {
        forum_id: forum.forum_id().to_string(),
        record,
    }
}

pub async fn structure_forums(
    forums: Vec<Forum>,
    venue_id: &str,
    concurrency: usize,
) -> Result<(BTreeMap<String, ForumRecord>, ConversionSummary)> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let venue_id: Arc<str> = Arc::from(venue_id);
    let mut tasks = JoinSet::new();

    for forum in forums {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .context("forum semaphore closed")?;
        let venue_id = Arc::clone(&venue_id);
        tasks.spawn_blocking(move || {
            let _permit = permit;
            process_forum(forum, &venue_id)
        });
    }

    let mut records = BTreeMap::new();
    let mut summary = ConversionSummary::default();
    while let Some(joined) = tasks.join_next().await {
        let outcome = joined.context("forum task failed")?;
        summary.record(outcome.record.as_ref());
        if let Some(record) = outcome.record {
            records.insert(outcome.forum_id, record);
        }
    }

    Ok((records, summary))
}

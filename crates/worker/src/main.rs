mod observability;
mod pipeline;

use std::path::Path;

use forumchain_domain::forum::group_into_forums;
use forumchain_infra::{config::AppConfig, ingest, logging::init_tracing};
use tracing::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config)?;

    if config.metrics_enabled {
        observability::init_metrics()?;
    }

    info!(
        input = %config.input_path,
        output = %config.output_path,
        venue_id = %config.venue_id,
        concurrency = config.worker_concurrency(),
        "worker starting"
    );

    let notes = ingest::load_notes(Path::new(&config.input_path))?;
    let forums = group_into_forums(notes);
    let (records, summary) =
        pipeline::structure_forums(forums, &config.venue_id, config.worker_concurrency()).await?;

    ingest::write_records(Path::new(&config.output_path), &records)?;

    if let Some(snapshot) = observability::render_metrics() {
        debug!(metrics = %snapshot, "metrics snapshot");
    }
    info!(
        forums_seen = summary.forums_seen,
        forums_emitted = summary.forums_emitted,
        conversations = summary.conversations,
        merged_turns = summary.merged_turns,
        "worker finished"
    );

    Ok(())
}

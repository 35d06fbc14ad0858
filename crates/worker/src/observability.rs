use std::sync::OnceLock;

use anyhow::Result;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

const FORUMS_PROCESSED_TOTAL: &str = "forumchain_worker_forums_processed_total";
const FORUM_DURATION_MS: &str = "forumchain_worker_forum_duration_ms";
const CONVERSATIONS_TOTAL: &str = "forumchain_worker_conversations_total";
const MERGED_TURNS_TOTAL: &str = "forumchain_worker_merged_turns_total";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_metrics() -> Result<()> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    let _ = METRICS_HANDLE.set(handle);
    Ok(())
}

pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

pub fn register_forum_processed(emitted: bool, duration_ms: f64) {
    let result = if emitted { "emitted" } else { "empty" };
    counter!(FORUMS_PROCESSED_TOTAL, "result" => result).increment(1);
    histogram!(FORUM_DURATION_MS, "result" => result).record(duration_ms.max(0.0));
}

pub fn register_forum_output(conversations: usize, merged_turns: usize) {
    counter!(CONVERSATIONS_TOTAL).increment(conversations as u64);
    counter!(MERGED_TURNS_TOTAL).increment(merged_turns as u64);
}

use std::path::Path;
use tracing::info;

use crate::assembler::{attach_clips, build_match_record};
use crate::clips::{discover_clips, remove_clips};
use crate::config::SummaryConfig;
use crate::document_store::DocumentStore;
use crate::error::Result;
use crate::local_stats::read_local_stats;
use crate::replay_decoder::ReplayDecoder;
use crate::storage::ObjectStore;
use crate::types::MatchRecord;
use crate::upload::persist_match;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub match_id: u64,
    pub goals: usize,
    pub clips_uploaded: usize,
}

/// Decodes the replay and merges it with the plugin's stats file. Touches nothing remote.
pub async fn assemble(
    config: &SummaryConfig,
    replay: &Path,
    decoder: &dyn ReplayDecoder,
) -> Result<MatchRecord> {
    let properties = decoder.decode(replay).await?;
    let stats = read_local_stats(&config.paths.last_match_stats).await?;
    build_match_record(&properties, stats)
}

/// Processes the last match end to end: assemble, upload clips, persist, then
/// remove the local clips that were uploaded.
///
/// Local clips are only deleted after every document write has succeeded.
pub async fn run(
    config: &SummaryConfig,
    replay: &Path,
    decoder: &dyn ReplayDecoder,
    objects: &dyn ObjectStore,
    documents: &dyn DocumentStore,
) -> Result<RunSummary> {
    let mut record = assemble(config, replay, decoder).await?;

    let local_goals = record.local_goal_count(&config.local_player_name);
    let clips = if local_goals > 0 {
        discover_clips(&config.paths.clips_dir, &config.paths.clip_extension).await?
    } else {
        Vec::new()
    };

    let consumed = attach_clips(&mut record, &config.local_player_name, &clips, objects).await?;
    persist_match(&record, documents).await?;
    remove_clips(&consumed).await?;

    let summary = RunSummary {
        match_id: record.start_epoch,
        goals: record.goals.len(),
        clips_uploaded: consumed.len(),
    };
    info!(
        "Match {} done: {} goals, {} clips uploaded",
        summary.match_id, summary.goals, summary.clips_uploaded
    );
    Ok(summary)
}

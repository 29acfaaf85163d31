use std::path::Path;
use tokio::fs;
use tracing::info;

use crate::error::Result;
use crate::types::LocalStatsRecord;

/// Loads the stats file the game plugin leaves behind after each match.
pub async fn read_local_stats(path: &Path) -> Result<LocalStatsRecord> {
    let content = fs::read(path).await?;
    let stats: LocalStatsRecord = serde_json::from_slice(&content)?;
    info!(
        path = %path.display(),
        playlist = stats.playlist,
        goals = stats.goals.len(),
        mmr_before = stats.mmr_before,
        mmr_after = stats.mmr_after,
        "Loaded local match stats"
    );
    Ok(stats)
}

use serde_json::json;
use tracing::info;

use crate::document_store::DocumentStore;
use crate::error::Result;
use crate::types::{LatestPlaylistStats, MatchRecord};

pub const MATCHES: &str = "matches";
pub const MATCH_DATES: &str = "match_dates";
pub const LATEST_STATS_BY_PLAYLIST: &str = "latest_stats_by_playlist";

/// Writes the match record and the pointer documents derived from it.
///
/// The writes are independent; a failure part way through leaves the earlier ones in place.
pub async fn persist_match(record: &MatchRecord, store: &dyn DocumentStore) -> Result<()> {
    let match_id = record.match_id();

    store
        .set_document(MATCHES, &match_id, &serde_json::to_value(record)?)
        .await?;

    store
        .set_document(MATCH_DATES, &record.start_date, &json!({}))
        .await?;

    let latest = LatestPlaylistStats::from(record);
    store
        .set_document(
            LATEST_STATS_BY_PLAYLIST,
            &record.playlist.to_string(),
            &serde_json::to_value(&latest)?,
        )
        .await?;

    info!(
        "Persisted match {} (date {}, playlist {})",
        match_id, record.start_date, record.playlist
    );
    Ok(())
}

pub async fn load_match(store: &dyn DocumentStore, match_id: &str) -> Result<Option<MatchRecord>> {
    match store.get_document(MATCHES, match_id).await? {
        Some(value) => Ok(Some(serde_json::from_value::<MatchRecord>(value)?)),
        None => Ok(None),
    }
}

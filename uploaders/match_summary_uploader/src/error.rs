use std::path::PathBuf;

// Error type shared by every stage of the summary pipeline
#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Could not start replay parser {path:?}: {source}")]
    ParserLaunch {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Replay parser exited with {status}: {stderr}")]
    ParserFailed { status: String, stderr: String },
    #[error("Replay has {decoded} goals but the stats file has {local}")]
    GoalCountMismatch { decoded: usize, local: usize },
    #[error("Goal {index} is team {decoded} in the replay but team {local} in the stats file")]
    GoalOrderMismatch {
        index: usize,
        decoded: i64,
        local: i64,
    },
    #[error("Replay goal {index} has no scorer name")]
    EmptyScorer { index: usize },
    #[error("Local player scored {local_goals} goals but {clips} clip files were found")]
    ClipCountMismatch { local_goals: usize, clips: usize },
    #[error("Malformed match date: {0:?}")]
    MalformedDate(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SummaryError>;

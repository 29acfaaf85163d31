use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{Result, SummaryError};
use crate::types::{DecodedReplay, MatchProperties};

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Turns a replay file into the match properties it records.
#[async_trait]
pub trait ReplayDecoder: Send + Sync {
    async fn decode(&self, replay: &Path) -> Result<MatchProperties>;
}

/// Runs the external replay parser with the replay path as its only argument
/// and reads the JSON document it prints on stdout.
pub struct ExternalParser {
    executable: PathBuf,
}

impl ExternalParser {
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
        }
    }
}

#[async_trait]
impl ReplayDecoder for ExternalParser {
    async fn decode(&self, replay: &Path) -> Result<MatchProperties> {
        debug!(parser = %self.executable.display(), replay = %replay.display(), "Running replay parser");

        let mut command = Command::new(&self.executable);
        command.arg(replay);
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let output = command
            .output()
            .await
            .map_err(|source| SummaryError::ParserLaunch {
                path: self.executable.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(SummaryError::ParserFailed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let properties = parse_decoder_output(&output.stdout)?;
        info!(
            epoch = properties.match_start_epoch,
            goals = properties.goals.len(),
            players = properties.player_stats.len(),
            "Decoded replay"
        );
        Ok(properties)
    }
}

pub fn parse_decoder_output(stdout: &[u8]) -> Result<MatchProperties> {
    let replay: DecodedReplay = serde_json::from_slice(stdout)?;
    Ok(replay.properties)
}

use aws_sdk_s3::config::{Builder as S3ConfigBuilder, Credentials, Region, SharedCredentialsProvider};
use aws_sdk_s3::Client as S3Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Result, SummaryError};

pub const DEFAULT_LOCAL_PLAYER: &str = "BrickBoned";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PathsConfig {
    pub root: PathBuf,
    pub parser: PathBuf,
    pub replay: PathBuf,
    pub last_match_stats: PathBuf,
    pub clips_dir: PathBuf,
    pub clip_extension: String,
}

impl PathsConfig {
    /// Lays out the default file names under a single root directory.
    pub fn under(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            root: root.to_path_buf(),
            parser: root.join("parser").join("RocketLeagueReplayParser.exe"),
            replay: root.join("last-match-replay.replay"),
            last_match_stats: root.join("last-match-stats.json"),
            clips_dir: root.join("clips"),
            clip_extension: "mp4".to_string(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self::under(".")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket_name: Option<String>,
    pub key_id: Option<SecretString>,
    pub application_key: Option<SecretString>,
    // When set, clip locators are public URLs instead of bare object keys
    pub public_base_url: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://s3.us-west-004.backblazeb2.com".to_string(),
            region: "us-west-004".to_string(),
            bucket_name: None,
            key_id: None,
            application_key: None,
            public_base_url: None,
        }
    }
}

impl StorageConfig {
    pub fn bucket(&self) -> Result<&str> {
        self.bucket_name
            .as_deref()
            .ok_or_else(|| SummaryError::Config("B2_BUCKET_NAME must be set".to_string()))
    }

    pub fn create_s3_client(&self) -> Result<S3Client> {
        let (Some(key_id), Some(application_key)) = (&self.key_id, &self.application_key) else {
            return Err(SummaryError::Config(
                "B2_KEY_ID and B2_APPLICATION_KEY must be set".to_string(),
            ));
        };

        let creds = Credentials::new(
            key_id.expose_secret(),
            application_key.expose_secret(),
            None,
            None,
            "statpuller-b2",
        );

        let config = S3ConfigBuilder::new()
            .endpoint_url(&self.endpoint)
            .credentials_provider(SharedCredentialsProvider::new(creds))
            .region(Region::new(self.region.clone()))
            .behavior_version_latest()
            .build();

        Ok(S3Client::from_conf(config))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryConfig {
    pub paths: PathsConfig,
    pub storage: StorageConfig,
    pub database_url: Option<SecretString>,
    pub local_player_name: String,
}

impl SummaryConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(root) = env::var("STATPULLER_ROOT") {
            config.paths = PathsConfig::under(root);
        }
        if let Ok(parser) = env::var("PARSER_PATH") {
            config.paths.parser = PathBuf::from(parser);
        }
        if let Ok(replay) = env::var("REPLAY_PATH") {
            config.paths.replay = PathBuf::from(replay);
        }
        if let Ok(stats) = env::var("LAST_MATCH_STATS_PATH") {
            config.paths.last_match_stats = PathBuf::from(stats);
        }
        if let Ok(clips) = env::var("CLIPS_DIR") {
            config.paths.clips_dir = PathBuf::from(clips);
        }
        if let Ok(ext) = env::var("CLIP_EXTENSION") {
            config.paths.clip_extension = ext.trim_start_matches('.').to_string();
        }
        if let Ok(name) = env::var("LOCAL_PLAYER_NAME") {
            config.local_player_name = name;
        }

        if let Ok(endpoint) = env::var("B2_ENDPOINT") {
            config.storage.endpoint = endpoint;
        }
        if let Ok(region) = env::var("B2_REGION") {
            config.storage.region = region;
        }
        config.storage.bucket_name = env::var("B2_BUCKET_NAME").ok();
        config.storage.key_id = env::var("B2_KEY_ID").ok().map(SecretString::from);
        config.storage.application_key = env::var("B2_APPLICATION_KEY").ok().map(SecretString::from);
        config.storage.public_base_url = env::var("CLIP_PUBLIC_BASE_URL")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string());

        config.database_url = env::var("DATABASE_URL").ok().map(SecretString::from);

        config
    }

    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_ref()
            .map(|url| url.expose_secret())
            .ok_or_else(|| SummaryError::Config("DATABASE_URL must be set".to_string()))
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            storage: StorageConfig::default(),
            database_url: None,
            local_player_name: DEFAULT_LOCAL_PLAYER.to_string(),
        }
    }
}

use async_trait::async_trait;
use aws_sdk_s3::{primitives::ByteStream, Client as S3Client};
use sha2::{Digest, Sha256};
use std::path::Path;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{error, info};

use crate::config::StorageConfig;
use crate::error::{Result, SummaryError};

/// Object storage for goal clips.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Streams a local file to `key` and returns the locator to record on the goal.
    async fn upload_file(&self, local: &Path, key: &str) -> Result<String>;
}

/// Any S3-compatible bucket (Backblaze B2 in practice).
#[derive(Clone, Debug)]
pub struct S3ObjectStore {
    client: S3Client,
    bucket_name: String,
    public_base_url: Option<String>,
}

impl S3ObjectStore {
    pub fn new(settings: &StorageConfig) -> Result<Self> {
        Ok(Self {
            client: settings.create_s3_client()?,
            bucket_name: settings.bucket()?.to_string(),
            public_base_url: settings.public_base_url.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload_file(&self, local: &Path, key: &str) -> Result<String> {
        let digest = file_sha256(local).await?;
        let body = ByteStream::from_path(local)
            .await
            .map_err(|e| SummaryError::Storage(format!("Cannot stream {:?}: {}", local, e)))?;

        info!("Uploading clip {:?} to {}/{}", local, self.bucket_name, key);

        match self
            .client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .body(body)
            .content_type(content_type_for(local))
            .metadata("sha256", &digest)
            .metadata("uploaded_at", chrono::Utc::now().to_rfc3339())
            .send()
            .await
        {
            Ok(_) => {
                info!("Clip uploaded: {}", key);
                Ok(clip_locator(self.public_base_url.as_deref(), key))
            }
            Err(e) => {
                error!("Failed to upload clip {}: {}", key, e);
                Err(SummaryError::Storage(e.to_string()))
            }
        }
    }
}

/// Object key for the `number`th (1-based) goal the local player scored in a match.
pub fn clip_key(match_id: &str, number: usize, extension: &str) -> String {
    format!("{}/goal_{}.{}", match_id, number, extension)
}

pub fn clip_locator(public_base_url: Option<&str>, key: &str) -> String {
    match public_base_url {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
        None => key.to_string(),
    }
}

fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    match ext.as_str() {
        "mp4" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        _ => "application/octet-stream",
    }
}

pub async fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let read = file.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

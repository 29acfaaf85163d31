use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::error::Result;

/// A recorded goal clip waiting in the local clips directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipFile {
    pub path: PathBuf,
}

impl ClipFile {
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or_default()
    }
}

/// Lists clip files with the given extension, sorted by file name.
///
/// The recorder names clips by capture time, so this order is taken to be the
/// order in which the local player's goals happened.
pub async fn discover_clips(dir: &Path, extension: &str) -> Result<Vec<ClipFile>> {
    let mut clips = Vec::new();
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            debug!("Found clip file: {:?}", path);
            clips.push(ClipFile { path });
        }
    }
    clips.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(clips)
}

/// Deletes clip files whose upload has been recorded.
pub async fn remove_clips(clips: &[ClipFile]) -> Result<()> {
    for clip in clips {
        fs::remove_file(&clip.path).await?;
        debug!("Removed local clip {:?}", clip.path);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_discover_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["clip02.mp4", "clip01.mp4", "notes.txt", "clip03.MP4"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.mp4")).unwrap();

        let clips = discover_clips(dir.path(), "mp4").await.unwrap();
        let names: Vec<_> = clips.iter().map(ClipFile::file_name).collect();
        assert_eq!(names, vec!["clip01.mp4", "clip02.mp4", "clip03.MP4"]);
    }

    #[tokio::test]
    async fn test_missing_dir_is_error() {
        let dir = TempDir::new().unwrap();
        assert!(discover_clips(&dir.path().join("clips"), "mp4").await.is_err());
    }

    #[tokio::test]
    async fn test_remove_clips() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("clip01.mp4"), b"x").unwrap();
        let clips = discover_clips(dir.path(), "mp4").await.unwrap();
        remove_clips(&clips).await.unwrap();
        assert!(!dir.path().join("clip01.mp4").exists());
    }
}

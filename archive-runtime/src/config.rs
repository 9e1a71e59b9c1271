//! Run configuration.
//!
//! One `ArchiveConfig` describes one invocation: which channel to archive,
//! where, and which phases of the pipeline are enabled. The builder
//! validates fail-fast with actionable messages; callers (a CLI, a test)
//! construct it once and pass it by reference.

use crate::error::{Result, RuntimeError};
use std::path::{Path, PathBuf};

/// Default cap on how many remote track records are fetched per run.
pub const DEFAULT_TRACK_LIMIT: u32 = 4000;

/// Default bound on concurrently running downloads. The external downloader
/// is network- and CPU-heavy; unbounded parallelism degrades both ends.
pub const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for one archive run.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    /// Slug of the remote channel to archive.
    pub slug: String,
    /// Directory under which the per-channel folder is created.
    pub base_dir: PathBuf,
    /// Cap on remote track records fetched per run.
    pub limit: u32,
    /// Bound on concurrently running downloads.
    pub max_concurrent: usize,
    /// Mirror new remote tracks into the local store.
    pub pull: bool,
    /// Download missing media after reconciling.
    pub download: bool,
    /// Also attempt tracks whose previous download failed.
    pub retry_failed: bool,
    /// Re-download even when a destination file already exists.
    pub force: bool,
    /// Run the explicit duplicate-file cleanup.
    pub delete_duplicates: bool,
}

impl ArchiveConfig {
    pub fn builder() -> ArchiveConfigBuilder {
        ArchiveConfigBuilder::default()
    }

    /// `<base>/<slug>`: everything for one channel lives under here.
    pub fn channel_dir(&self) -> PathBuf {
        self.base_dir.join(&self.slug)
    }

    /// `<base>/<slug>/<slug>.sqlite`: the local track store.
    pub fn database_path(&self) -> PathBuf {
        self.channel_dir().join(format!("{}.sqlite", self.slug))
    }

    /// `<base>/<slug>/<slug>.json`: the per-run backup snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        self.channel_dir().join(format!("{}.json", self.slug))
    }

    /// `<base>/<slug>/tracks`: downloaded media files.
    pub fn tracks_dir(&self) -> PathBuf {
        self.channel_dir().join("tracks")
    }
}

/// Builder for [`ArchiveConfig`] with fail-fast validation.
#[derive(Debug, Clone, Default)]
pub struct ArchiveConfigBuilder {
    slug: Option<String>,
    base_dir: Option<PathBuf>,
    limit: Option<u32>,
    max_concurrent: Option<usize>,
    pull: bool,
    download: bool,
    retry_failed: bool,
    force: bool,
    delete_duplicates: bool,
}

impl ArchiveConfigBuilder {
    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }

    pub fn base_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.base_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn max_concurrent(mut self, max: usize) -> Self {
        self.max_concurrent = Some(max);
        self
    }

    pub fn pull(mut self, enabled: bool) -> Self {
        self.pull = enabled;
        self
    }

    pub fn download(mut self, enabled: bool) -> Self {
        self.download = enabled;
        self
    }

    pub fn retry_failed(mut self, enabled: bool) -> Self {
        self.retry_failed = enabled;
        self
    }

    pub fn force(mut self, enabled: bool) -> Self {
        self.force = enabled;
        self
    }

    pub fn delete_duplicates(mut self, enabled: bool) -> Self {
        self.delete_duplicates = enabled;
        self
    }

    pub fn build(self) -> Result<ArchiveConfig> {
        let slug = self
            .slug
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                RuntimeError::Config(
                    "a channel slug is required to select the channel to archive".to_string(),
                )
            })?;
        let base_dir = self.base_dir.ok_or_else(|| {
            RuntimeError::Config(
                "a base directory is required to decide where the archive is stored".to_string(),
            )
        })?;

        let max_concurrent = self.max_concurrent.unwrap_or(DEFAULT_MAX_CONCURRENT);
        if max_concurrent == 0 {
            return Err(RuntimeError::Config(
                "max_concurrent must be at least 1".to_string(),
            ));
        }

        Ok(ArchiveConfig {
            slug,
            base_dir,
            limit: self.limit.unwrap_or(DEFAULT_TRACK_LIMIT),
            max_concurrent,
            pull: self.pull,
            download: self.download,
            retry_failed: self.retry_failed,
            force: self.force,
            delete_duplicates: self.delete_duplicates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_with_defaults() {
        let config = ArchiveConfig::builder()
            .slug("good-time-radio")
            .base_dir("/tmp/archives")
            .build()
            .unwrap();

        assert_eq!(config.limit, DEFAULT_TRACK_LIMIT);
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert!(!config.pull);
        assert!(!config.download);
        assert!(!config.retry_failed);
        assert!(!config.force);
        assert!(!config.delete_duplicates);
    }

    #[test]
    fn derives_channel_paths() {
        let config = ArchiveConfig::builder()
            .slug("oskar")
            .base_dir("/data")
            .build()
            .unwrap();

        assert_eq!(config.channel_dir(), PathBuf::from("/data/oskar"));
        assert_eq!(config.database_path(), PathBuf::from("/data/oskar/oskar.sqlite"));
        assert_eq!(config.snapshot_path(), PathBuf::from("/data/oskar/oskar.json"));
        assert_eq!(config.tracks_dir(), PathBuf::from("/data/oskar/tracks"));
    }

    #[test]
    fn missing_slug_is_an_error() {
        let err = ArchiveConfig::builder().base_dir("/data").build().unwrap_err();
        assert!(err.to_string().contains("slug"));
    }

    #[test]
    fn blank_slug_is_an_error() {
        assert!(ArchiveConfig::builder()
            .slug("  ")
            .base_dir("/data")
            .build()
            .is_err());
    }

    #[test]
    fn missing_base_dir_is_an_error() {
        let err = ArchiveConfig::builder().slug("oskar").build().unwrap_err();
        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn zero_concurrency_is_an_error() {
        assert!(ArchiveConfig::builder()
            .slug("oskar")
            .base_dir("/data")
            .max_concurrent(0)
            .build()
            .is_err());
    }
}

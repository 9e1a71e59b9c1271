//! The external downloader behind a trait seam.
//!
//! Media fetching is delegated to `yt-dlp` as a subprocess. The
//! [`TrackDownloader`] trait keeps the orchestrator and coordinator testable
//! without spawning anything.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Bytes of stderr kept when reporting a failed download.
const STDERR_TAIL_LEN: usize = 2000;

/// A single track's download failed.
///
/// Opaque by design: the orchestrator persists the message as the track's
/// `last_error` and moves on, whatever the underlying cause.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct DownloadError {
    pub message: String,
}

impl DownloadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Fetches one track's media to a destination path.
#[async_trait]
pub trait TrackDownloader: Send + Sync {
    /// Download `url` to `destination`, embedding `metadata_comment` in the
    /// produced file's tags. Must be idempotent: an already-present
    /// destination is success, not an error.
    async fn download(
        &self,
        url: &str,
        destination: &Path,
        metadata_comment: &str,
    ) -> Result<(), DownloadError>;
}

/// The production downloader: shells out to `yt-dlp`.
pub struct YtDlpDownloader {
    program: String,
    force: bool,
}

impl YtDlpDownloader {
    pub fn new() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            force: false,
        }
    }

    /// Re-download even when the destination file already exists.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Override the executable name or path.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrackDownloader for YtDlpDownloader {
    async fn download(
        &self,
        url: &str,
        destination: &Path,
        metadata_comment: &str,
    ) -> Result<(), DownloadError> {
        if !self.force && destination.exists() {
            debug!(destination = %destination.display(), "File already exists, skipping download");
            return Ok(());
        }

        let output = Command::new(&self.program)
            .arg("-f")
            .arg("bestaudio[ext=m4a]")
            .arg("--no-playlist")
            .arg("--restrict-filenames")
            .arg("--output")
            .arg(destination)
            .arg("--parse-metadata")
            .arg(format!("{metadata_comment}:%(meta_comment)s"))
            .arg("--embed-metadata")
            .arg("--quiet")
            .arg("--progress")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DownloadError::new(format!("failed to spawn {}: {e}", self.program)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(DownloadError::new(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                tail(stderr.trim(), STDERR_TAIL_LEN)
            )))
        }
    }
}

/// Last `max_len` bytes of `text`, cut on a char boundary.
fn tail(text: &str, max_len: usize) -> &str {
    if text.len() <= max_len {
        return text;
    }
    let mut start = text.len() - max_len;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    &text[start..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn existing_destination_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("already [here].m4a");
        std::fs::write(&dest, b"media").unwrap();

        // Program that cannot exist; success proves we never spawned it.
        let downloader = YtDlpDownloader::new().with_program("/nonexistent/yt-dlp");
        downloader
            .download("https://example.com/x", &dest, "comment")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn missing_program_is_a_download_error() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("new [file].m4a");

        let downloader = YtDlpDownloader::new().with_program("/nonexistent/yt-dlp");
        let err = downloader
            .download("https://example.com/x", &dest, "comment")
            .await
            .unwrap_err();
        assert!(err.message.contains("failed to spawn"));
    }

    #[tokio::test]
    async fn force_ignores_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("already [here].m4a");
        std::fs::write(&dest, b"media").unwrap();

        let downloader = YtDlpDownloader::new()
            .with_program("/nonexistent/yt-dlp")
            .with_force(true);
        // With force set the existing file no longer short-circuits, so the
        // spawn is attempted and fails.
        assert!(downloader
            .download("https://example.com/x", &dest, "comment")
            .await
            .is_err());
    }

    #[test]
    fn tail_keeps_the_end_of_long_output() {
        let text = format!("{}END", "x".repeat(5000));
        let t = tail(&text, 100);
        assert_eq!(t.len(), 100);
        assert!(t.ends_with("END"));
    }

    #[test]
    fn tail_respects_char_boundaries() {
        let text = "é".repeat(100);
        let t = tail(&text, 3);
        assert!(t.len() <= 3);
        assert!(t.chars().all(|c| c == 'é'));
    }
}

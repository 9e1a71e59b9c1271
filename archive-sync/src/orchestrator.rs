//! Bounded-concurrency execution of the download set.
//!
//! Each track runs as its own task under a semaphore. A failure is a
//! per-track outcome, persisted and counted, never an abort: one broken
//! upstream video must not stall the other nine hundred.

use crate::downloader::TrackDownloader;
use crate::probe;
use archive_model::Track;
use archive_store::TrackStore;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// Outcome counts for one download phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Drives the download set to completion with at most `max_concurrent`
/// in-flight downloads, recording each outcome in the store as it lands.
pub struct DownloadOrchestrator {
    store: Arc<dyn TrackStore>,
    downloader: Arc<dyn TrackDownloader>,
    max_concurrent: usize,
}

impl DownloadOrchestrator {
    pub fn new(
        store: Arc<dyn TrackStore>,
        downloader: Arc<dyn TrackDownloader>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            store,
            downloader,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Download every track in `tracks` into `tracks_dir`.
    ///
    /// Outcomes are persisted immediately per track (file path on success,
    /// error message on failure), so an interrupted run loses at most the
    /// downloads still in flight.
    pub async fn run(&self, tracks: Vec<Track>, tracks_dir: &Path) -> RunSummary {
        if tracks.is_empty() {
            return RunSummary::default();
        }

        info!(
            total = tracks.len(),
            max_concurrent = self.max_concurrent,
            "Starting downloads"
        );

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut handles = Vec::with_capacity(tracks.len());

        for track in tracks {
            let permit = semaphore.clone().acquire_owned().await.unwrap();
            let store = Arc::clone(&self.store);
            let downloader = Arc::clone(&self.downloader);
            let target = probe::target_filename(&track, tracks_dir);

            handles.push(tokio::spawn(async move {
                let _permit = permit;
                let comment = track.description.as_deref().unwrap_or(&track.url);

                match downloader.download(&track.url, &target, comment).await {
                    Ok(()) => {
                        info!(track_id = %track.id, title = %track.title, "Downloaded track");
                        match store.mark_downloaded(&track.id, &target).await {
                            Ok(()) => true,
                            Err(e) => {
                                error!(track_id = %track.id, error = %e, "Failed to record download");
                                false
                            }
                        }
                    }
                    Err(e) => {
                        warn!(track_id = %track.id, title = %track.title, error = %e, "Download failed");
                        let message = format!("Error downloading track: {e}");
                        if let Err(store_err) = store.mark_failed(&track.id, &message).await {
                            error!(track_id = %track.id, error = %store_err, "Failed to record download error");
                        }
                        false
                    }
                }
            }));
        }

        let mut summary = RunSummary::default();
        for handle in handles {
            match handle.await {
                Ok(true) => summary.succeeded += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    error!(error = %e, "Download task panicked");
                    summary.failed += 1;
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Downloads finished"
        );
        summary
    }
}

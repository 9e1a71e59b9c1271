//! End-to-end run coordination.
//!
//! One coordinator run executes the full pipeline for one channel: fetch
//! remote state, snapshot it, reconcile against store and disk, mirror new
//! tracks, optionally clean up duplicates, and download what is missing.
//! Every phase after the remote fetch degrades per item rather than
//! aborting, so a run over a half-archived channel always makes progress.

use crate::dedupe::{self, DedupeOutcome};
use crate::downloader::TrackDownloader;
use crate::error::Result;
use crate::orchestrator::{DownloadOrchestrator, RunSummary};
use crate::plan::{plan, PlanOptions, RunPlan};
use crate::probe;
use archive_remote::{write_snapshot, BackupSnapshot, ChannelApi};
use archive_runtime::ArchiveConfig;
use archive_store::TrackStore;
use std::sync::Arc;
use tracing::{info, warn};

/// What one run observed and did.
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    pub channel_name: String,
    pub remote_tracks: usize,
    pub local_tracks: usize,
    pub skipped_remote: usize,
    pub skipped_local: usize,
    /// Tracks mirrored into the store this run.
    pub pulled: usize,
    /// Local tracks absent upstream (reported, never written back).
    pub push_pending: usize,
    /// Tracks re-associated with files already on disk.
    pub rediscovered: usize,
    /// Tracks holding more than one file.
    pub duplicates: usize,
    pub dedupe: DedupeOutcome,
    pub downloads: RunSummary,
}

/// Wires one invocation together: config, store, remote API, downloader.
pub struct ArchiveCoordinator {
    config: ArchiveConfig,
    store: Arc<dyn TrackStore>,
    api: Arc<dyn ChannelApi>,
    downloader: Arc<dyn TrackDownloader>,
}

impl ArchiveCoordinator {
    pub fn new(
        config: ArchiveConfig,
        store: Arc<dyn TrackStore>,
        api: Arc<dyn ChannelApi>,
        downloader: Arc<dyn TrackDownloader>,
    ) -> Self {
        Self {
            config,
            store,
            api,
            downloader,
        }
    }

    /// Execute one full run.
    ///
    /// Fatal errors are limited to the remote fetch, the snapshot write, and
    /// store/filesystem access; per-track parse and download failures are
    /// absorbed into the report.
    pub async fn run(&self) -> Result<RunReport> {
        let slug = &self.config.slug;
        let tracks_dir = self.config.tracks_dir();
        tokio::fs::create_dir_all(&tracks_dir).await?;

        let channel = self.api.fetch_channel(slug).await?;
        let remote_records = self.api.fetch_tracks(slug, self.config.limit).await?;
        info!(channel = %channel.name, tracks = remote_records.len(), "Fetched channel");

        write_snapshot(
            &self.config.snapshot_path(),
            &BackupSnapshot {
                radio: channel.clone(),
                tracks: remote_records.clone(),
            },
        )
        .await?;

        let options = PlanOptions {
            force: self.config.force,
            retry_failed: self.config.retry_failed,
        };

        let initial = self.reconcile(&remote_records, &options).await?;

        // Persist file re-associations found on disk before anything else
        // reads the store.
        for track in &initial.rediscovered {
            self.store.set_files(&track.id, &track.files).await?;
        }

        for track in &initial.push {
            warn!(track_id = %track.id, title = %track.title, "Local track missing upstream");
        }

        let mut pulled = 0;
        if self.config.pull {
            for track in &initial.pull {
                self.store.upsert(track).await?;
                pulled += 1;
            }
            info!(pulled, "Mirrored new remote tracks");
        }

        // Pulls and re-associations changed the store, so the work plan is
        // recomputed before any destructive or long-running phase.
        let current = self.reconcile(&remote_records, &options).await?;

        let dedupe_outcome = if self.config.delete_duplicates {
            dedupe::remove_duplicates(&self.store, &current.duplicates).await?
        } else {
            DedupeOutcome::default()
        };

        let downloads = if self.config.download {
            let orchestrator = DownloadOrchestrator::new(
                Arc::clone(&self.store),
                Arc::clone(&self.downloader),
                self.config.max_concurrent,
            );
            orchestrator.run(current.download.clone(), &tracks_dir).await
        } else {
            RunSummary::default()
        };

        let local_tracks = self.store.count().await? as usize;
        Ok(RunReport {
            channel_name: channel.name,
            remote_tracks: remote_records.len(),
            local_tracks,
            skipped_remote: current.skipped_remote,
            skipped_local: current.skipped_local,
            pulled,
            push_pending: current.push.len(),
            rediscovered: initial.rediscovered.len(),
            duplicates: current.duplicates.len(),
            dedupe: dedupe_outcome,
            downloads,
        })
    }

    async fn reconcile(
        &self,
        remote_records: &[archive_model::RemoteTrackRecord],
        options: &PlanOptions,
    ) -> Result<RunPlan> {
        let local_records = self.store.get_all().await?;
        let existing_files = probe::scan_existing(&self.config.tracks_dir()).await?;
        Ok(plan(&local_records, remote_records, &existing_files, options))
    }
}

//! The reconciler: a three-way diff of remote records, local records, and
//! on-disk files, producing the work plan for one run.
//!
//! Planning is pure (no I/O, no store writes), so every rule here is
//! directly testable. The plan is ephemeral: rebuilt on every invocation
//! from current state, never persisted.

use crate::probe;
use archive_model::{codec, LocalRecord, RemoteTrackRecord, Track};
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Flags narrowing or widening the download set.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanOptions {
    /// Include tracks that already have files (re-download everything).
    pub force: bool,
    /// Include tracks whose previous download failed.
    pub retry_failed: bool,
}

/// The computed work for one run.
#[derive(Debug, Default)]
pub struct RunPlan {
    /// Remote tracks not yet mirrored locally.
    pub pull: Vec<Track>,
    /// Local tracks absent upstream. Informational: surfaced for the caller,
    /// never written back automatically.
    pub push: Vec<Track>,
    /// Local tracks whose media still needs downloading, in insertion order.
    pub download: Vec<Track>,
    /// Tracks whose files were re-associated from disk during planning;
    /// their updated `files` must be persisted by the caller.
    pub rediscovered: Vec<Track>,
    /// Tracks with more than one file on disk. Flagged only; resolution is
    /// the explicit duplicate-cleanup operation.
    pub duplicates: Vec<Track>,
    /// Remote records that failed schema validation and were skipped.
    pub skipped_remote: usize,
    /// Local records that failed schema validation and were skipped.
    pub skipped_local: usize,
}

/// Compute the three-way diff.
///
/// Local insertion order is preserved throughout, so repeated runs process
/// tracks in a predictable sequence and partial-completion logs are
/// comparable across runs.
pub fn plan(
    local_records: &[LocalRecord],
    remote_records: &[RemoteTrackRecord],
    existing_files: &[PathBuf],
    options: &PlanOptions,
) -> RunPlan {
    let mut plan = RunPlan::default();

    let remote_tracks = convert(
        remote_records.iter().map(codec::remote_to_track),
        &mut plan.skipped_remote,
        "remote",
    );
    let mut local_tracks = convert(
        local_records.iter().map(codec::local_to_track),
        &mut plan.skipped_local,
        "local",
    );

    let local_ids: HashSet<&str> = local_tracks.iter().map(|t| t.id.as_str()).collect();
    let remote_ids: HashSet<&str> = remote_tracks.iter().map(|t| t.id.as_str()).collect();

    plan.pull = remote_tracks
        .iter()
        .filter(|t| !local_ids.contains(t.id.as_str()))
        .cloned()
        .collect();
    plan.push = local_tracks
        .iter()
        .filter(|t| !remote_ids.contains(t.id.as_str()))
        .cloned()
        .collect();

    for track in &mut local_tracks {
        // Re-associate orphaned files before deciding whether a download is
        // needed. A rediscovered file satisfies the track without a request.
        if track.files.is_empty() {
            if let Some(provider_id) = &track.provider_id {
                let matches = probe::files_matching_provider(provider_id, existing_files);
                if !matches.is_empty() {
                    debug!(track_id = %track.id, files = matches.len(), "Found existing file(s) for track");
                    track.files = matches.into_iter().cloned().collect();
                    // The file satisfies the track; a failure recorded before
                    // it appeared is no longer outstanding.
                    track.last_error = None;
                    plan.rediscovered.push(track.clone());
                }
            }
        }

        if track.files.len() > 1 {
            plan.duplicates.push(track.clone());
        }

        let needs_file = options.force || track.files.is_empty();
        let error_allows = options.retry_failed || track.last_error.is_none();
        if needs_file && error_allows {
            plan.download.push(track.clone());
        }
    }

    plan
}

fn convert<I>(records: I, skipped: &mut usize, source: &str) -> Vec<Track>
where
    I: Iterator<Item = archive_model::Result<Track>>,
{
    let mut tracks = Vec::new();
    for result in records {
        match result {
            Ok(track) => tracks.push(track),
            Err(e) => {
                warn!(source, track_id = e.track_id(), field = e.field(), error = %e, "Skipping record that failed to parse");
                *skipped += 1;
            }
        }
    }
    tracks
}

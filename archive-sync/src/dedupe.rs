//! Duplicate-file cleanup.
//!
//! Reconciliation only flags tracks with more than one file on disk;
//! deleting anything is destructive, so it runs solely behind an explicit
//! flag. The first file in the track's list is kept, the rest removed.

use archive_model::Track;
use archive_store::TrackStore;
use std::io;
use std::sync::Arc;
use tracing::{info, warn};

/// What a cleanup pass actually did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DedupeOutcome {
    pub tracks_affected: usize,
    pub files_deleted: usize,
}

/// Delete every file but the first for each duplicate track, then record the
/// surviving file in the store.
///
/// A file already gone from disk is treated as deleted. Store errors abort:
/// removing files without recording the survivor would desynchronize store
/// and disk.
pub async fn remove_duplicates(
    store: &Arc<dyn TrackStore>,
    duplicates: &[Track],
) -> archive_store::Result<DedupeOutcome> {
    let mut outcome = DedupeOutcome::default();

    for track in duplicates {
        let Some((keep, extras)) = track.files.split_first() else {
            continue;
        };
        if extras.is_empty() {
            continue;
        }

        for path in extras {
            match tokio::fs::remove_file(path).await {
                Ok(()) => {
                    info!(track_id = %track.id, path = %path.display(), "Removed duplicate file");
                    outcome.files_deleted += 1;
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!(track_id = %track.id, path = %path.display(), "Duplicate file already gone");
                }
                Err(e) => {
                    warn!(track_id = %track.id, path = %path.display(), error = %e, "Could not remove duplicate file");
                    continue;
                }
            }
        }

        store
            .set_files(&track.id, std::slice::from_ref(keep))
            .await?;
        outcome.tracks_affected += 1;
    }

    Ok(outcome)
}

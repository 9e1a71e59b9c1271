//! Point-in-time backup snapshot.
//!
//! Once per run the raw remote state is written out as a single
//! human-inspectable JSON document. This is an audit artifact, not the live
//! store: it records what the remote returned, before any codec validation
//! or merging.

use crate::error::Result;
use archive_model::{Channel, RemoteTrackRecord};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// The snapshot document: the channel record plus the raw track records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupSnapshot {
    pub radio: Channel,
    pub tracks: Vec<RemoteTrackRecord>,
}

/// Write the snapshot as pretty-printed JSON, replacing any previous one.
pub async fn write_snapshot(path: &Path, snapshot: &BackupSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    tokio::fs::write(path, json).await?;
    info!(path = %path.display(), tracks = snapshot.tracks.len(), "Wrote backup snapshot");
    Ok(())
}

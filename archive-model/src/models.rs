//! Canonical domain models.

use crate::provider::Provider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One media item with metadata, identified by a stable id assigned by the
/// remote source.
///
/// This is the canonical in-memory shape; the remote wire form and the
/// persisted form are converted to and from it by [`crate::codec`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Stable identifier, unique, assigned by the remote source.
    /// Immutable once created; all merges key on it.
    pub id: String,
    /// Slug of the owning channel.
    pub channel_slug: String,
    /// Track title.
    pub title: String,
    /// Media URL on the hosting service.
    pub url: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Link to the release on Discogs.
    pub discogs_url: Option<String>,
    /// Ordered tags (may be empty).
    pub tags: Vec<String>,
    /// Ordered @-mentions (may be empty).
    pub mentions: Vec<String>,
    /// Creation time; source of truth is remote.
    pub created_at: DateTime<Utc>,
    /// Last update time; source of truth is remote.
    pub updated_at: DateTime<Utc>,
    /// Hosting service, derived from `url`. Recomputed on every conversion.
    pub provider: Option<Provider>,
    /// The hosting service's native media id, derived from `url`.
    pub provider_id: Option<String>,
    /// Local filesystem paths believed to hold this track's media.
    pub files: Vec<PathBuf>,
    /// Last download failure message; cleared on success.
    pub last_error: Option<String>,
}

impl Track {
    /// Whether the track has any associated local media file.
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }
}

/// The remote channel a set of tracks belongs to.
///
/// Remote-only: fetched once per run for the backup snapshot, never
/// persisted in the track store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

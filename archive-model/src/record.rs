//! Wire and persisted record shapes.
//!
//! Both shapes keep every field optional (beyond what the transport itself
//! guarantees) so that a single malformed record decodes into a value the
//! codec can reject with a precise [`crate::ParseError`], instead of failing
//! the whole batch at deserialization time.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A track as returned by the remote channel API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteTrackRecord {
    #[serde(default)]
    pub id: Option<String>,
    /// Owning channel slug (from the channel_tracks view).
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub discogs_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub mentions: Option<Vec<String>>,
}

/// A track row as persisted in the local store.
///
/// `tags`/`mentions` are flattened to a single delimited TEXT column and
/// `files` is a JSON-encoded array of paths; the store engine cannot hold
/// native sequences. Timestamps are RFC 3339 TEXT.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct LocalRecord {
    pub id: String,
    pub channel_slug: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub discogs_url: Option<String>,
    pub tags: Option<String>,
    pub mentions: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub provider: Option<String>,
    pub provider_id: Option<String>,
    pub files: Option<String>,
    pub last_error: Option<String>,
}

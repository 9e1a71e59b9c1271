//! Conversions between the three track views.
//!
//! ```text
//! RemoteTrackRecord --remote_to_track--> Track
//! Track             --track_to_local---> LocalRecord
//! LocalRecord       --local_to_track---> Track
//! ```
//!
//! Required fields (`id`, `url`, `title`, `channel_slug`, timestamps) must be
//! present and well-typed; `url` must parse as a URI. Violations return a
//! [`ParseError`] naming the record and field. `provider`/`provider_id` are
//! recomputed from the URL on every conversion.

use crate::error::{ParseError, Result, UNKNOWN_ID};
use crate::models::Track;
use crate::provider::{detect_provider, Provider};
use crate::record::{LocalRecord, RemoteTrackRecord};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use url::Url;

/// Delimiter used to flatten `tags`/`mentions` into a single TEXT column.
///
/// Part of the persisted-store contract: a tag or mention value must never
/// contain this character, which is what makes flatten/unflatten exact
/// inverses.
pub const TAG_DELIMITER: char = ',';

/// Join values into the delimited persisted form.
///
/// Returns `Ok(None)` for an empty sequence (stored as SQL NULL). A value
/// containing [`TAG_DELIMITER`] is rejected: flattening it would not
/// round-trip.
pub fn flatten_values(
    values: &[String],
    track_id: &str,
    field: &'static str,
) -> Result<Option<String>> {
    if values.is_empty() {
        return Ok(None);
    }
    for value in values {
        if value.contains(TAG_DELIMITER) {
            return Err(ParseError::DelimiterInValue {
                track_id: track_id.to_string(),
                field,
                value: value.clone(),
                delimiter: TAG_DELIMITER,
            });
        }
    }
    Ok(Some(values.join(&TAG_DELIMITER.to_string())))
}

/// Split a delimited persisted value back into the ordered sequence.
///
/// Exact inverse of [`flatten_values`] for any input whose values contain no
/// delimiter. NULL maps back to the empty sequence.
pub fn unflatten_values(stored: Option<&str>) -> Vec<String> {
    match stored {
        None => Vec::new(),
        Some(s) => s.split(TAG_DELIMITER).map(str::to_string).collect(),
    }
}

/// Convert a remote wire record into a canonical [`Track`].
pub fn remote_to_track(record: &RemoteTrackRecord) -> Result<Track> {
    let id = require(record.id.as_deref(), UNKNOWN_ID, "id")?;
    let title = require(record.title.as_deref(), &id, "title")?;
    let url = require_url(record.url.as_deref(), &id)?;
    let channel_slug = require(record.slug.as_deref(), &id, "slug")?;
    let created_at = parse_timestamp(record.created_at.as_deref(), &id, "created_at")?;
    let updated_at = parse_timestamp(record.updated_at.as_deref(), &id, "updated_at")?;

    let (provider, provider_id) = split_detection(&url);

    Ok(Track {
        id,
        channel_slug,
        title,
        url,
        description: record.description.clone(),
        discogs_url: record.discogs_url.clone(),
        tags: record.tags.clone().unwrap_or_default(),
        mentions: record.mentions.clone().unwrap_or_default(),
        created_at,
        updated_at,
        provider,
        provider_id,
        files: Vec::new(),
        last_error: None,
    })
}

/// Convert a canonical [`Track`] into its persisted form.
pub fn track_to_local(track: &Track) -> Result<LocalRecord> {
    let tags = flatten_values(&track.tags, &track.id, "tags")?;
    let mentions = flatten_values(&track.mentions, &track.id, "mentions")?;
    let files = encode_files(&track.files, &track.id)?;

    Ok(LocalRecord {
        id: track.id.clone(),
        channel_slug: Some(track.channel_slug.clone()),
        title: Some(track.title.clone()),
        url: Some(track.url.clone()),
        description: track.description.clone(),
        discogs_url: track.discogs_url.clone(),
        tags,
        mentions,
        created_at: Some(track.created_at.to_rfc3339()),
        updated_at: Some(track.updated_at.to_rfc3339()),
        provider: track.provider.map(|p| p.as_str().to_string()),
        provider_id: track.provider_id.clone(),
        files,
        last_error: track.last_error.clone(),
    })
}

/// Convert a persisted record back into a canonical [`Track`].
///
/// The stored `provider`/`provider_id` columns are ignored in favor of
/// re-deriving them from `url`, so a URL edit can never leave a stale pair
/// behind.
pub fn local_to_track(record: &LocalRecord) -> Result<Track> {
    let id = if record.id.is_empty() {
        return Err(ParseError::MissingField {
            track_id: UNKNOWN_ID.to_string(),
            field: "id",
        });
    } else {
        record.id.clone()
    };
    let title = require(record.title.as_deref(), &id, "title")?;
    let url = require_url(record.url.as_deref(), &id)?;
    let channel_slug = require(record.channel_slug.as_deref(), &id, "channel_slug")?;
    let created_at = parse_timestamp(record.created_at.as_deref(), &id, "created_at")?;
    let updated_at = parse_timestamp(record.updated_at.as_deref(), &id, "updated_at")?;

    let (provider, provider_id) = split_detection(&url);
    let files = decode_files(record.files.as_deref(), &id)?;

    Ok(Track {
        id,
        channel_slug,
        title,
        url,
        description: record.description.clone(),
        discogs_url: record.discogs_url.clone(),
        tags: unflatten_values(record.tags.as_deref()),
        mentions: unflatten_values(record.mentions.as_deref()),
        created_at,
        updated_at,
        provider,
        provider_id,
        files,
        last_error: record.last_error.clone(),
    })
}

/// Encode the file list as a JSON array string (NULL when empty).
pub fn encode_files(files: &[PathBuf], track_id: &str) -> Result<Option<String>> {
    if files.is_empty() {
        return Ok(None);
    }
    let paths: Vec<&str> = files
        .iter()
        .map(|p| {
            p.to_str().ok_or_else(|| ParseError::InvalidField {
                track_id: track_id.to_string(),
                field: "files",
                message: format!("path {p:?} is not valid UTF-8"),
            })
        })
        .collect::<Result<_>>()?;
    serde_json::to_string(&paths).map(Some).map_err(|e| ParseError::InvalidField {
        track_id: track_id.to_string(),
        field: "files",
        message: e.to_string(),
    })
}

/// Decode the persisted JSON array of paths.
pub fn decode_files(stored: Option<&str>, track_id: &str) -> Result<Vec<PathBuf>> {
    match stored {
        None => Ok(Vec::new()),
        Some(s) => {
            let paths: Vec<String> =
                serde_json::from_str(s).map_err(|e| ParseError::InvalidField {
                    track_id: track_id.to_string(),
                    field: "files",
                    message: format!("not a JSON array of paths: {e}"),
                })?;
            Ok(paths.into_iter().map(PathBuf::from).collect())
        }
    }
}

fn split_detection(url: &str) -> (Option<Provider>, Option<String>) {
    match detect_provider(url) {
        Some((provider, provider_id)) => (Some(provider), Some(provider_id)),
        None => (None, None),
    }
}

fn require(value: Option<&str>, track_id: &str, field: &'static str) -> Result<String> {
    match value {
        Some(v) => Ok(v.to_string()),
        None => Err(ParseError::MissingField {
            track_id: track_id.to_string(),
            field,
        }),
    }
}

fn require_url(value: Option<&str>, track_id: &str) -> Result<String> {
    let raw = require(value, track_id, "url")?;
    Url::parse(&raw).map_err(|e| ParseError::InvalidField {
        track_id: track_id.to_string(),
        field: "url",
        message: e.to_string(),
    })?;
    Ok(raw)
}

fn parse_timestamp(
    value: Option<&str>,
    track_id: &str,
    field: &'static str,
) -> Result<DateTime<Utc>> {
    let raw = require(value, track_id, field)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ParseError::InvalidField {
            track_id: track_id.to_string(),
            field,
            message: format!("{e} ({raw:?})"),
        })
}

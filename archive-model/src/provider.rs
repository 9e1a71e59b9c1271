//! Hosting-provider detection.
//!
//! `provider`/`provider_id` are pure functions of a track's URL: the same URL
//! always yields the same result, and stale persisted values are never
//! trusted. Unknown URL shapes yield `None` rather than an error, since a
//! track can legitimately point at a host we cannot download from.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A known media hosting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Youtube,
    Soundcloud,
    Vimeo,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::Soundcloud => "soundcloud",
            Self::Vimeo => "vimeo",
        }
    }

    /// Parse the stored TEXT form back into a provider.
    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "youtube" => Some(Self::Youtube),
            "soundcloud" => Some(Self::Soundcloud),
            "vimeo" => Some(Self::Vimeo),
            _ => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Match a track URL against known hosting-service URL shapes.
///
/// Returns the provider and that service's native media id, or `None` when
/// the shape is not recognized. Deterministic: same input, same output.
pub fn detect_provider(raw_url: &str) -> Option<(Provider, String)> {
    let url = Url::parse(raw_url).ok()?;
    let host = url.host_str()?.trim_start_matches("www.");

    match host {
        "youtube.com" | "m.youtube.com" | "music.youtube.com" => detect_youtube(&url),
        "youtu.be" => first_path_segment(&url).map(|id| (Provider::Youtube, id)),
        "soundcloud.com" => detect_soundcloud(&url),
        "vimeo.com" => detect_vimeo(&url),
        _ => None,
    }
}

fn detect_youtube(url: &Url) -> Option<(Provider, String)> {
    // Watch URLs carry the id in the `v` query parameter; shorts and embeds
    // carry it as the second path segment.
    if let Some((_, id)) = url.query_pairs().find(|(k, _)| k == "v") {
        if !id.is_empty() {
            return Some((Provider::Youtube, id.into_owned()));
        }
    }

    let mut segments = url.path_segments()?;
    match segments.next()? {
        "shorts" | "embed" | "v" | "live" => {
            let id = segments.next()?;
            if id.is_empty() {
                None
            } else {
                Some((Provider::Youtube, id.to_string()))
            }
        }
        _ => None,
    }
}

fn detect_soundcloud(url: &Url) -> Option<(Provider, String)> {
    // SoundCloud URLs are `/{artist}/{track}`; the track slug is the id.
    let segments: Vec<&str> = url.path_segments()?.filter(|s| !s.is_empty()).collect();
    match segments.as_slice() {
        [_artist, track, ..] => Some((Provider::Soundcloud, track.to_string())),
        _ => None,
    }
}

fn detect_vimeo(url: &Url) -> Option<(Provider, String)> {
    let id = first_path_segment(url)?;
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Some((Provider::Vimeo, id))
    } else {
        None
    }
}

fn first_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

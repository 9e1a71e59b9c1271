//! Filesystem prober.
//!
//! The filesystem is a secondary source of truth: store state can be lost or
//! predate a run, so the provider id is embedded in every filename and
//! association is re-derived from it. That makes the system self-healing
//! across restarts: a file downloaded by a previous run is recognized even
//! when the recorded `files` field is stale or empty.

use archive_model::Track;
use std::io;
use std::path::{Path, PathBuf};

/// Extensions treated as downloaded media when scanning.
const AUDIO_EXTENSIONS: &[&str] = &["m4a", "mp3", "opus", "ogg"];

/// Maximum length of the sanitized title, in bytes.
const MAX_TITLE_LEN: usize = 200;

/// Characters stripped from titles when building filenames.
const ILLEGAL_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Sanitize a track title for use as a filename component.
///
/// Filesystem-illegal characters become spaces, whitespace runs collapse,
/// and the result is truncated to a bounded length on a char boundary.
pub fn sanitize_title(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| {
            if ILLEGAL_CHARS.contains(&c) || c.is_control() {
                ' '
            } else {
                c
            }
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut truncated = collapsed;
    while truncated.len() > MAX_TITLE_LEN {
        truncated.pop();
    }
    let trimmed = truncated.trim_end().to_string();

    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed
    }
}

/// The bracketed tag embedded in a track's filename.
///
/// The provider id where known; otherwise the track's own stable id, so two
/// tracks with the same title still never collide.
fn file_tag(track: &Track) -> &str {
    track.provider_id.as_deref().unwrap_or(&track.id)
}

/// Canonical target path for a track's media: `<title> [<tag>].m4a`.
///
/// Deterministic: the same track and base directory always yield the same
/// path.
pub fn target_filename(track: &Track, tracks_dir: &Path) -> PathBuf {
    let title = sanitize_title(&track.title);
    tracks_dir.join(format!("{} [{}].m4a", title, file_tag(track)))
}

/// List already-downloaded media files in a directory (by extension).
///
/// A missing directory is an empty archive, not an error. Results are
/// sorted by name so scans are stable across runs.
pub async fn scan_existing(tracks_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(tracks_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_media = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if is_media && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Files whose name contains the given provider id.
///
/// This substring match is what re-associates orphaned files with their
/// track. An empty provider id matches nothing.
pub fn files_matching_provider<'a>(
    provider_id: &str,
    existing_files: &'a [PathBuf],
) -> Vec<&'a PathBuf> {
    if provider_id.is_empty() {
        return Vec::new();
    }
    existing_files
        .iter()
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains(provider_id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn track_with(title: &str, provider_id: Option<&str>) -> Track {
        Track {
            id: "track-1".to_string(),
            channel_slug: "radio".to_string(),
            title: title.to_string(),
            url: "https://example.com/x".to_string(),
            description: None,
            discogs_url: None,
            tags: Vec::new(),
            mentions: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            provider: None,
            provider_id: provider_id.map(str::to_string),
            files: Vec::new(),
            last_error: None,
        }
    }

    #[test]
    fn sanitize_strips_illegal_characters() {
        assert_eq!(sanitize_title("AC/DC: Back?"), "AC DC Back");
        assert_eq!(sanitize_title("a<b>c|d\"e"), "a b c d e");
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_title("  too   many\tspaces "), "too many spaces");
    }

    #[test]
    fn sanitize_bounds_length_on_char_boundary() {
        let long = "é".repeat(300);
        let out = sanitize_title(&long);
        assert!(out.len() <= MAX_TITLE_LEN);
        assert!(out.chars().all(|c| c == 'é'));
    }

    #[test]
    fn sanitize_never_returns_empty() {
        assert_eq!(sanitize_title("///"), "untitled");
        assert_eq!(sanitize_title(""), "untitled");
    }

    #[test]
    fn target_filename_embeds_provider_id() {
        let track = track_with("Night Drive", Some("dQw4w9WgXcQ"));
        let path = target_filename(&track, Path::new("/data/radio/tracks"));
        assert_eq!(
            path,
            Path::new("/data/radio/tracks/Night Drive [dQw4w9WgXcQ].m4a")
        );
    }

    #[test]
    fn target_filename_is_deterministic() {
        let track = track_with("Night Drive", Some("abc"));
        let dir = Path::new("tracks");
        assert_eq!(target_filename(&track, dir), target_filename(&track, dir));
    }

    #[test]
    fn same_title_different_provider_never_collides() {
        let a = target_filename(&track_with("Same", Some("id-a")), Path::new("t"));
        let b = target_filename(&track_with("Same", Some("id-b")), Path::new("t"));
        assert_ne!(a, b);
    }

    #[test]
    fn missing_provider_id_falls_back_to_track_id() {
        let track = track_with("Same", None);
        let path = target_filename(&track, Path::new("t"));
        assert_eq!(path, Path::new("t/Same [track-1].m4a"));
    }

    #[tokio::test]
    async fn scan_lists_media_files_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a [x].m4a", "b [y].mp3", "notes.txt", "c.M4A"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.m4a")).unwrap();

        let files = scan_existing(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a [x].m4a", "b [y].mp3", "c.M4A"]);
    }

    #[tokio::test]
    async fn scan_of_missing_directory_is_empty() {
        let files = scan_existing(Path::new("/definitely/not/here")).await.unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn matching_is_a_filename_substring_match() {
        let existing = vec![
            PathBuf::from("tracks/Night Drive [abc123].m4a"),
            PathBuf::from("tracks/Other [xyz789].m4a"),
            PathBuf::from("abc123/unrelated [qqq].m4a"),
        ];

        let matches = files_matching_provider("abc123", &existing);
        assert_eq!(matches, vec![&existing[0]]);
    }

    #[test]
    fn empty_provider_id_matches_nothing() {
        let existing = vec![PathBuf::from("tracks/a [x].m4a")];
        assert!(files_matching_provider("", &existing).is_empty());
    }
}

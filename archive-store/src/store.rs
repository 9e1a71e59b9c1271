//! Track repository trait and SQLite implementation.

use crate::error::{Result, StoreError};
use archive_model::{codec, LocalRecord, Track};
use async_trait::async_trait;
use sqlx::{query_as, SqlitePool};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keyed record store for tracks.
///
/// One row per track id. `upsert` merges metadata while preserving local
/// download state; the `mark_*` operations are the only writes that can
/// clear `files`/`last_error`.
#[async_trait]
pub trait TrackStore: Send + Sync {
    /// Point lookup by track id.
    async fn get(&self, id: &str) -> Result<Option<LocalRecord>>;

    /// Bulk scan of every stored record, in insertion order.
    ///
    /// Returns raw records; schema validation happens in the codec so a
    /// malformed row is reported as a skipped record by the caller, never a
    /// fatal scan error.
    async fn get_all(&self) -> Result<Vec<LocalRecord>>;

    /// Insert or update a track, keyed on its id.
    ///
    /// Writes every field of the incoming track except `files` and
    /// `last_error`, which keep their stored values unless the incoming
    /// track supplies a non-empty one. A remote metadata refresh therefore
    /// never erases local download state. Idempotent.
    async fn upsert(&self, track: &Track) -> Result<()>;

    /// Record a successful download: `files = [file]`, `last_error` cleared.
    async fn mark_downloaded(&self, id: &str, file: &Path) -> Result<()>;

    /// Record a failed download: `files` cleared, `last_error` set.
    async fn mark_failed(&self, id: &str, error: &str) -> Result<()>;

    /// Replace the file list for a track (file re-association, duplicate
    /// cleanup). Recording a non-empty list also clears `last_error`: a
    /// track with media has no outstanding failure. Clearing the list
    /// leaves `last_error` untouched.
    async fn set_files(&self, id: &str, files: &[PathBuf]) -> Result<()>;

    /// Number of stored tracks.
    async fn count(&self) -> Result<i64>;
}

/// SQLite implementation of [`TrackStore`].
pub struct SqliteTrackStore {
    pool: SqlitePool,
}

impl SqliteTrackStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrackStore for SqliteTrackStore {
    async fn get(&self, id: &str) -> Result<Option<LocalRecord>> {
        let record = query_as::<_, LocalRecord>("SELECT * FROM tracks WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record)
    }

    async fn get_all(&self) -> Result<Vec<LocalRecord>> {
        let records = query_as::<_, LocalRecord>("SELECT * FROM tracks ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn upsert(&self, track: &Track) -> Result<()> {
        let mut record = codec::track_to_local(track)?;

        // Existing download state would be overwritten, so keep it unless
        // the incoming track explicitly carries its own.
        if let Some(existing) = self.get(&track.id).await? {
            if record.files.is_none() {
                record.files = existing.files;
            }
            if record.last_error.is_none() {
                record.last_error = existing.last_error;
            }
        }

        debug!(track_id = %record.id, title = record.title.as_deref(), "Upserting track");

        // ON CONFLICT updates in place; INSERT OR REPLACE would delete and
        // re-insert the row, assigning a fresh rowid and moving the track to
        // the end of the insertion-ordered scan.
        sqlx::query(
            r#"
            INSERT INTO tracks (
                id, channel_slug, title, url, description, discogs_url,
                tags, mentions, created_at, updated_at,
                provider, provider_id, files, last_error
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                channel_slug = excluded.channel_slug,
                title = excluded.title,
                url = excluded.url,
                description = excluded.description,
                discogs_url = excluded.discogs_url,
                tags = excluded.tags,
                mentions = excluded.mentions,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                provider = excluded.provider,
                provider_id = excluded.provider_id,
                files = excluded.files,
                last_error = excluded.last_error
            "#,
        )
        .bind(&record.id)
        .bind(&record.channel_slug)
        .bind(&record.title)
        .bind(&record.url)
        .bind(&record.description)
        .bind(&record.discogs_url)
        .bind(&record.tags)
        .bind(&record.mentions)
        .bind(&record.created_at)
        .bind(&record.updated_at)
        .bind(&record.provider)
        .bind(&record.provider_id)
        .bind(&record.files)
        .bind(&record.last_error)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_downloaded(&self, id: &str, file: &Path) -> Result<()> {
        let files = codec::encode_files(&[file.to_path_buf()], id)?;
        let result =
            sqlx::query("UPDATE tracks SET files = ?, last_error = NULL WHERE id = ?")
                .bind(&files)
                .bind(id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    async fn mark_failed(&self, id: &str, error: &str) -> Result<()> {
        let result =
            sqlx::query("UPDATE tracks SET files = NULL, last_error = ? WHERE id = ?")
                .bind(error)
                .bind(id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    async fn set_files(&self, id: &str, files: &[PathBuf]) -> Result<()> {
        let encoded = codec::encode_files(files, id)?;
        let query = if encoded.is_some() {
            "UPDATE tracks SET files = ?, last_error = NULL WHERE id = ?"
        } else {
            "UPDATE tracks SET files = ? WHERE id = ?"
        };
        let result = sqlx::query(query)
            .bind(&encoded)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Database(sqlx::Error::RowNotFound));
        }
        Ok(())
    }

    async fn count(&self) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tracks")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_test_pool;
    use archive_model::codec::local_to_track;
    use chrono::{TimeZone, Utc};

    fn test_track(id: &str) -> Track {
        let url = format!("https://www.youtube.com/watch?v=vid-{id}");
        let (provider, provider_id) = match archive_model::detect_provider(&url) {
            Some((p, pid)) => (Some(p), Some(pid)),
            None => (None, None),
        };
        Track {
            id: id.to_string(),
            channel_slug: "test-radio".to_string(),
            title: format!("Track {id}"),
            url,
            description: None,
            discogs_url: None,
            tags: vec!["test".to_string()],
            mentions: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            provider,
            provider_id,
            files: Vec::new(),
            last_error: None,
        }
    }

    async fn test_store() -> SqliteTrackStore {
        SqliteTrackStore::new(create_test_pool().await.unwrap())
    }

    #[tokio::test]
    async fn upsert_and_get() {
        let store = test_store().await;
        let track = test_track("a");

        store.upsert(&track).await.unwrap();

        let record = store.get("a").await.unwrap().unwrap();
        assert_eq!(local_to_track(&record).unwrap(), track);
    }

    #[tokio::test]
    async fn upsert_is_idempotent() {
        let store = test_store().await;
        let track = test_track("a");

        store.upsert(&track).await.unwrap();
        let first = store.get("a").await.unwrap();
        store.upsert(&track).await.unwrap();
        let second = store.get("a").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_preserves_existing_download_state() {
        let store = test_store().await;
        let mut track = test_track("a");
        track.files = vec![PathBuf::from("a.m4a")];
        store.upsert(&track).await.unwrap();

        // Metadata refresh with empty files must not erase the stored file.
        let refresh = test_track("a");
        store.upsert(&refresh).await.unwrap();

        let record = store.get("a").await.unwrap().unwrap();
        let stored = local_to_track(&record).unwrap();
        assert_eq!(stored.files, vec![PathBuf::from("a.m4a")]);
    }

    #[tokio::test]
    async fn upsert_preserves_existing_last_error() {
        let store = test_store().await;
        store.upsert(&test_track("a")).await.unwrap();
        store.mark_failed("a", "no media found").await.unwrap();

        store.upsert(&test_track("a")).await.unwrap();

        let record = store.get("a").await.unwrap().unwrap();
        assert_eq!(record.last_error.as_deref(), Some("no media found"));
    }

    #[tokio::test]
    async fn incoming_files_replace_stored_files() {
        let store = test_store().await;
        let mut track = test_track("a");
        track.files = vec![PathBuf::from("old.m4a")];
        store.upsert(&track).await.unwrap();

        track.files = vec![PathBuf::from("new.m4a")];
        store.upsert(&track).await.unwrap();

        let record = store.get("a").await.unwrap().unwrap();
        let stored = local_to_track(&record).unwrap();
        assert_eq!(stored.files, vec![PathBuf::from("new.m4a")]);
    }

    #[tokio::test]
    async fn mark_downloaded_sets_file_and_clears_error() {
        let store = test_store().await;
        store.upsert(&test_track("a")).await.unwrap();
        store.mark_failed("a", "boom").await.unwrap();

        store
            .mark_downloaded("a", Path::new("tracks/Track a [vid-a].m4a"))
            .await
            .unwrap();

        let record = store.get("a").await.unwrap().unwrap();
        let stored = local_to_track(&record).unwrap();
        assert_eq!(stored.files, vec![PathBuf::from("tracks/Track a [vid-a].m4a")]);
        assert_eq!(stored.last_error, None);
    }

    #[tokio::test]
    async fn mark_failed_clears_files_and_sets_error() {
        let store = test_store().await;
        store.upsert(&test_track("a")).await.unwrap();
        store
            .mark_downloaded("a", Path::new("a.m4a"))
            .await
            .unwrap();

        store.mark_failed("a", "yt-dlp exited with 1").await.unwrap();

        let record = store.get("a").await.unwrap().unwrap();
        assert_eq!(record.files, None);
        assert_eq!(record.last_error.as_deref(), Some("yt-dlp exited with 1"));
    }

    #[tokio::test]
    async fn marking_an_unknown_track_fails() {
        let store = test_store().await;
        assert!(store.mark_failed("ghost", "err").await.is_err());
        assert!(store
            .mark_downloaded("ghost", Path::new("x.m4a"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn get_all_returns_insertion_order() {
        let store = test_store().await;
        for id in ["c", "a", "b"] {
            store.upsert(&test_track(id)).await.unwrap();
        }

        // A metadata refresh of an existing row must not move it.
        store.upsert(&test_track("c")).await.unwrap();

        let ids: Vec<String> = store
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn reupsert_keeps_scan_position() {
        let store = test_store().await;
        store.upsert(&test_track("a")).await.unwrap();
        store.upsert(&test_track("b")).await.unwrap();

        let mut updated = test_track("a");
        updated.title = "Renamed".to_string();
        store.upsert(&updated).await.unwrap();

        let records = store.get_all().await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(records[0].title.as_deref(), Some("Renamed"));
    }

    #[tokio::test]
    async fn malformed_row_does_not_abort_scan() {
        let store = test_store().await;
        store.upsert(&test_track("good")).await.unwrap();

        // A row predating this tool, with no url at all.
        sqlx::query("INSERT INTO tracks (id, title) VALUES ('bad', 'orphan')")
            .execute(&store.pool)
            .await
            .unwrap();

        let records = store.get_all().await.unwrap();
        assert_eq!(records.len(), 2);

        // The malformed row surfaces as a per-record parse error, not a
        // failed scan.
        let parsed: Vec<_> = records.iter().map(local_to_track).collect();
        assert_eq!(parsed.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(parsed.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[tokio::test]
    async fn set_files_replaces_list() {
        let store = test_store().await;
        store.upsert(&test_track("a")).await.unwrap();

        let files = vec![PathBuf::from("one.m4a"), PathBuf::from("two.m4a")];
        store.set_files("a", &files).await.unwrap();

        let record = store.get("a").await.unwrap().unwrap();
        let stored = local_to_track(&record).unwrap();
        assert_eq!(stored.files, files);

        store.set_files("a", &[]).await.unwrap();
        let record = store.get("a").await.unwrap().unwrap();
        assert_eq!(record.files, None);
    }

    #[tokio::test]
    async fn set_files_with_media_clears_error() {
        let store = test_store().await;
        store.upsert(&test_track("a")).await.unwrap();
        store.mark_failed("a", "no media found").await.unwrap();

        store
            .set_files("a", &[PathBuf::from("Track a [vid-a].m4a")])
            .await
            .unwrap();

        let record = store.get("a").await.unwrap().unwrap();
        assert!(record.files.is_some());
        assert_eq!(record.last_error, None);
    }

    #[tokio::test]
    async fn clearing_files_leaves_error_in_place() {
        let store = test_store().await;
        store.upsert(&test_track("a")).await.unwrap();
        store.mark_failed("a", "no media found").await.unwrap();

        store.set_files("a", &[]).await.unwrap();

        let record = store.get("a").await.unwrap().unwrap();
        assert_eq!(record.files, None);
        assert_eq!(record.last_error.as_deref(), Some("no media found"));
    }
}

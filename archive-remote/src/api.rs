//! Channel API client.

use crate::error::{RemoteError, Result};
use archive_model::{Channel, RemoteTrackRecord};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};

/// Columns requested from the channel_tracks view.
const TRACK_COLUMNS: &str =
    "id,slug,created_at,updated_at,title,url,discogs_url,description,tags,mentions";

/// Timeout for API requests.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read access to the remote channel source.
#[async_trait]
pub trait ChannelApi: Send + Sync {
    /// Fetch the channel's descriptive record.
    async fn fetch_channel(&self, slug: &str) -> Result<Channel>;

    /// Fetch up to `limit` track records for a channel, newest first.
    async fn fetch_tracks(&self, slug: &str, limit: u32) -> Result<Vec<RemoteTrackRecord>>;
}

/// HTTP implementation of [`ChannelApi`] against a PostgREST-style API.
pub struct HttpChannelApi {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpChannelApi {
    /// Create a client for the given API base URL (no trailing slash).
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("channel-archive/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        }
    }

    /// Attach the anon api key sent as `apikey` + bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "Fetching from remote");

        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.api_key {
            request = request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}"));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ChannelApi for HttpChannelApi {
    async fn fetch_channel(&self, slug: &str) -> Result<Channel> {
        let channels: Vec<Channel> = self
            .get_json(
                "channels",
                &[
                    ("slug", format!("eq.{slug}")),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;

        channels
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::ChannelNotFound {
                slug: slug.to_string(),
            })
    }

    async fn fetch_tracks(&self, slug: &str, limit: u32) -> Result<Vec<RemoteTrackRecord>> {
        let tracks: Vec<RemoteTrackRecord> = self
            .get_json(
                "channel_tracks",
                &[
                    ("select", TRACK_COLUMNS.to_string()),
                    ("slug", format!("eq.{slug}")),
                    ("order", "created_at.desc".to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        info!(slug, count = tracks.len(), "Fetched remote tracks");
        Ok(tracks)
    }
}

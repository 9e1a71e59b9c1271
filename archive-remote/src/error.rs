use thiserror::Error;

/// Errors from the remote channel source.
///
/// All of these are fatal to a run: without a remote baseline no plan can be
/// computed.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("remote returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode remote response: {0}")]
    Decode(String),

    #[error("channel `{slug}` not found (was it migrated?)")]
    ChannelNotFound { slug: String },

    #[error("failed to write backup snapshot: {0}")]
    Snapshot(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RemoteError>;

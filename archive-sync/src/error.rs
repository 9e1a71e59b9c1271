use archive_remote::RemoteError;
use archive_store::StoreError;
use thiserror::Error;

/// Errors that abort a run.
///
/// Individual download failures are not represented here: they are isolated
/// per track, persisted as `last_error`, and only surface in the run
/// summary counts.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("remote fetch failed: {0}")]
    Remote(#[from] RemoteError),

    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;

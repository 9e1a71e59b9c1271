use archive_model::ParseError;
use thiserror::Error;

/// Errors from the local track store.
///
/// Anything here other than `Encoding` means the persisted store is
/// unusable; that is fatal at startup and recoverable only by operator
/// intervention.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("record encoding failed: {0}")]
    Encoding(#[from] ParseError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

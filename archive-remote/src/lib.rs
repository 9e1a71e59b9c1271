//! # Remote Channel API
//!
//! Narrow interface to the remote channel source: a paginated read API
//! returning channel and track metadata, consumed once per run.
//!
//! The [`ChannelApi`] trait is the seam the reconciler depends on;
//! [`HttpChannelApi`] is the production implementation against the
//! PostgREST-style radio API. [`snapshot`] writes the once-per-run JSON
//! backup document.

pub mod api;
pub mod error;
pub mod snapshot;

pub use api::{ChannelApi, HttpChannelApi};
pub use error::{RemoteError, Result};
pub use snapshot::{write_snapshot, BackupSnapshot};

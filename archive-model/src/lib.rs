//! # Track Model & Codec
//!
//! Canonical in-memory representation of a channel track and the
//! bidirectional conversions between the three views of it:
//!
//! - the remote wire shape ([`RemoteTrackRecord`]) returned by the channel API
//! - the persisted shape ([`LocalRecord`]) stored in the local SQLite database
//! - the canonical [`Track`] everything else operates on
//!
//! Conversions are schema-validated and return a typed [`ParseError`] per
//! record instead of aborting a batch, so callers can count and log skipped
//! records. `provider`/`provider_id` are recomputed from the track URL on
//! every conversion and never trusted from storage.

pub mod codec;
pub mod error;
pub mod models;
pub mod provider;
pub mod record;

pub use codec::{flatten_values, local_to_track, remote_to_track, track_to_local, unflatten_values, TAG_DELIMITER};
pub use error::{ParseError, Result};
pub use models::{Channel, Track};
pub use provider::{detect_provider, Provider};
pub use record::{LocalRecord, RemoteTrackRecord};

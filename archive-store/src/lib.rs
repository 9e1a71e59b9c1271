//! # Local Track Store
//!
//! Durable keyed record store for tracks, backed by SQLite through sqlx.
//!
//! The store holds one row per track id and supports point lookup, bulk scan
//! in insertion order, and upsert-with-merge. Download outcomes are written
//! through dedicated operations ([`TrackStore::mark_downloaded`] /
//! [`TrackStore::mark_failed`]) because the merge rules of upsert
//! deliberately cannot clear `files` or `last_error`.
//!
//! Opening the store is side-effect-free when the backing file already has a
//! compatible schema; the schema is created by an embedded migration when
//! absent.

pub mod db;
pub mod error;
pub mod store;

pub use db::{create_pool, create_test_pool, DatabaseConfig};
pub use error::{Result, StoreError};
pub use store::{SqliteTrackStore, TrackStore};

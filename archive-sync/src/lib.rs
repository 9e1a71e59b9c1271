//! # Reconciliation & Download Orchestration
//!
//! Keeps the three views of a channel's tracks (remote record, local record,
//! local file) consistent, decides what work remains, and executes it
//! under bounded concurrency and partial failure.
//!
//! ## Components
//!
//! - **Filesystem Prober** (`probe`): canonical target filenames and
//!   provider-id association of already-downloaded files
//! - **Reconciler** (`plan`): the three-way diff producing a [`RunPlan`]
//! - **Downloader** (`downloader`): the external media-fetching subprocess
//!   behind the [`TrackDownloader`] seam
//! - **Download Orchestrator** (`orchestrator`): bounded-concurrency
//!   execution with per-outcome persistence
//! - **Duplicate Cleanup** (`dedupe`): the explicit, flag-gated resolution of
//!   tracks with multiple files on disk
//! - **Coordinator** (`coordinator`): the run context wiring one invocation
//!   end to end

pub mod coordinator;
pub mod dedupe;
pub mod downloader;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod probe;

pub use coordinator::{ArchiveCoordinator, RunReport};
pub use dedupe::DedupeOutcome;
pub use downloader::{DownloadError, TrackDownloader, YtDlpDownloader};
pub use error::{Result, SyncError};
pub use orchestrator::{DownloadOrchestrator, RunSummary};
pub use plan::{plan, PlanOptions, RunPlan};

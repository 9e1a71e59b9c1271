//! # Runtime Configuration & Logging
//!
//! The explicit run context for one archive invocation: a validated
//! [`ArchiveConfig`] constructed once at startup and threaded through the
//! other components (never ambient state), plus `tracing` initialization.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ArchiveConfig, ArchiveConfigBuilder, DEFAULT_MAX_CONCURRENT, DEFAULT_TRACK_LIMIT};
pub use error::{Result, RuntimeError};
pub use logging::{init_logging, LogFormat, LoggingConfig};

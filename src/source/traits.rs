//! source::traits
//!
//! Snapshot source trait definition.
//!
//! # Design
//!
//! The `SnapshotSource` trait is async because the primary source is an
//! HTTP directory index. All methods return `Result` so a missing target
//! or a network failure reaches the caller as a typed error.
//!
//! Sources do not retry. A failed listing aborts the run before anything
//! is written; a failed download aborts after the snapshots already
//! committed, which a later `--update` run picks up from.

use async_trait::async_trait;
use thiserror::Error;

use crate::core::version::VersionFilename;

/// Errors from listing or fetching snapshots.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    /// The target (or one of its files) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server answered with a non-success status.
    #[error("server error: {status} for {url}")]
    Status {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// Local filesystem error.
    #[error("i/o error: {0}")]
    Io(String),
}

/// Where snapshot archives come from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Short name for log output (`http`, `directory`).
    fn name(&self) -> &'static str;

    /// List the target's `.tar.gz` snapshots, de-duplicated and sorted
    /// oldest first.
    async fn list(&self, target: &str) -> Result<Vec<VersionFilename>, SourceError>;

    /// Download one snapshot's archive bytes.
    async fn fetch(&self, target: &str, file: &VersionFilename) -> Result<Vec<u8>, SourceError>;
}

use std::{io, time::Duration};

use thiserror::Error;

/// Errors surfaced by the accessor and the foreground loop.
#[derive(Error, Debug)]
pub enum Error {
    /// No supplier has been registered. This is a harness wiring defect, not a
    /// runtime condition, and retrying will not help.
    #[error("no supplier registered: the harness must register one before any retrieval")]
    Configuration,

    /// The foreground loop has shut down and no longer accepts work.
    #[error("foreground loop stopped")]
    LoopStopped,

    /// A bounded operation did not complete before its deadline.
    #[error("timed out after {after:?} waiting for {op}")]
    Timeout {
        /// Logical operation name (e.g., "sync").
        op: &'static str,
        /// Deadline that elapsed.
        after: Duration,
    },

    /// The foreground loop thread could not be started.
    #[error("failed to spawn foreground loop: {0}")]
    Spawn(#[from] io::Error),
}

impl Error {
    /// Whether a fresh call might succeed where this one failed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Result alias for foreground operations.
pub type Result<T> = std::result::Result<T, Error>;

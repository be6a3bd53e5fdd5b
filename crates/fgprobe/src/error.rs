//! Error handling for the fgprobe crate.

use std::result;

use thiserror::Error;

/// Convenient result type for fgprobe operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running a probe scenario.
#[derive(Debug, Error)]
pub enum Error {
    /// Errors surfaced by the foreground accessor or app loop.
    #[error("foreground error: {0}")]
    Foreground(#[from] foreground::Error),
    /// The sampled screen did not match what the scenario expected.
    #[error("expected {expected}, observed {observed}")]
    Mismatch {
        /// What the scenario expected to see.
        expected: String,
        /// What was actually sampled.
        observed: String,
    },
}

//! foreground: idle-gated access to the active unit of a foreground event loop.
//!
//! UI test code runs on its own threads while the application under test owns
//! its state on a single foreground loop. This crate lets a harness register a
//! [`Supplier`] for "the currently active unit" once, and lets tests sample it
//! safely by first waiting for the loop to go idle:
//!
//! - [`ActiveStateAccessor`]: the slot plus the wait-then-read operations.
//! - [`global`]: the one process-wide accessor with install/teardown hooks.
//! - [`ForegroundLoop`]: a single-threaded task loop with an idle-sync primitive.
//! - [`Active`]: `Handle`, `Absent`, or `Unknown` (idle not reached in time).

mod accessor;
mod active;
mod config;
mod error;
pub mod global;
mod idle;
mod looper;
mod supplier;
pub mod test_support;

pub use accessor::{ActiveStateAccessor, SharedSupplier};
pub use active::Active;
pub use config::{DEFAULTS, Defaults, ForegroundConfig, POLL_ENV, TIMEOUT_ENV};
pub use error::{Error, Result};
pub use global::ActiveHandle;
pub use idle::{
    AlwaysIdle, AsyncIdleWaiter, AsyncPollingIdle, Blocking, IdleWaiter, NeverIdle, PollingIdle,
};
pub use looper::ForegroundLoop;
pub use supplier::{CachedSupplier, FreshSupplier, Supplier};

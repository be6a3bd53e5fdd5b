//! Idle-wait primitives that gate sampling of foreground state.
//!
//! An [`IdleWaiter`] blocks the calling thread until the foreground loop has no
//! pending work, or until a timeout elapses, and reports which happened. The
//! accessor treats any such primitive as opaque. [`AsyncIdleWaiter`] is the
//! same contract for callers running on a Tokio runtime.

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use tokio::time::{Instant as TokioInstant, sleep};
use tracing::{trace, warn};

use crate::config::ForegroundConfig;

/// Block until the foreground loop is idle or `timeout` elapses.
pub trait IdleWaiter: Send + Sync {
    /// Return `true` if idle was reached within `timeout`.
    fn wait_for_idle(&self, timeout: Duration) -> bool;
}

impl<F> IdleWaiter for F
where
    F: Fn(Duration) -> bool + Send + Sync,
{
    fn wait_for_idle(&self, timeout: Duration) -> bool {
        self(timeout)
    }
}

/// Waiter that reports idle immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysIdle;

impl IdleWaiter for AlwaysIdle {
    fn wait_for_idle(&self, _timeout: Duration) -> bool {
        true
    }
}

/// Waiter that never reaches idle. Sleeps for the full timeout, then fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverIdle;

impl IdleWaiter for NeverIdle {
    fn wait_for_idle(&self, timeout: Duration) -> bool {
        thread::sleep(timeout);
        false
    }
}

/// Waiter that polls a predicate until it reports idle.
pub struct PollingIdle<P> {
    /// Returns true when the loop is idle.
    predicate: P,
    /// Sleep between checks. Zero yields instead.
    poll_interval: Duration,
}

impl<P> PollingIdle<P>
where
    P: Fn() -> bool + Send + Sync,
{
    /// Poll `predicate` every `poll_interval`.
    pub const fn new(predicate: P, poll_interval: Duration) -> Self {
        Self {
            predicate,
            poll_interval,
        }
    }

    /// Poll `predicate` at the configured interval.
    pub const fn from_config(predicate: P, config: &ForegroundConfig) -> Self {
        Self::new(predicate, config.poll_interval)
    }
}

impl<P> IdleWaiter for PollingIdle<P>
where
    P: Fn() -> bool + Send + Sync,
{
    fn wait_for_idle(&self, timeout: Duration) -> bool {
        let start = Instant::now();
        let deadline = start.checked_add(timeout);
        loop {
            if (self.predicate)() {
                trace!("idle after {:?}", start.elapsed());
                return true;
            }
            let now = Instant::now();
            let remaining = match deadline {
                Some(d) => match d.checked_duration_since(now) {
                    Some(r) if !r.is_zero() => Some(r),
                    _ => return false,
                },
                None => None,
            };
            if self.poll_interval.is_zero() {
                thread::yield_now();
            } else {
                let slice = remaining.map_or(self.poll_interval, |r| self.poll_interval.min(r));
                thread::sleep(slice);
            }
        }
    }
}

/// Async counterpart of [`IdleWaiter`] with the same deadline semantics.
#[async_trait]
pub trait AsyncIdleWaiter: Send + Sync {
    /// Resolve to `true` if idle was reached within `timeout`.
    async fn wait_for_idle(&self, timeout: Duration) -> bool;
}

/// Run a blocking [`IdleWaiter`] on Tokio's blocking pool.
pub struct Blocking(pub Arc<dyn IdleWaiter>);

#[async_trait]
impl AsyncIdleWaiter for Blocking {
    async fn wait_for_idle(&self, timeout: Duration) -> bool {
        let inner = self.0.clone();
        match tokio::task::spawn_blocking(move || inner.wait_for_idle(timeout)).await {
            Ok(idle) => idle,
            Err(e) => {
                warn!("blocking idle wait failed: {}", e);
                false
            }
        }
    }
}

/// Async waiter that polls a predicate with `tokio::time`.
pub struct AsyncPollingIdle<P> {
    /// Returns true when the loop is idle.
    predicate: P,
    /// Delay between checks.
    poll_interval: Duration,
}

impl<P> AsyncPollingIdle<P>
where
    P: Fn() -> bool + Send + Sync,
{
    /// Poll `predicate` every `poll_interval`.
    pub const fn new(predicate: P, poll_interval: Duration) -> Self {
        Self {
            predicate,
            poll_interval,
        }
    }

    /// Poll `predicate` at the configured interval.
    pub const fn from_config(predicate: P, config: &ForegroundConfig) -> Self {
        Self::new(predicate, config.poll_interval)
    }
}

#[async_trait]
impl<P> AsyncIdleWaiter for AsyncPollingIdle<P>
where
    P: Fn() -> bool + Send + Sync,
{
    async fn wait_for_idle(&self, timeout: Duration) -> bool {
        let deadline = TokioInstant::now().checked_add(timeout);
        loop {
            if (self.predicate)() {
                return true;
            }
            let slice = match deadline {
                Some(d) => {
                    let now = TokioInstant::now();
                    if now >= d {
                        return false;
                    }
                    self.poll_interval.min(d - now)
                }
                None => self.poll_interval,
            };
            sleep(slice).await;
        }
    }
}

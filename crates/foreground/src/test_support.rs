//! Test support utilities for `foreground` consumers.
//! These helpers are public so integration tests and harness crates can share
//! them; they are not meant for production wiring.

use std::{
    collections::VecDeque,
    sync::{
        OnceLock,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use parking_lot::{Mutex, MutexGuard};

use crate::{idle::IdleWaiter, supplier::Supplier};

/// Supplier returning a settable value and counting how often it is asked.
#[derive(Debug)]
pub struct RecordingSupplier<H> {
    /// Value handed out on each call.
    value: Mutex<Option<H>>,
    /// Number of `get` calls observed.
    calls: AtomicUsize,
}

impl<H> RecordingSupplier<H> {
    /// Supplier that returns `value`.
    pub fn new(value: Option<H>) -> Self {
        Self {
            value: Mutex::new(value),
            calls: AtomicUsize::new(0),
        }
    }

    /// Change the value returned from now on.
    pub fn set(&self, value: Option<H>) {
        *self.value.lock() = value;
    }

    /// Number of times `get` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<H> Supplier<H> for RecordingSupplier<H>
where
    H: Clone + Send,
{
    fn get(&self) -> Option<H> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.value.lock().clone()
    }
}

/// Idle waiter that answers from a script and records the timeouts it saw.
#[derive(Debug)]
pub struct ScriptedIdle {
    /// Answers consumed front to back.
    script: Mutex<VecDeque<bool>>,
    /// Answer once the script is exhausted.
    fallback: bool,
    /// Timeouts passed to `wait_for_idle`, in call order.
    seen: Mutex<Vec<Duration>>,
}

impl ScriptedIdle {
    /// Answer with `script` in order, then with `fallback`.
    pub fn new<I>(script: I, fallback: bool) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Always answer `idle`.
    pub fn always(idle: bool) -> Self {
        Self::new(Vec::<bool>::new(), idle)
    }

    /// Timeouts observed so far.
    pub fn timeouts(&self) -> Vec<Duration> {
        self.seen.lock().clone()
    }

    /// Number of waits observed so far.
    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }
}

impl IdleWaiter for ScriptedIdle {
    fn wait_for_idle(&self, timeout: Duration) -> bool {
        self.seen.lock().push(timeout);
        self.script.lock().pop_front().unwrap_or(self.fallback)
    }
}

/// Lock shared by tests that touch the process-wide accessor.
static TEST_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Serialize tests that register into the global slot.
pub fn serial() -> MutexGuard<'static, ()> {
    TEST_LOCK.get_or_init(|| Mutex::new(())).lock()
}

//! A single-threaded foreground loop with an idle-sync primitive.
//!
//! Work posted to a [`ForegroundLoop`] runs in order on one dedicated thread.
//! The loop is idle when no posted task is queued or running; other threads
//! can block on that condition with [`IdleWaiter::wait_for_idle`].

use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
    thread::{self, JoinHandle, ThreadId},
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use crate::{
    error::{Error, Result},
    idle::IdleWaiter,
};

/// Unit of work executed on the loop thread.
type Task = Box<dyn FnOnce() + Send + 'static>;

/// State shared between the loop thread and its callers.
struct Shared {
    /// Tasks posted but not yet finished.
    pending: Mutex<usize>,
    /// Signalled whenever `pending` drops to zero.
    idle: Condvar,
}

impl Shared {
    /// Account for a newly posted task.
    fn begin(&self) {
        *self.pending.lock() += 1;
    }

    /// Account for a finished (or rejected) task.
    fn finish(&self) {
        let mut pending = self.pending.lock();
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.idle.notify_all();
        }
    }
}

/// Dedicated thread that owns foreground state and drains posted tasks.
pub struct ForegroundLoop {
    /// Thread name, used in logs.
    name: String,
    /// Task sender; `None` after shutdown.
    tx: Mutex<Option<Sender<Task>>>,
    /// Idle accounting.
    shared: Arc<Shared>,
    /// Join handle for the loop thread.
    handle: Mutex<Option<JoinHandle<()>>>,
    /// Identity of the loop thread.
    thread_id: ThreadId,
}

impl ForegroundLoop {
    /// Start a loop on a new thread called `name`.
    pub fn spawn(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let (tx, rx) = crossbeam_channel::unbounded::<Task>();
        let shared = Arc::new(Shared {
            pending: Mutex::new(0),
            idle: Condvar::new(),
        });
        let worker = shared.clone();
        let loop_name = name.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run(&loop_name, &rx, &worker))?;
        let thread_id = handle.thread().id();
        debug!("foreground loop {} started", name);
        Ok(Self {
            name,
            tx: Mutex::new(Some(tx)),
            shared,
            handle: Mutex::new(Some(handle)),
            thread_id,
        })
    }

    /// Loop thread name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when called from the loop thread itself.
    pub fn is_loop_thread(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Number of tasks queued or running.
    pub fn pending(&self) -> usize {
        *self.shared.pending.lock()
    }

    /// Queue `task` to run on the loop thread.
    pub fn post<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let tx = self.tx.lock();
        let Some(tx) = tx.as_ref() else {
            return Err(Error::LoopStopped);
        };
        self.shared.begin();
        if tx.send(Box::new(task)).is_err() {
            self.shared.finish();
            return Err(Error::LoopStopped);
        }
        Ok(())
    }

    /// Run `f` on the loop thread and return its result.
    ///
    /// Runs inline when already on the loop thread. Otherwise waits at most
    /// `timeout` for the result.
    pub fn sync<R, F>(&self, timeout: Duration, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        if self.is_loop_thread() {
            return Ok(f());
        }
        let (tx, rx) = crossbeam_channel::bounded::<R>(1);
        self.post(move || {
            if tx.send(f()).is_err() {
                trace!("sync caller gave up before the result was ready");
            }
        })?;
        match rx.recv_timeout(timeout) {
            Ok(v) => Ok(v),
            Err(RecvTimeoutError::Timeout) => Err(Error::Timeout {
                op: "sync",
                after: timeout,
            }),
            // The task was dropped without running or panicked.
            Err(RecvTimeoutError::Disconnected) => Err(Error::LoopStopped),
        }
    }

    /// Stop accepting work, drain what is queued, and join the loop thread.
    ///
    /// From the loop thread this only closes the queue; the thread exits once
    /// the current task returns.
    pub fn shutdown(&self) {
        if self.tx.lock().take().is_none() {
            return;
        }
        if self.is_loop_thread() {
            return;
        }
        if let Some(handle) = self.handle.lock().take()
            && handle.join().is_err()
        {
            warn!("foreground loop {} panicked during shutdown", self.name);
        }
        debug!("foreground loop {} stopped", self.name);
    }
}

impl IdleWaiter for ForegroundLoop {
    fn wait_for_idle(&self, timeout: Duration) -> bool {
        if self.is_loop_thread() {
            warn!(
                "wait_for_idle called on foreground loop {}; it can never go idle while waiting",
                self.name
            );
            return false;
        }
        let deadline = Instant::now().checked_add(timeout);
        let mut pending = self.shared.pending.lock();
        while *pending > 0 {
            match deadline {
                Some(d) => {
                    if self.shared.idle.wait_until(&mut pending, d).timed_out() {
                        trace!("foreground loop {} busy: pending={}", self.name, *pending);
                        return *pending == 0;
                    }
                }
                None => self.shared.idle.wait(&mut pending),
            }
        }
        true
    }
}

impl Drop for ForegroundLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Loop body: run tasks in order until every sender is gone.
fn run(name: &str, rx: &Receiver<Task>, shared: &Shared) {
    for task in rx.iter() {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            warn!("task panicked on foreground loop {}", name);
        }
        shared.finish();
    }
    trace!("foreground loop {} drained", name);
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
        time::Duration,
    };

    use super::ForegroundLoop;
    use crate::{error::Error, idle::IdleWaiter};

    #[test]
    fn fresh_loop_is_idle() {
        let lp = ForegroundLoop::spawn("fg-test-idle").expect("spawn loop");
        assert_eq!(lp.name(), "fg-test-idle");
        assert!(lp.wait_for_idle(Duration::from_millis(10)));
        assert_eq!(lp.pending(), 0);
    }

    #[test]
    fn tasks_run_in_order_and_loop_goes_idle() {
        let lp = ForegroundLoop::spawn("fg-test-order").expect("spawn loop");
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for i in 0..5 {
            let seen = seen.clone();
            lp.post(move || seen.lock().push(i)).expect("post");
        }
        assert!(lp.wait_for_idle(Duration::from_secs(5)));
        assert_eq!(*seen.lock(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn busy_loop_times_out() {
        let lp = ForegroundLoop::spawn("fg-test-busy").expect("spawn loop");
        lp.post(|| thread::sleep(Duration::from_millis(300)))
            .expect("post");
        assert!(!lp.wait_for_idle(Duration::from_millis(20)));
        assert!(lp.wait_for_idle(Duration::from_secs(5)));
    }

    #[test]
    fn waiting_from_loop_thread_fails_fast() {
        let lp = Arc::new(ForegroundLoop::spawn("fg-test-self").expect("spawn loop"));
        let inner = lp.clone();
        let idle = lp
            .sync(Duration::from_secs(5), move || {
                inner.wait_for_idle(Duration::from_secs(60))
            })
            .expect("sync");
        assert!(!idle);
    }

    #[test]
    fn loop_thread_carries_loop_name() {
        let lp = ForegroundLoop::spawn("fg-test-named").expect("spawn loop");
        let name = lp
            .sync(Duration::from_secs(5), || {
                thread::current().name().map(str::to_string)
            })
            .expect("sync");
        assert_eq!(name.as_deref(), Some(lp.name()));
    }

    #[test]
    fn sync_returns_value_and_sees_loop_thread() {
        let lp = Arc::new(ForegroundLoop::spawn("fg-test-sync").expect("spawn loop"));
        let inner = lp.clone();
        let on_loop = lp
            .sync(Duration::from_secs(5), move || inner.is_loop_thread())
            .expect("sync");
        assert!(on_loop);
        assert!(!lp.is_loop_thread());
    }

    #[test]
    fn sync_times_out_behind_slow_task() {
        let lp = ForegroundLoop::spawn("fg-test-slow").expect("spawn loop");
        lp.post(|| thread::sleep(Duration::from_millis(300)))
            .expect("post");
        let err = lp
            .sync(Duration::from_millis(10), || 1)
            .expect_err("should time out");
        assert!(matches!(err, Error::Timeout { op: "sync", .. }));
    }

    #[test]
    fn panicking_task_does_not_wedge_loop() {
        let lp = ForegroundLoop::spawn("fg-test-panic").expect("spawn loop");
        lp.post(|| panic!("boom")).expect("post");
        assert!(lp.wait_for_idle(Duration::from_secs(5)));
        assert_eq!(lp.sync(Duration::from_secs(5), || 3).expect("sync"), 3);
    }

    #[test]
    fn shutdown_drains_and_rejects_new_work() {
        let lp = ForegroundLoop::spawn("fg-test-stop").expect("spawn loop");
        let ran = Arc::new(AtomicUsize::new(0));
        for _ in 0..3 {
            let ran = ran.clone();
            lp.post(move || {
                thread::sleep(Duration::from_millis(5));
                ran.fetch_add(1, Ordering::SeqCst);
            })
            .expect("post");
        }
        lp.shutdown();
        assert_eq!(ran.load(Ordering::SeqCst), 3);
        assert!(matches!(lp.post(|| {}), Err(Error::LoopStopped)));
        assert!(lp.wait_for_idle(Duration::ZERO));
    }
}

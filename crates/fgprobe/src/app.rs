//! A simulated application whose screen focus lives on a foreground loop.

use std::{sync::Arc, thread, time::Duration};

use foreground::{ActiveHandle, ForegroundLoop, IdleWaiter, Result, global};
use parking_lot::Mutex;
use tracing::{debug, info};

/// One screen of the simulated app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Screen {
    /// Screen name.
    pub name: String,
}

/// Focus state; written only from the loop thread.
type Focus = Arc<Mutex<Option<ActiveHandle>>>;

/// Simulated app: a foreground loop plus the screen it currently shows.
pub struct App {
    /// The app's event loop.
    looper: Arc<ForegroundLoop>,
    /// Currently focused screen.
    focus: Focus,
}

impl App {
    /// Start the app with `initial` focused.
    pub fn start(initial: &str) -> Result<Self> {
        let looper = Arc::new(ForegroundLoop::spawn("fgprobe-app")?);
        let focus: Focus = Arc::new(Mutex::new(None));
        let app = Self { looper, focus };
        let f = app.focus.clone();
        let first = screen(initial);
        app.looper.post(move || *f.lock() = Some(first))?;
        info!("app started on {}", initial);
        Ok(app)
    }

    /// Wire this app into the process-wide accessor, as a test runner would at startup.
    pub fn install(&self, with_supplier: bool) {
        global::install(self.looper.clone() as Arc<dyn IdleWaiter>);
        if with_supplier {
            let focus = self.focus.clone();
            global::register(Some(move || focus.lock().clone()));
        }
    }

    /// Drop the current screen, work for `work`, then show `to`.
    pub fn switch_to(&self, to: &str, work: Duration) -> Result<()> {
        let focus = self.focus.clone();
        let next = screen(to);
        debug!("posting switch to {} ({:?})", to, work);
        self.looper.post(move || {
            *focus.lock() = None;
            thread::sleep(work);
            *focus.lock() = Some(next);
        })
    }

    /// Keep the loop busy for `busy`.
    pub fn stall(&self, busy: Duration) -> Result<()> {
        debug!("posting stall ({:?})", busy);
        self.looper.post(move || thread::sleep(busy))
    }

    /// Close every screen.
    pub fn close_all(&self) -> Result<()> {
        let focus = self.focus.clone();
        self.looper.post(move || *focus.lock() = None)
    }

    /// Block until the loop has drained its queue.
    pub fn settle(&self, timeout: Duration) -> bool {
        self.looper.wait_for_idle(timeout)
    }
}

impl Drop for App {
    fn drop(&mut self) {
        global::teardown();
    }
}

/// Build a handle for a named screen.
fn screen(name: &str) -> ActiveHandle {
    ActiveHandle::new(Screen {
        name: name.to_string(),
    })
}

/// Render a sampled handle for display.
pub fn describe(handle: &ActiveHandle) -> String {
    handle
        .downcast_ref::<Screen>()
        .map_or_else(|| format!("{handle:?}"), |s| s.name.clone())
}

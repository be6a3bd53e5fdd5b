//! The process-wide active-unit slot.
//!
//! A harness calls [`install`] with its idle primitive and [`register`] with
//! its supplier once at startup; test code then calls [`get_active`] from any
//! thread. [`teardown`] returns the slot to its initial state between runs.

use std::{
    any::{Any, type_name},
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use once_cell::sync::Lazy;
use tracing::{info, warn};

use crate::{
    accessor::ActiveStateAccessor,
    active::Active,
    config::ForegroundConfig,
    error::Result,
    idle::{IdleWaiter, PollingIdle},
    supplier::Supplier,
};

/// Opaque, cheaply cloneable reference to the host's active unit.
#[derive(Clone)]
pub struct ActiveHandle {
    /// Host-owned unit.
    inner: Arc<dyn Any + Send + Sync>,
    /// Concrete type name, for diagnostics.
    type_name: &'static str,
}

impl ActiveHandle {
    /// Wrap a host value.
    pub fn new<T>(unit: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self::from_arc(Arc::new(unit))
    }

    /// Wrap a host value that is already shared, keeping its identity.
    pub fn from_arc<T>(unit: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            inner: unit,
            type_name: type_name::<T>(),
        }
    }

    /// Borrow the unit as `T`, if that is its type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Whether both handles refer to the same unit.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Type name of the wrapped unit.
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl Debug for ActiveHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "ActiveHandle<{}>", self.type_name)
    }
}

/// Idle gate used until the harness installs one: passes immediately, warning once.
struct Uninstalled {
    /// Set after the first warning.
    warned: AtomicBool,
}

impl IdleWaiter for Uninstalled {
    fn wait_for_idle(&self, _timeout: Duration) -> bool {
        if !self.warned.swap(true, Ordering::Relaxed) {
            warn!("no idle waiter installed; sampling without waiting for foreground idle");
        }
        true
    }
}

/// Fresh placeholder gate.
fn uninstalled() -> Arc<dyn IdleWaiter> {
    Arc::new(Uninstalled {
        warned: AtomicBool::new(false),
    })
}

/// The single process-wide accessor.
static ACCESSOR: Lazy<ActiveStateAccessor<ActiveHandle>> =
    Lazy::new(|| ActiveStateAccessor::with_config(uninstalled(), ForegroundConfig::from_env()));

/// Borrow the process-wide accessor.
pub fn accessor() -> &'static ActiveStateAccessor<ActiveHandle> {
    &ACCESSOR
}

/// Install the idle primitive consulted by [`get_active`].
pub fn install(idle: Arc<dyn IdleWaiter>) {
    info!("foreground idle waiter installed");
    ACCESSOR.set_idle_waiter(idle);
}

/// Install a predicate-polling idle gate that checks `is_idle` at the
/// configured poll interval (`FOREGROUND_POLL_MS`).
pub fn install_polling<P>(is_idle: P)
where
    P: Fn() -> bool + Send + Sync + 'static,
{
    let config = ACCESSOR.config();
    info!("polling idle gate installed: every {:?}", config.poll_interval);
    ACCESSOR.set_idle_waiter(Arc::new(PollingIdle::from_config(is_idle, config)));
}

/// Replace the registered supplier; `None` clears it.
pub fn register<S>(supplier: Option<S>)
where
    S: Supplier<ActiveHandle> + 'static,
{
    ACCESSOR.register(supplier);
}

/// Wait up to the default timeout for idle, then sample.
pub fn get_active() -> Result<Active<ActiveHandle>> {
    ACCESSOR.get_active()
}

/// Wait up to `timeout` for idle, then sample.
pub fn get_active_within(timeout: Duration) -> Result<Active<ActiveHandle>> {
    ACCESSOR.get_active_within(timeout)
}

/// Sample without waiting for idle.
pub fn get_active_no_wait() -> Result<Active<ActiveHandle>> {
    ACCESSOR.get_active_no_wait()
}

/// Clear the supplier and idle waiter.
pub fn teardown() {
    ACCESSOR.clear();
    ACCESSOR.set_idle_waiter(uninstalled());
    info!("foreground accessor torn down");
}

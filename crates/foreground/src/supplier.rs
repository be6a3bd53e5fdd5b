//! The supplier capability: produce the active unit on demand.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

/// Produces the current active unit on demand.
///
/// Implementations may return the same instance on every call or build a new
/// one each time; the accessor forwards whatever comes back. `None` means no
/// unit currently has focus.
pub trait Supplier<H>: Send + Sync {
    /// Return the current active unit, or `None` if nothing has focus.
    fn get(&self) -> Option<H>;
}

impl<H, F> Supplier<H> for F
where
    F: Fn() -> Option<H> + Send + Sync,
{
    fn get(&self) -> Option<H> {
        self()
    }
}

/// Supplier that hands out clones of a single cached instance.
///
/// The host updates the cache with [`CachedSupplier::set`] whenever focus
/// moves; readers see the instance that was current at the time of the call.
#[derive(Debug)]
pub struct CachedSupplier<H> {
    /// Currently cached unit.
    current: Mutex<Option<H>>,
}

impl<H> CachedSupplier<H> {
    /// Create a supplier that starts out with `initial`.
    pub fn new(initial: Option<H>) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    /// Replace the cached unit, returning the previous one.
    pub fn set(&self, unit: H) -> Option<H> {
        self.current.lock().replace(unit)
    }

    /// Mark that nothing has focus, returning the previous unit.
    pub fn clear(&self) -> Option<H> {
        self.current.lock().take()
    }
}

impl<H> Default for CachedSupplier<H> {
    fn default() -> Self {
        Self::new(None)
    }
}

impl<H> Supplier<H> for CachedSupplier<H>
where
    H: Clone + Send,
{
    fn get(&self) -> Option<H> {
        self.current.lock().clone()
    }
}

/// Supplier that builds a fresh unit on every call.
pub struct FreshSupplier<F> {
    /// Factory invoked per call.
    factory: F,
    /// Number of times the factory has run.
    calls: AtomicUsize,
}

impl<F> FreshSupplier<F> {
    /// Wrap `factory`.
    pub const fn new(factory: F) -> Self {
        Self {
            factory,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times the factory has been invoked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<H, F> Supplier<H> for FreshSupplier<F>
where
    F: Fn() -> Option<H> + Send + Sync,
{
    fn get(&self) -> Option<H> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.factory)()
    }
}

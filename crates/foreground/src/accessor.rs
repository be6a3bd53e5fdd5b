//! Registration and idle-gated retrieval of the active unit.

use std::{mem, sync::Arc, time::Duration};

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    active::Active,
    config::ForegroundConfig,
    error::{Error, Result},
    idle::{AsyncIdleWaiter, IdleWaiter},
    supplier::Supplier,
};

/// Shared, type-erased supplier.
pub type SharedSupplier<H> = Arc<dyn Supplier<H>>;

/// Holds the registered supplier and samples it once the foreground loop is idle.
///
/// The foreground loop may be partway through moving focus at any moment, so
/// [`get_active`](Self::get_active) first waits for it to go idle and only then
/// reads the supplier. [`get_active_no_wait`](Self::get_active_no_wait) skips
/// the wait for callers that already run on the loop thread.
pub struct ActiveStateAccessor<H> {
    /// Registered supplier, if any.
    slot: Mutex<Option<SharedSupplier<H>>>,
    /// Gate consulted before sampling.
    idle: Mutex<Arc<dyn IdleWaiter>>,
    /// Timeouts and polling.
    config: ForegroundConfig,
}

impl<H> ActiveStateAccessor<H> {
    /// Accessor gated on `idle`, with default configuration.
    pub fn new(idle: Arc<dyn IdleWaiter>) -> Self {
        Self::with_config(idle, ForegroundConfig::default())
    }

    /// Accessor gated on `idle`, with explicit configuration.
    pub fn with_config(idle: Arc<dyn IdleWaiter>, config: ForegroundConfig) -> Self {
        Self {
            slot: Mutex::new(None),
            idle: Mutex::new(idle),
            config,
        }
    }

    /// Configuration in effect.
    pub const fn config(&self) -> &ForegroundConfig {
        &self.config
    }

    /// Replace the registered supplier; `None` clears it. Last call wins.
    pub fn register<S>(&self, supplier: Option<S>)
    where
        S: Supplier<H> + 'static,
    {
        self.register_arc(supplier.map(|s| Arc::new(s) as SharedSupplier<H>));
    }

    /// Replace the registered supplier with an already shared one.
    pub fn register_arc(&self, supplier: Option<SharedSupplier<H>>) {
        let set = supplier.is_some();
        let previous = {
            let mut slot = self.slot.lock();
            mem::replace(&mut *slot, supplier)
        };
        debug!(
            "supplier {} (replaced={})",
            if set { "registered" } else { "cleared" },
            previous.is_some()
        );
    }

    /// Remove the registered supplier.
    pub fn clear(&self) {
        self.register_arc(None);
    }

    /// Whether a supplier is currently registered.
    pub fn is_registered(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Replace the idle gate.
    pub fn set_idle_waiter(&self, idle: Arc<dyn IdleWaiter>) {
        *self.idle.lock() = idle;
    }

    /// Wait up to the configured default timeout, then sample.
    pub fn get_active(&self) -> Result<Active<H>> {
        self.get_active_within(self.config.default_timeout)
    }

    /// Wait up to `timeout` for the foreground loop to go idle, then sample.
    ///
    /// Returns [`Active::Unknown`] if idle was not reached; the supplier is not
    /// consulted in that case. No retries are made.
    pub fn get_active_within(&self, timeout: Duration) -> Result<Active<H>> {
        let idle = self.idle.lock().clone();
        trace!("waiting up to {:?} for foreground idle", timeout);
        if idle.wait_for_idle(timeout) {
            self.get_active_no_wait()
        } else {
            warn!("foreground loop not idle after {:?}; active unit unknown", timeout);
            Ok(Active::Unknown)
        }
    }

    /// Sample the supplier immediately, without waiting for idle.
    ///
    /// Fails with [`Error::Configuration`] if nothing has been registered.
    pub fn get_active_no_wait(&self) -> Result<Active<H>> {
        // Clone out so the supplier runs without holding the slot lock.
        let supplier = self.slot.lock().clone().ok_or(Error::Configuration)?;
        Ok(supplier.get().into())
    }

    /// Async variant of [`get_active_within`](Self::get_active_within), gated
    /// on `idle` instead of the registered blocking waiter.
    pub async fn get_active_async(
        &self,
        idle: &dyn AsyncIdleWaiter,
        timeout: Duration,
    ) -> Result<Active<H>> {
        if idle.wait_for_idle(timeout).await {
            self.get_active_no_wait()
        } else {
            warn!("foreground loop not idle after {:?}; active unit unknown", timeout);
            Ok(Active::Unknown)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use super::{ActiveStateAccessor, SharedSupplier};
    use crate::{
        active::Active,
        config::ForegroundConfig,
        error::Error,
        idle::{AlwaysIdle, IdleWaiter, NeverIdle},
        test_support::{RecordingSupplier, ScriptedIdle},
    };

    fn idle_ok() -> Arc<dyn IdleWaiter> {
        Arc::new(AlwaysIdle)
    }

    #[test]
    fn unset_slot_is_a_configuration_error() {
        let acc: ActiveStateAccessor<u32> = ActiveStateAccessor::new(idle_ok());
        assert!(matches!(acc.get_active_no_wait(), Err(Error::Configuration)));
        assert!(matches!(
            acc.get_active_within(Duration::from_millis(10)),
            Err(Error::Configuration)
        ));
    }

    #[test]
    fn registered_value_passes_through() {
        let acc = ActiveStateAccessor::new(idle_ok());
        acc.register(Some(|| Some(7u32)));
        assert_eq!(acc.get_active_no_wait().expect("registered"), Active::Handle(7));
        assert_eq!(
            acc.get_active_within(Duration::from_millis(1000))
                .expect("registered"),
            Active::Handle(7)
        );
    }

    #[test]
    fn absent_is_not_an_error() {
        let acc = ActiveStateAccessor::<u32>::new(idle_ok());
        acc.register(Some(|| None));
        assert_eq!(acc.get_active_no_wait().expect("registered"), Active::Absent);
        assert_eq!(acc.get_active().expect("registered"), Active::Absent);
    }

    #[test]
    fn timeout_yields_unknown_without_sampling() {
        let supplier = Arc::new(RecordingSupplier::new(Some(1u32)));
        let acc = ActiveStateAccessor::new(Arc::new(NeverIdle));
        acc.register_arc(Some(supplier.clone() as SharedSupplier<u32>));
        assert_eq!(
            acc.get_active_within(Duration::from_millis(50))
                .expect("timeout is not an error"),
            Active::Unknown
        );
        assert_eq!(supplier.calls(), 0);
    }

    #[test]
    fn timeout_wins_over_missing_supplier() {
        let acc = ActiveStateAccessor::<u32>::new(Arc::new(NeverIdle));
        assert_eq!(
            acc.get_active_within(Duration::ZERO).expect("unknown"),
            Active::Unknown
        );
    }

    #[test]
    fn last_registration_wins_and_none_clears() {
        let acc = ActiveStateAccessor::new(idle_ok());
        acc.register(Some(|| Some("first")));
        acc.register(Some(|| Some("second")));
        assert_eq!(acc.get_active_no_wait().expect("set"), Active::Handle("second"));
        acc.register::<fn() -> Option<&'static str>>(None);
        assert!(!acc.is_registered());
        assert!(matches!(acc.get_active_no_wait(), Err(Error::Configuration)));
    }

    #[test]
    fn default_timeout_comes_from_config() {
        let idle = Arc::new(ScriptedIdle::always(true));
        let cfg = ForegroundConfig::default().with_default_timeout(Duration::from_millis(123));
        let acc = ActiveStateAccessor::with_config(idle.clone(), cfg);
        acc.register(Some(|| Some(())));
        acc.get_active().expect("registered");
        assert_eq!(idle.timeouts(), vec![Duration::from_millis(123)]);
    }

    #[test]
    fn idle_waiter_can_be_swapped() {
        let acc = ActiveStateAccessor::new(Arc::new(NeverIdle));
        acc.register(Some(|| Some(1u8)));
        assert_eq!(acc.get_active_within(Duration::ZERO).expect("ok"), Active::Unknown);
        acc.set_idle_waiter(idle_ok());
        assert_eq!(acc.get_active_within(Duration::ZERO).expect("ok"), Active::Handle(1));
    }

    #[test]
    fn supplier_may_call_back_into_accessor() {
        let acc = Arc::new(ActiveStateAccessor::<bool>::new(idle_ok()));
        let weak = Arc::downgrade(&acc);
        acc.register(Some(move || weak.upgrade().map(|a| a.is_registered())));
        assert_eq!(acc.get_active_no_wait().expect("set"), Active::Handle(true));
    }
}

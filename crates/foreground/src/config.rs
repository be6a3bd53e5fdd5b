//! Configuration constants and defaults for foreground access.

use std::{env, time::Duration};

use tracing::warn;

/// Default tunables.
#[derive(Debug, Clone, Copy)]
pub struct Defaults {
    /// Idle-wait timeout used by `get_active()` in milliseconds.
    pub timeout_ms: u64,
    /// Polling interval for predicate-based idle waits in milliseconds.
    pub poll_interval_ms: u64,
}

/// Default timeout and polling settings.
pub const DEFAULTS: Defaults = Defaults {
    timeout_ms: 30_000,
    poll_interval_ms: 10,
};

/// Environment variable overriding [`Defaults::timeout_ms`].
pub const TIMEOUT_ENV: &str = "FOREGROUND_TIMEOUT_MS";

/// Environment variable overriding [`Defaults::poll_interval_ms`].
pub const POLL_ENV: &str = "FOREGROUND_POLL_MS";

/// Runtime configuration for an accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForegroundConfig {
    /// Timeout applied by `get_active()` when no explicit timeout is given.
    pub default_timeout: Duration,
    /// Interval between checks for polling idle waiters.
    pub poll_interval: Duration,
}

impl Default for ForegroundConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_millis(DEFAULTS.timeout_ms),
            poll_interval: Duration::from_millis(DEFAULTS.poll_interval_ms),
        }
    }
}

impl ForegroundConfig {
    /// Defaults overridden by `FOREGROUND_TIMEOUT_MS` and `FOREGROUND_POLL_MS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`. Unparseable values are
    /// logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(ms) = millis_from(&lookup, TIMEOUT_ENV) {
            cfg.default_timeout = ms;
        }
        if let Some(ms) = millis_from(&lookup, POLL_ENV) {
            cfg.poll_interval = ms;
        }
        cfg
    }

    /// Replace the default timeout.
    #[must_use]
    pub const fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Replace the polling interval.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

/// Parse a millisecond value for `key`.
fn millis_from<F>(lookup: &F, key: &str) -> Option<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(ms) => Some(Duration::from_millis(ms)),
        Err(e) => {
            warn!("ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ForegroundConfig, POLL_ENV, TIMEOUT_ENV};

    #[test]
    fn default_timeout_is_thirty_seconds() {
        let cfg = ForegroundConfig::default();
        assert_eq!(cfg.default_timeout, Duration::from_secs(30));
        assert_eq!(cfg.poll_interval, Duration::from_millis(10));
    }

    #[test]
    fn lookup_overrides_defaults() {
        let cfg = ForegroundConfig::from_lookup(|k| match k {
            TIMEOUT_ENV => Some("1500".into()),
            POLL_ENV => Some(" 2 ".into()),
            _ => None,
        });
        assert_eq!(cfg.default_timeout, Duration::from_millis(1500));
        assert_eq!(cfg.poll_interval, Duration::from_millis(2));
    }

    #[test]
    fn bad_values_are_ignored() {
        let cfg = ForegroundConfig::from_lookup(|k| (k == TIMEOUT_ENV).then(|| "soon".into()));
        assert_eq!(cfg, ForegroundConfig::default());
    }
}

#![warn(missing_docs)]

//! Shared logging helpers and CLI argument definitions for the foreground workspace.
//!
//! - [`LogArgs`]: `--trace`, `--debug`, `--log-level`, `--log-filter`
//! - [`compute_spec`]: resolve those flags and `RUST_LOG` into one filter string
//! - [`init`]: install a `tracing-subscriber` registry once per process

use std::{env, sync::OnceLock};

use clap::Args;
use tracing_subscriber::{EnvFilter, prelude::*};

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set global log level to trace (our crates only)
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set global log level to debug (our crates only)
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single global log level for our crates (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "foreground=trace,fgprobe=debug"
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl LogArgs {
    /// Filter spec for these flags, see [`compute_spec`].
    pub fn spec(&self) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
        )
    }
}

/// List of crate targets that constitute "our" logs.
pub fn our_crates() -> &'static [&'static str] {
    &["foreground", "fgprobe", "logging"]
}

/// Build a filter directive string that sets the same `level` for all of our crates.
pub fn level_spec_for(level: &str) -> String {
    let lvl = level.to_ascii_lowercase();
    our_crates()
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (crate-scoped)
/// - `RUST_LOG` env
/// - default to crate-scoped `info`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
) -> String {
    spec_with_env(
        trace,
        debug,
        log_level,
        log_filter,
        env::var("RUST_LOG").ok(),
    )
}

/// [`compute_spec`] with the environment value passed in.
fn spec_with_env(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
    rust_log: Option<String>,
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace");
    }
    if debug {
        return level_spec_for("debug");
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl);
    }
    rust_log.unwrap_or_else(|| level_spec_for("info"))
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

/// Set once the global subscriber has been installed.
static LOGGING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Install a fmt subscriber filtered by `args`. Later calls are no-ops.
pub fn init(args: &LogArgs) {
    LOGGING_INITIALIZED.get_or_init(|| {
        let spec = args.spec();
        // Another subscriber may already be installed (e.g. by a test harness).
        tracing_subscriber::registry()
            .with(env_filter_from_spec(&spec))
            .with(tracing_subscriber::fmt::layer().without_time())
            .try_init()
            .ok();
        tracing::debug!("logging initialized: {}", spec);
    });
}

#[cfg(test)]
mod tests {
    use super::{LogArgs, init, level_spec_for, spec_with_env};

    #[test]
    fn level_spec_covers_our_crates() {
        assert_eq!(
            level_spec_for("DEBUG"),
            "foreground=debug,fgprobe=debug,logging=debug"
        );
    }

    #[test]
    fn explicit_filter_wins() {
        let spec = spec_with_env(true, false, Some("warn"), Some("foreground=trace"), None);
        assert_eq!(spec, "foreground=trace");
    }

    #[test]
    fn flags_beat_environment() {
        let spec = spec_with_env(false, true, None, None, Some("error".into()));
        assert_eq!(spec, level_spec_for("debug"));
        let spec = spec_with_env(false, false, Some("warn"), None, Some("error".into()));
        assert_eq!(spec, level_spec_for("warn"));
    }

    #[test]
    fn environment_then_default() {
        assert_eq!(
            spec_with_env(false, false, None, None, Some("fgprobe=trace".into())),
            "fgprobe=trace"
        );
        assert_eq!(spec_with_env(false, false, None, None, None), level_spec_for("info"));
    }

    #[test]
    fn init_tolerates_existing_subscriber() {
        // A subscriber installed first makes our `try_init` fail; that is not fatal.
        tracing_subscriber::fmt().with_test_writer().try_init().ok();
        init(&LogArgs::default());
        init(&LogArgs {
            trace: true,
            ..LogArgs::default()
        });
    }
}

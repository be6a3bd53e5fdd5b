//! Command-line interface definitions for fgprobe.

use std::time::Duration;

use clap::{Parser, Subcommand};
use logging::LogArgs;

/// Command-line interface for the `fgprobe` binary.
#[derive(Parser, Debug)]
#[command(
    name = "fgprobe",
    about = "Sample the active screen of a simulated app loop",
    version
)]
pub struct Cli {
    /// Logging controls shared across workspace binaries.
    #[command(flatten)]
    pub log: LogArgs,

    /// How long to wait for the app loop to go idle before sampling.
    #[arg(
        long,
        value_parser = humantime::parse_duration,
        default_value = "30s",
        value_name = "DURATION"
    )]
    pub timeout: Duration,

    /// Screen focused when the app starts.
    #[arg(long, default_value = "home")]
    pub initial: String,

    /// Which scenario to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Probe scenarios.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample the active screen once.
    Probe,
    /// Move focus to another screen, then sample.
    Switch {
        /// Screen to focus.
        #[arg(long)]
        to: String,
        /// Time the app spends between dropping the old screen and showing the new one.
        #[arg(
            long,
            value_parser = humantime::parse_duration,
            default_value = "200ms",
            value_name = "DURATION"
        )]
        work: Duration,
        /// Sample immediately instead of waiting for idle.
        #[arg(long)]
        no_wait: bool,
    },
    /// Keep the app busy for longer than `--timeout` and sample.
    Stall {
        /// How long the app stays busy.
        #[arg(
            long,
            value_parser = humantime::parse_duration,
            default_value = "2s",
            value_name = "DURATION"
        )]
        busy: Duration,
    },
    /// Close every screen and sample.
    Close,
    /// Sample before any supplier is registered.
    Unregistered,
}

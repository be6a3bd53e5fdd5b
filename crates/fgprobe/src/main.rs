#![warn(missing_docs)]

//! Entry point for the `fgprobe` binary.

mod app;
mod cli;
mod error;

use std::process;

use clap::Parser;
use foreground::{Active, ActiveHandle, global};
use tracing::{error, info};

use crate::{
    app::{App, describe},
    cli::{Cli, Commands},
    error::{Error, Result},
};

fn main() {
    if let Err(err) = run() {
        error!("{err}");
        eprintln!("error: {err}");
        process::exit(1);
    }
}

/// Parse CLI arguments, install logging, and dispatch to the chosen scenario.
fn run() -> Result<()> {
    let Cli {
        log,
        timeout,
        initial,
        command,
    } = Cli::parse();
    logging::init(&log);

    let app = App::start(&initial)?;
    let registered = !matches!(command, Commands::Unregistered);
    app.install(registered);

    match command {
        Commands::Probe => {
            let got = global::get_active_within(timeout)?;
            report("probe", &got);
            expect(&got, Some(&initial))
        }
        Commands::Switch { to, work, no_wait } => {
            app.switch_to(&to, work)?;
            if no_wait {
                let got = global::get_active_no_wait()?;
                report("switch (no wait)", &got);
                Ok(())
            } else {
                let got = global::get_active_within(timeout)?;
                report("switch", &got);
                expect(&got, Some(&to))
            }
        }
        Commands::Stall { busy } => {
            app.stall(busy)?;
            let got = global::get_active_within(timeout)?;
            report("stall", &got);
            if busy > timeout && got.is_known() {
                return Err(Error::Mismatch {
                    expected: "unknown".into(),
                    observed: render(&got),
                });
            }
            Ok(())
        }
        Commands::Close => {
            app.close_all()?;
            let got = global::get_active_within(timeout)?;
            report("close", &got);
            expect(&got, None)
        }
        Commands::Unregistered => {
            if !app.settle(timeout) {
                info!("app still busy after {:?}", timeout);
            }
            match global::get_active_no_wait() {
                Err(foreground::Error::Configuration) => {
                    println!("unregistered: configuration error, as expected");
                    Ok(())
                }
                Err(e) => Err(e.into()),
                Ok(got) => Err(Error::Mismatch {
                    expected: "configuration error".into(),
                    observed: render(&got),
                }),
            }
        }
    }
}

/// Human-readable form of a sample.
fn render(got: &Active<ActiveHandle>) -> String {
    match got {
        Active::Handle(h) => describe(h),
        other => other.to_string(),
    }
}

/// Print a sample.
fn report(scenario: &str, got: &Active<ActiveHandle>) {
    println!("{scenario}: {}", render(got));
}

/// Check that a sample names `want`, or is absent when `want` is `None`.
fn expect(got: &Active<ActiveHandle>, want: Option<&str>) -> Result<()> {
    let ok = match (got, want) {
        (Active::Handle(h), Some(name)) => describe(h) == name,
        (Active::Absent, None) => true,
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::Mismatch {
            expected: want.unwrap_or("absent").to_string(),
            observed: render(got),
        })
    }
}

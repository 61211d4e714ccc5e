// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![deny(clippy::all, clippy::pedantic)]

use clap::error::ErrorKind;
use clap::{arg, crate_version, value_parser, ArgMatches, Command};
use graymc_synthesis::DecomposerConfig;
use std::ffi::OsString;
use tracing_subscriber::EnvFilter;

use crate::{GateChoice, RunOptions};

fn command() -> Command {
    Command::new("graymc").args(&[
        arg!(-c --controls <NUM> "(Required) Number of control qubits")
            .value_parser(value_parser!(usize))
            .required(true),
        arg!(-t --targets <NUM> "Number of target qubits the gate is broadcast to")
            .value_parser(value_parser!(usize))
            .default_value("1"),
        arg!(-g --gate <NAME> "Base gate: x, y, z, h, s, sdg, t, tdg, sx, sxdg, rx(θ), ry(θ), rz(θ), p(θ) or random")
            .value_parser(|name: &str| name.parse::<GateChoice>())
            .default_value("x"),
        arg!(-m --mode <MODE> "Multi-controlled X construction to select, for example noancilla or v-chain"),
        arg!(-a --ancillas <NUM> "Number of ancilla qubits supplied to the selected mode")
            .value_parser(value_parser!(usize))
            .default_value("0"),
        arg!(-r --rngseed <NUM> "The value to use when seeding the random number generator for the random gate")
            .value_parser(value_parser!(u64)),
        arg!(--tolerance <TOL> "Largest element-wise error accepted for the computed root")
            .value_parser(value_parser!(f64)),
        arg!(--verify "Compare the decomposition against the gate it implements"),
        arg!(--"truth-table" "Run the decomposition on every basis assignment of the controls"),
        arg!(-v --verbose "Log decomposition details to standard error"),
    ]).version(crate_version!())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when running more than once in a process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn options(matches: &ArgMatches) -> RunOptions {
    let defaults = RunOptions::default();
    let config = matches
        .get_one::<f64>("tolerance")
        .map_or(defaults.config, |&tolerance| {
            DecomposerConfig::default().with_root_tolerance(tolerance)
        });
    RunOptions {
        controls: *matches
            .get_one::<usize>("controls")
            .expect("Controls is required"),
        targets: *matches
            .get_one::<usize>("targets")
            .expect("Targets should have a default value"),
        gate: *matches
            .get_one::<GateChoice>("gate")
            .expect("Gate should have a default value"),
        mode: matches.get_one::<String>("mode").cloned(),
        ancillas: *matches
            .get_one::<usize>("ancillas")
            .expect("Ancillas should have a default value"),
        seed: matches.get_one::<u64>("rngseed").copied(),
        verify: matches.get_flag("verify"),
        truth_table: matches.get_flag("truth-table"),
        config,
    }
}

/// # Errors
/// Returns an error if the arguments are invalid or the run fails.
/// # Panics
/// Panics if the arguments cannot be read.
pub fn main<I, T>(args: Option<I>) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cmd = command();
    let matches = match args {
        Some(args) => cmd.try_get_matches_from(args),
        None => cmd.try_get_matches(),
    };
    match matches {
        Err(e) => {
            let msg = e.to_string();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    eprint!("{msg}");
                    Ok(())
                }
                _ => Err(msg),
            }
        }
        Ok(matches) => {
            init_logging(matches.get_flag("verbose"));
            crate::run(&options(&matches), &mut std::io::stdout())
        }
    }
}

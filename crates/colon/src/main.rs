//! Command-line interface for the `colon` query tool.

use std::process::ExitCode;

use clap::Parser;
use colon::cli::{args::Cli, commands};
use log::LevelFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    commands::run(cli.command)
}

/// Installs the global logger at a level picked by the `-v` count.
fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    env_logger::Builder::new().filter_level(level).init();
}

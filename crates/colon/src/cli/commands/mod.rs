//! Command implementations and dispatch.

pub mod eval;
pub mod parse;
pub mod polish;
mod shared;
pub mod stack;
pub mod tokens;

use std::process::ExitCode;

use super::args::Commands;

/// Dispatches to the selected subcommand.
pub fn run(command: Commands) -> ExitCode {
    match command {
        Commands::Tokens(args) => tokens::run(&args),
        Commands::Parse(args) => parse::run(&args),
        Commands::Polish(args) => polish::run(&args),
        Commands::Stack(args) => stack::run(&args),
        Commands::Eval(cmd) => eval::run(&cmd),
    }
}

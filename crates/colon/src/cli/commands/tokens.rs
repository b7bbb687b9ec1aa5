//! Implementation of `colon tokens`.

use std::process::ExitCode;

use colon_query::tokenize;

use super::shared::read_query;
use crate::cli::{args::QueryArgs, output::print_json};

/// Prints the tokens of a query, one per line, ending with EOF.
pub fn run(args: &QueryArgs) -> ExitCode {
    let query = match read_query(args) {
        Ok(query) => query,
        Err(code) => return code,
    };

    let tokens = match tokenize(&query) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("error: {e} at position {}", e.position());
            return ExitCode::FAILURE;
        }
    };

    if args.json {
        return print_json(&tokens);
    }
    for token in &tokens {
        println!("{token}");
    }
    ExitCode::SUCCESS
}

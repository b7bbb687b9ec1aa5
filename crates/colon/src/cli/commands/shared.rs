//! Shared helpers for command implementations.

use std::{
    io::{self, Read},
    process::ExitCode,
};

use colon_query::{Node, parse};
use log::info;

use crate::cli::args::QueryArgs;

/// Query argument that reads the query from stdin.
const STDIN_QUERY: &str = "-";

/// Returns the query text, reading stdin when the argument is `-`.
///
/// A single trailing newline is stripped from stdin input.
pub fn read_query(args: &QueryArgs) -> Result<String, ExitCode> {
    if args.query != STDIN_QUERY {
        return Ok(args.query.clone());
    }

    let mut query = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut query) {
        eprintln!("error: failed to read query from stdin: {e}");
        return Err(ExitCode::FAILURE);
    }
    if query.ends_with('\n') {
        query.pop();
        if query.ends_with('\r') {
            query.pop();
        }
    }
    Ok(query)
}

/// Parses a query, printing the rendered error on failure.
///
/// `failure` is the exit code returned when the query does not parse.
pub fn parse_query(query: &str, failure: ExitCode) -> Result<Option<Node>, ExitCode> {
    match parse(query) {
        Ok(node) => {
            info!("parsed query {query:?}");
            Ok(node)
        }
        Err(e) => {
            eprintln!("{}", e.render(query).trim_end());
            Err(failure)
        }
    }
}

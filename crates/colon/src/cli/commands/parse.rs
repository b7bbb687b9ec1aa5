//! Implementation of `colon parse`.

use std::process::ExitCode;

use super::shared::{parse_query, read_query};
use crate::cli::{args::QueryArgs, output::print_json};

/// Prints the parsed query as an indented tree, or as JSON.
///
/// A query with nothing to parse prints nothing (`null` in JSON mode).
pub fn run(args: &QueryArgs) -> ExitCode {
    let node = match read_query(args).and_then(|q| parse_query(&q, ExitCode::FAILURE)) {
        Ok(node) => node,
        Err(code) => return code,
    };

    if args.json {
        return print_json(&node);
    }
    if let Some(node) = node {
        print!("{node}");
    }
    ExitCode::SUCCESS
}

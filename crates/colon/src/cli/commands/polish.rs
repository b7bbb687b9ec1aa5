//! Implementation of `colon polish`.

use std::process::ExitCode;

use colon_query::to_polish_notation;

use super::shared::{parse_query, read_query};
use crate::cli::{args::QueryArgs, output::print_json};

/// Prints the query in prefix notation, labels separated by spaces.
pub fn run(args: &QueryArgs) -> ExitCode {
    let node = match read_query(args).and_then(|q| parse_query(&q, ExitCode::FAILURE)) {
        Ok(node) => node,
        Err(code) => return code,
    };

    let labels = node.as_ref().map(to_polish_notation).unwrap_or_default();
    if args.json {
        return print_json(&labels);
    }
    println!("{}", labels.join(" "));
    ExitCode::SUCCESS
}

//! Implementation of `colon stack`.

use std::process::ExitCode;

use colon_query::to_stack;

use super::shared::{parse_query, read_query};
use crate::cli::{args::QueryArgs, output::print_json};

/// Prints the node stack top first, one node per line.
pub fn run(args: &QueryArgs) -> ExitCode {
    let node = match read_query(args).and_then(|q| parse_query(&q, ExitCode::FAILURE)) {
        Ok(node) => node,
        Err(code) => return code,
    };

    let labels: Vec<String> = node
        .as_ref()
        .map(to_stack)
        .unwrap_or_default()
        .iter()
        .rev()
        .map(|node| node.label())
        .collect();

    if args.json {
        return print_json(&labels);
    }
    for label in labels {
        println!("{label}");
    }
    ExitCode::SUCCESS
}

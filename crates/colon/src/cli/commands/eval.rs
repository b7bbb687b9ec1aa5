//! Implementation of `colon eval`.

use std::process::ExitCode;

use log::info;
use serde::Serialize;

use super::shared::{parse_query, read_query};
use crate::{cli::args::EvalCommand, document::Document, eval::evaluate};

/// Exit codes for `colon eval`.
mod exit_codes {
    /// The document matches the query.
    pub const MATCH: u8 = 0;
    /// The document does not match the query.
    pub const NO_MATCH: u8 = 1;
    /// The query or document could not be read, or evaluation failed.
    pub const ERROR: u8 = 2;
}

/// JSON output for `colon eval`.
#[derive(Serialize)]
struct JsonEvalOutput<'a> {
    /// The evaluated query.
    query: &'a str,
    /// Whether the document matched.
    matched: bool,
}

/// Evaluates a query against a document and prints `true` or `false`.
pub fn run(cmd: &EvalCommand) -> ExitCode {
    let query = match read_query(&cmd.query) {
        Ok(query) => query,
        Err(_) => return ExitCode::from(exit_codes::ERROR),
    };
    let node = match parse_query(&query, ExitCode::from(exit_codes::ERROR)) {
        Ok(node) => node,
        Err(code) => return code,
    };
    let doc = match build_document(cmd) {
        Ok(doc) => doc,
        Err(code) => return code,
    };

    // An empty query matches every document.
    let evaluated = node.as_ref().map_or(Ok(true), |node| evaluate(node, &doc));
    let matched = match evaluated {
        Ok(matched) => matched,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::from(exit_codes::ERROR);
        }
    };
    info!("{query:?} matched: {matched}");

    if cmd.query.json {
        let json_output = JsonEvalOutput {
            query: &query,
            matched,
        };
        match serde_json::to_string_pretty(&json_output) {
            Ok(json_str) => println!("{json_str}"),
            Err(e) => {
                eprintln!("error: failed to serialize JSON: {e}");
                return ExitCode::from(exit_codes::ERROR);
            }
        }
    } else {
        println!("{matched}");
    }

    ExitCode::from(if matched {
        exit_codes::MATCH
    } else {
        exit_codes::NO_MATCH
    })
}

/// Builds the document from `--doc`, then applies `--text` and `--field` overrides.
fn build_document(cmd: &EvalCommand) -> Result<Document, ExitCode> {
    let mut doc = match &cmd.doc {
        Some(path) => Document::load(path).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::from(exit_codes::ERROR)
        })?,
        None => Document::default(),
    };

    if let Some(text) = &cmd.text {
        doc.text.clone_from(text);
    }
    for (key, value) in &cmd.fields {
        doc.fields.insert(key.clone(), value.clone());
    }
    Ok(doc)
}

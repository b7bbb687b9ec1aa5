//! colon: inspect and evaluate key:value boolean queries.
//!
//! Queries are parsed by [`colon_query`]. This crate adds a command-line front end and a
//! reference evaluator that matches a parsed query against a [`Document`]: bare terms are
//! searched for in the document text, `key:value` filters and comparisons are checked
//! against the document fields.

#![warn(missing_docs)]

pub mod cli;
pub mod document;
pub mod eval;

pub use document::{Document, DocumentError};
pub use eval::{EvalError, evaluate, evaluate_stack};

//! CLI support for the `colon` binary.

pub mod args;
pub mod commands;
pub mod output;

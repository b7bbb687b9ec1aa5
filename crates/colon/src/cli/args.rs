//! Clap argument definitions for the `colon` CLI.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::document;

/// Parse a `key=value` field assignment.
fn parse_field(s: &str) -> Result<(String, String), String> {
    document::parse_field(s).map_err(|e| e.to_string())
}

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "colon")]
#[command(about = "Parse, inspect and evaluate key:value boolean queries")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// The query operand shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Query to process, or `-` to read it from stdin
    pub query: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `colon eval`.
#[derive(Args, Debug, Clone)]
pub struct EvalCommand {
    #[command(flatten)]
    /// Query and output flags.
    pub query: QueryArgs,

    /// Document to match against (.json or .toml)
    #[arg(short = 'd', long)]
    pub doc: Option<PathBuf>,

    /// Document text searched by bare terms (replaces the file's text)
    #[arg(short = 't', long)]
    pub text: Option<String>,

    /// Document field as key=value (can be specified multiple times)
    #[arg(short = 'f', long = "field", value_parser = parse_field)]
    pub fields: Vec<(String, String)>,
}

/// Supported `colon` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Print the tokens of a query, one per line
    Tokens(QueryArgs),

    /// Print the parsed query tree
    Parse(QueryArgs),

    /// Print the query in prefix (Polish) notation
    Polish(QueryArgs),

    /// Print the node stack, top first
    Stack(QueryArgs),

    /// Evaluate the query against a document
    Eval(EvalCommand),
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn eval_collects_fields() {
        let cli = Cli::try_parse_from([
            "colon", "eval", "lang:en", "-f", "lang=en", "--field", "price=10",
        ])
        .unwrap();
        let Commands::Eval(cmd) = cli.command else {
            panic!("expected eval");
        };
        assert_eq!(cmd.query.query, "lang:en");
        assert_eq!(
            cmd.fields,
            vec![
                ("lang".to_string(), "en".to_string()),
                ("price".to_string(), "10".to_string())
            ]
        );
    }

    #[test]
    fn malformed_field_is_rejected() {
        assert!(Cli::try_parse_from(["colon", "eval", "a", "--field", "novalue"]).is_err());
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["colon", "parse", "a", "-vv"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}

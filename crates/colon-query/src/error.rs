//! Error types for query lexing and parsing.
//!
//! Lexing and grammar errors are caused by bad input. [`QueryError::Invariant`] is raised
//! only when the lexer and parser disagree about a token, which indicates a bug.

use thiserror::Error;

use crate::lexer::TokenKind;

/// Numeric code of a character, for error messages.
fn char_code(ch: &char) -> u32 {
    u32::from(*ch)
}

/// Lexer error. Positions are character offsets into the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// Input ended inside a quoted string.
    #[error("Unexpected EOF")]
    UnterminatedQuote {
        /// Offset of the opening quote.
        position: usize,
    },

    /// A character no token class accepts.
    #[error("Unexpected character [{}] '{ch}'", char_code(.ch))]
    UnexpectedCharacter {
        /// The offending character.
        ch: char,
        /// Offset of the character.
        position: usize,
    },
}

impl LexError {
    /// Character offset where the error was detected.
    pub fn position(&self) -> usize {
        match self {
            Self::UnterminatedQuote { position } | Self::UnexpectedCharacter { position, .. } => {
                *position
            }
        }
    }
}

/// Grammar error: the token stream does not fit the query grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    /// A required token had the wrong kind.
    #[error("Expected token {expected} but {found} found")]
    Mismatch {
        /// Kind the grammar required.
        expected: TokenKind,
        /// Kind actually present.
        found: TokenKind,
        /// Offset of the offending token.
        position: usize,
    },

    /// A required token was missing because input was exhausted.
    #[error("Expected token {expected} but nothing found")]
    Exhausted {
        /// Kind the grammar required.
        expected: TokenKind,
        /// Offset at which input ran out.
        position: usize,
    },

    /// A key followed by `:` had no value.
    #[error("Expected text")]
    ExpectedText {
        /// Offset where the value should have started.
        position: usize,
    },

    /// Groups were nested past the parser's limit.
    #[error("Groups nested deeper than {limit}")]
    TooDeep {
        /// Maximum number of open groups.
        limit: usize,
        /// Offset of the `(` that crossed the limit.
        position: usize,
    },
}

impl GrammarError {
    /// Character offset of the token the error refers to.
    pub fn position(&self) -> usize {
        match self {
            Self::Mismatch { position, .. }
            | Self::Exhausted { position, .. }
            | Self::ExpectedText { position }
            | Self::TooDeep { position, .. } => *position,
        }
    }
}

/// Any failure of a parse. No partial tree survives an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// Tokenization failed.
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The token stream does not fit the grammar.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// A token's kind and payload disagree.
    #[error("internal error: {kind} token carries no text")]
    Invariant {
        /// Kind of the malformed token.
        kind: TokenKind,
    },
}

impl QueryError {
    /// Returns true for errors caused by the input rather than by a defect.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, Self::Invariant { .. })
    }

    /// Character offset of the error, if known.
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Lex(err) => Some(err.position()),
            Self::Grammar(err) => Some(err.position()),
            Self::Invariant { .. } => None,
        }
    }

    /// Returns a suggestion for common errors.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Lex(LexError::UnterminatedQuote { .. }) => {
                Some("Add a closing quote (\") to complete the quoted text")
            }
            Self::Grammar(
                GrammarError::Mismatch {
                    expected: TokenKind::CloseParen,
                    ..
                }
                | GrammarError::Exhausted {
                    expected: TokenKind::CloseParen,
                    ..
                },
            ) => Some("Add a closing parenthesis ) to match the opening one"),
            Self::Grammar(GrammarError::ExpectedText { .. }) => {
                Some("A key followed by ':' needs a value, e.g. 'key:value'")
            }
            _ => None,
        }
    }

    /// Formats the error against the query it came from, with a position indicator
    /// and a hint where one applies.
    pub fn render(&self, query: &str) -> String {
        let prefix = if self.is_input_error() {
            "query syntax error"
        } else {
            "query parser bug"
        };

        let mut out = String::new();
        out.push_str(&format!("{prefix}: {self}\n"));
        out.push_str(&format!("  {query}\n"));
        if let Some(pos) = self.position() {
            let clamped = pos.min(query.chars().count());
            out.push_str(&format!("  {}^\n", " ".repeat(clamped)));
        }
        if let Some(suggestion) = self.suggestion() {
            out.push_str(&format!("hint: {suggestion}"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_messages() {
        assert_eq!(
            LexError::UnterminatedQuote { position: 3 }.to_string(),
            "Unexpected EOF"
        );
        assert_eq!(
            LexError::UnexpectedCharacter {
                ch: 'A',
                position: 0
            }
            .to_string(),
            "Unexpected character [65] 'A'"
        );
    }

    #[test]
    fn grammar_messages() {
        let mismatch = GrammarError::Mismatch {
            expected: TokenKind::CloseParen,
            found: TokenKind::Eof,
            position: 3,
        };
        assert_eq!(
            mismatch.to_string(),
            "Expected token CLOSE_PAREN but EOF found"
        );

        let exhausted = GrammarError::Exhausted {
            expected: TokenKind::Text,
            position: 0,
        };
        assert_eq!(exhausted.to_string(), "Expected token TEXT but nothing found");

        assert_eq!(
            GrammarError::ExpectedText { position: 4 }.to_string(),
            "Expected text"
        );
    }

    #[test]
    fn query_error_is_transparent() {
        let err = QueryError::from(LexError::UnterminatedQuote { position: 0 });
        assert_eq!(err.to_string(), "Unexpected EOF");
        assert_eq!(err.position(), Some(0));
        assert!(err.is_input_error());
    }

    #[test]
    fn invariant_is_not_input_error() {
        let err = QueryError::Invariant {
            kind: TokenKind::Text,
        };
        assert!(!err.is_input_error());
        assert_eq!(err.position(), None);
        assert!(err.render("abc").starts_with("query parser bug"));
    }

    #[test]
    fn render_points_at_position() {
        let err = QueryError::from(GrammarError::Mismatch {
            expected: TokenKind::CloseParen,
            found: TokenKind::Eof,
            position: 5,
        });
        let rendered = err.render("(rust");
        assert!(rendered.contains("Expected token CLOSE_PAREN but EOF found"));
        assert!(rendered.contains("  (rust\n"));
        assert!(rendered.contains("       ^"));
        assert!(rendered.contains("hint: Add a closing parenthesis"));
    }

    #[test]
    fn render_clamps_position() {
        let err = QueryError::from(GrammarError::ExpectedText { position: 99 });
        let rendered = err.render("k:");
        assert!(rendered.contains("    ^"));
        assert!(rendered.contains("hint:"));
    }

    #[test]
    fn no_suggestion_for_other_mismatch() {
        let err = QueryError::from(GrammarError::Mismatch {
            expected: TokenKind::Text,
            found: TokenKind::Colon,
            position: 0,
        });
        assert_eq!(err.suggestion(), None);
    }
}

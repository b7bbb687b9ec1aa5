//! Query lexer (tokenizer).
//!
//! Pulls characters from a character source one at a time and classifies each run into a
//! single [`Token`]. Classification is driven by an ordered list of independent token
//! classes: the first class that accepts the starting character owns the whole token.

use std::{fmt, iter::Peekable};

use log::trace;
use serde::Serialize;

use crate::error::LexError;

/// Opens and closes a quoted string.
const QUOTE: char = '"';

/// Makes the following character inside a quoted string literal.
const ESCAPE: char = '\\';

/// Characters that end a bare text run.
const TEXT_TERMINATORS: [char; 7] = [':', '*', '(', ')', '=', '<', '>'];

/// The kind of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    /// `:` separating a key from its value.
    Colon,
    /// `*`.
    Star,
    /// `-` negation prefix.
    Neg,
    /// `(`.
    OpenParen,
    /// `)`.
    CloseParen,
    /// A bare word or the content of a quoted string.
    Text,
    /// A run of whitespace.
    Whitespace,
    /// End of input.
    Eof,
    /// `=`.
    Eq,
    /// `<`.
    Lt,
    /// `>`.
    Gt,
}

impl TokenKind {
    /// Returns the upper-case name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Colon => "COLON",
            Self::Star => "STAR",
            Self::Neg => "NEG",
            Self::OpenParen => "OPEN_PAREN",
            Self::CloseParen => "CLOSE_PAREN",
            Self::Text => "TEXT",
            Self::Whitespace => "WHITESPACE",
            Self::Eof => "EOF",
            Self::Eq => "EQ",
            Self::Lt => "LT",
            Self::Gt => "GT",
        }
    }

    /// Returns true for kinds whose tokens carry the matched text.
    pub fn carries_text(self) -> bool {
        matches!(self, Self::Text | Self::Whitespace)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A token in the query language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    /// What the token is.
    kind: TokenKind,
    /// Matched text, present for TEXT and WHITESPACE tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

impl Token {
    /// Creates a token without text.
    pub fn new(kind: TokenKind) -> Self {
        Self { kind, text: None }
    }

    /// Creates a token carrying matched text.
    pub fn with_text(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: Some(text.into()),
        }
    }

    /// The kind of this token.
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// The matched text, if this token carries any.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Consumes the token, returning its text.
    pub fn into_text(self) -> Option<String> {
        self.text
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{}({text:?})", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

/// A class of tokens, recognized by the first character of the token.
#[derive(Debug, Clone, Copy)]
enum TokenClass {
    /// A run of whitespace.
    Whitespace,
    /// A single reserved character.
    Single(char, TokenKind),
    /// A double-quoted string with backslash escapes.
    Quoted,
    /// A run of non-whitespace characters up to a terminator.
    Text,
}

/// Token classes in priority order.
const CLASSES: [TokenClass; 11] = [
    TokenClass::Whitespace,
    TokenClass::Single(':', TokenKind::Colon),
    TokenClass::Single('*', TokenKind::Star),
    TokenClass::Single('-', TokenKind::Neg),
    TokenClass::Single('(', TokenKind::OpenParen),
    TokenClass::Single(')', TokenKind::CloseParen),
    TokenClass::Single('=', TokenKind::Eq),
    TokenClass::Single('<', TokenKind::Lt),
    TokenClass::Single('>', TokenKind::Gt),
    TokenClass::Quoted,
    TokenClass::Text,
];

impl TokenClass {
    /// Returns true if a token of this class can start with `ch`.
    fn starts_with(self, ch: char) -> bool {
        match self {
            Self::Whitespace => ch.is_whitespace(),
            Self::Single(reserved, _) => ch == reserved,
            Self::Quoted => ch == QUOTE,
            Self::Text => !ch.is_whitespace(),
        }
    }
}

/// Returns true if `ch` may continue a bare text run.
fn continues_text(ch: char) -> bool {
    !ch.is_whitespace() && !TEXT_TERMINATORS.contains(&ch)
}

/// Tokenizes a character source one token at a time.
///
/// The lexer emits exactly one [`TokenKind::Eof`] token when the source is exhausted.
/// After that, and after any error, [`Lexer::next_token`] returns `Ok(None)`.
pub struct Lexer<I: Iterator<Item = char>> {
    /// Character source with one character of lookahead.
    chars: Peekable<I>,
    /// Character offset of the next unread character.
    position: usize,
    /// Set once EOF has been emitted or an error was raised.
    finished: bool,
}

impl<I: Iterator<Item = char>> Lexer<I> {
    /// Creates a lexer over a character source.
    pub fn new<S>(source: S) -> Self
    where
        S: IntoIterator<IntoIter = I>,
    {
        Self {
            chars: source.into_iter().peekable(),
            position: 0,
            finished: false,
        }
    }

    /// Character offset of the next unread character.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the next token, or `None` once EOF has already been emitted.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        if self.finished {
            return Ok(None);
        }

        let start = self.position;
        let Some(&ch) = self.chars.peek() else {
            self.finished = true;
            trace!("lexed EOF at {start}");
            return Ok(Some(Token::new(TokenKind::Eof)));
        };

        match self.scan(ch, start) {
            Ok(token) => {
                trace!("lexed {token} at {start}");
                Ok(Some(token))
            }
            Err(err) => {
                self.finished = true;
                Err(err)
            }
        }
    }

    /// Scans one token starting with `ch`, using the first class that accepts it.
    fn scan(&mut self, ch: char, start: usize) -> Result<Token, LexError> {
        let class = CLASSES
            .iter()
            .copied()
            .find(|class| class.starts_with(ch))
            .ok_or(LexError::UnexpectedCharacter {
                ch,
                position: start,
            })?;

        match class {
            TokenClass::Whitespace => Ok(Token::with_text(
                TokenKind::Whitespace,
                self.take_while(char::is_whitespace),
            )),
            TokenClass::Single(_, kind) => {
                self.advance();
                Ok(Token::new(kind))
            }
            TokenClass::Quoted => self.read_quoted(start),
            TokenClass::Text => Ok(Token::with_text(
                TokenKind::Text,
                self.take_while(continues_text),
            )),
        }
    }

    /// Reads a quoted string, returning its unescaped content as a TEXT token.
    fn read_quoted(&mut self, start: usize) -> Result<Token, LexError> {
        self.advance(); // opening quote

        let mut content = String::new();
        loop {
            match self.advance() {
                Some(QUOTE) => return Ok(Token::with_text(TokenKind::Text, content)),
                Some(ESCAPE) => match self.advance() {
                    Some(escaped) => content.push(escaped),
                    None => return Err(LexError::UnterminatedQuote { position: start }),
                },
                Some(ch) => content.push(ch),
                None => return Err(LexError::UnterminatedQuote { position: start }),
            }
        }
    }

    /// Consumes characters while `accept` holds, returning them.
    fn take_while(&mut self, mut accept: impl FnMut(char) -> bool) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if !accept(ch) {
                break;
            }
            text.push(ch);
            self.advance();
        }
        text
    }

    /// Consumes one character.
    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        self.position += 1;
        Some(ch)
    }
}

impl<I: Iterator<Item = char>> Iterator for Lexer<I> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

/// Tokenizes a query string, including the trailing EOF token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input.chars()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Token {
        Token::with_text(TokenKind::Text, s)
    }

    fn ws(s: &str) -> Token {
        Token::with_text(TokenKind::Whitespace, s)
    }

    fn kind(kind: TokenKind) -> Token {
        Token::new(kind)
    }

    /// Returns the first token lexed from `input`.
    fn first(input: &str) -> Token {
        Lexer::new(input.chars()).next_token().unwrap().unwrap()
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokenize("").unwrap(), vec![kind(TokenKind::Eof)]);
    }

    #[test]
    fn eof_emitted_once() {
        let mut lexer = Lexer::new("".chars());
        assert_eq!(lexer.next_token().unwrap(), Some(kind(TokenKind::Eof)));
        assert_eq!(lexer.next_token().unwrap(), None);
        assert_eq!(lexer.next_token().unwrap(), None);
    }

    #[test]
    fn single_characters() {
        assert_eq!(first(":"), kind(TokenKind::Colon));
        assert_eq!(first("*"), kind(TokenKind::Star));
        assert_eq!(first("-"), kind(TokenKind::Neg));
        assert_eq!(first("("), kind(TokenKind::OpenParen));
        assert_eq!(first(")"), kind(TokenKind::CloseParen));
        assert_eq!(first("="), kind(TokenKind::Eq));
        assert_eq!(first("<"), kind(TokenKind::Lt));
        assert_eq!(first(">"), kind(TokenKind::Gt));
    }

    #[test]
    fn bare_text() {
        assert_eq!(first("A"), text("A"));
        assert_eq!(first("AB"), text("AB"));
    }

    #[test]
    fn whitespace_runs() {
        assert_eq!(first(" "), ws(" "));
        assert_eq!(first("  "), ws("  "));
        assert_eq!(first(" \t\n x"), ws(" \t\n "));
    }

    #[test]
    fn quoted_text() {
        assert_eq!(first("\"\""), text(""));
        assert_eq!(first("\"A\""), text("A"));
        assert_eq!(first("\"AB\""), text("AB"));
        assert_eq!(first("\"a b:c\""), text("a b:c"));
    }

    #[test]
    fn quoted_escapes() {
        assert_eq!(first("\"\\\"\""), text("\""));
        assert_eq!(first("\"a\\\\b\""), text("a\\b"));
        assert_eq!(first("\"\\n\""), text("n"));
    }

    #[test]
    fn unterminated_quote() {
        let err = Lexer::new("\"".chars()).next_token().unwrap_err();
        assert_eq!(err.to_string(), "Unexpected EOF");
        assert_eq!(err, LexError::UnterminatedQuote { position: 0 });
    }

    #[test]
    fn unterminated_after_escape() {
        let err = tokenize("abc \"x\\").unwrap_err();
        assert_eq!(err, LexError::UnterminatedQuote { position: 4 });
    }

    #[test]
    fn lexer_stops_after_error() {
        let mut lexer = Lexer::new("\"open".chars());
        assert!(lexer.next_token().is_err());
        assert_eq!(lexer.next_token().unwrap(), None);
    }

    #[test]
    fn key_value() {
        assert_eq!(
            tokenize("key:value").unwrap(),
            vec![
                text("key"),
                kind(TokenKind::Colon),
                text("value"),
                kind(TokenKind::Eof)
            ]
        );
    }

    #[test]
    fn negated_key_value() {
        assert_eq!(
            tokenize("-key:value").unwrap(),
            vec![
                kind(TokenKind::Neg),
                text("key"),
                kind(TokenKind::Colon),
                text("value"),
                kind(TokenKind::Eof)
            ]
        );
    }

    #[test]
    fn hyphen_inside_word() {
        assert_eq!(
            tokenize("foo-bar").unwrap(),
            vec![text("foo-bar"), kind(TokenKind::Eof)]
        );
    }

    #[test]
    fn quote_inside_word() {
        assert_eq!(
            tokenize("ab\"c").unwrap(),
            vec![text("ab\"c"), kind(TokenKind::Eof)]
        );
    }

    #[test]
    fn comparisons_split_words() {
        assert_eq!(
            tokenize("t1>t2").unwrap(),
            vec![
                text("t1"),
                kind(TokenKind::Gt),
                text("t2"),
                kind(TokenKind::Eof)
            ]
        );
        assert_eq!(
            tokenize("a=b<c").unwrap(),
            vec![
                text("a"),
                kind(TokenKind::Eq),
                text("b"),
                kind(TokenKind::Lt),
                text("c"),
                kind(TokenKind::Eof)
            ]
        );
    }

    #[test]
    fn grouped_query() {
        assert_eq!(
            tokenize("(a OR b) c*").unwrap(),
            vec![
                kind(TokenKind::OpenParen),
                text("a"),
                ws(" "),
                text("OR"),
                ws(" "),
                text("b"),
                kind(TokenKind::CloseParen),
                ws(" "),
                text("c"),
                kind(TokenKind::Star),
                kind(TokenKind::Eof)
            ]
        );
    }

    #[test]
    fn positions_count_characters() {
        let mut lexer = Lexer::new("é \"x".chars());
        lexer.next_token().unwrap();
        assert_eq!(lexer.position(), 1);
        lexer.next_token().unwrap();
        assert_eq!(lexer.position(), 2);
        assert_eq!(
            lexer.next_token().unwrap_err(),
            LexError::UnterminatedQuote { position: 2 }
        );
    }

    #[test]
    fn token_display() {
        assert_eq!(text("a b").to_string(), "TEXT(\"a b\")");
        assert_eq!(kind(TokenKind::OpenParen).to_string(), "OPEN_PAREN");
    }

    #[test]
    fn text_payload_follows_kind() {
        for token in tokenize("a :b ( ) - \"q\"").unwrap() {
            assert_eq!(token.text().is_some(), token.kind().carries_text());
        }
    }
}

//! Query parser.
//!
//! Recursive descent over the token stream with a single token of lookahead. Tokens are
//! pulled from the lexer only when the grammar asks for them, and a token is consumed only
//! when a rule matches it.
//!
//! # Grammar
//!
//! ```text
//! statement  → or+
//! or         → and ("OR" and)?
//! and        → comparison ("AND" comparison)?
//! comparison → lt
//! lt         → gt ("<" gt)?
//! gt         → eq (">" eq)?
//! eq         → factor ("=" factor)?
//! factor     → key_value | "(" statement ")"
//! key_value  → "-"? TEXT (":" TEXT)?
//! ```
//!
//! `AND` and `OR` are TEXT tokens compared case-insensitively. Whitespace is skipped
//! wherever it may appear between tokens.
//!
//! The rules are lenient where the query is merely incomplete: an operator with no right
//! operand is dropped, and a `-` with no key after it becomes the text `-`. A statement
//! stops at EOF, or at the first token no rule accepts.

use log::{debug, trace};

use crate::{
    ast::{ComparisonOp, Node},
    error::{GrammarError, QueryError},
    lexer::{Lexer, Token, TokenKind},
};

/// Comparison operators from the outermost cascade level to the innermost.
const COMPARISON_CASCADE: [ComparisonOp; 3] =
    [ComparisonOp::Lt, ComparisonOp::Gt, ComparisonOp::Eq];

/// Keyword for a disjunction.
const OR_KEYWORD: &str = "OR";

/// Keyword for a conjunction.
const AND_KEYWORD: &str = "AND";

/// Text of the node produced by a `-` that has no key after it.
const LONE_NEGATION: &str = "-";

/// Maximum number of groups open at once. Each group recurses through every rule.
pub const MAX_NESTING: usize = 128;

/// Result of a grammar rule: `None` when the rule does not apply at this point.
type Rule = Result<Option<Node>, QueryError>;

/// Recursive descent parser over a character source.
pub struct Parser<I: Iterator<Item = char>> {
    /// Token source.
    lexer: Lexer<I>,
    /// Fetched but unconsumed token, `None` when the next token has not been fetched.
    lookahead: Option<Token>,
    /// Character offset where the lookahead token starts.
    position: usize,
    /// Number of groups currently open.
    depth: usize,
}

impl<I: Iterator<Item = char>> Parser<I> {
    /// Creates a parser over a character source, such as `query.chars()`.
    pub fn new<S>(source: S) -> Self
    where
        S: IntoIterator<IntoIter = I>,
    {
        Self {
            lexer: Lexer::new(source),
            lookahead: None,
            position: 0,
            depth: 0,
        }
    }

    /// Parses one top-level statement.
    ///
    /// Returns `Ok(None)` when the input contains nothing parseable, such as an empty or
    /// whitespace-only query. Groups nested more than [`MAX_NESTING`] deep are rejected.
    pub fn statement(&mut self) -> Rule {
        let mut nodes = Vec::new();
        while let Some(node) = self.or()? {
            nodes.push(node);
            if self.peek(TokenKind::Eof)?.is_some() {
                break;
            }
        }

        let node = match nodes.len() {
            0 => None,
            1 => nodes.pop(),
            _ => Some(Node::statement(nodes)),
        };
        debug!("parsed statement ending at {}: {node:?}", self.position);
        Ok(node)
    }

    /// Parses: or → and ("OR" and)?
    fn or(&mut self) -> Rule {
        let Some(left) = self.and()? else {
            return Ok(None);
        };
        if self.at_keyword(OR_KEYWORD)? {
            self.expect_text()?;
            if let Some(right) = self.and()? {
                return Ok(Some(Node::or(left, right)));
            }
        }
        Ok(Some(left))
    }

    /// Parses: and → comparison ("AND" comparison)?
    fn and(&mut self) -> Rule {
        let Some(left) = self.comparison(0)? else {
            return Ok(None);
        };
        if self.at_keyword(AND_KEYWORD)? {
            self.expect_text()?;
            if let Some(right) = self.comparison(0)? {
                return Ok(Some(Node::and(left, right)));
            }
        }
        Ok(Some(left))
    }

    /// Parses one level of the comparison cascade.
    ///
    /// Each level wraps the next and produces at most one comparison node of its own
    /// operator; the level past the last operator is a factor.
    fn comparison(&mut self, level: usize) -> Rule {
        let Some(&operator) = COMPARISON_CASCADE.get(level) else {
            return self.factor();
        };
        let Some(left) = self.comparison(level + 1)? else {
            return Ok(None);
        };
        if self.consume_if(operator.token_kind())?.is_some()
            && let Some(right) = self.comparison(level + 1)?
        {
            return Ok(Some(Node::comparison(operator, left, right)));
        }
        Ok(Some(left))
    }

    /// Parses: factor → key_value | "(" statement ")"
    fn factor(&mut self) -> Rule {
        self.skip_whitespace()?;
        if let Some(node) = self.key_value()? {
            return Ok(Some(node));
        }
        self.bracketed()
    }

    /// Parses: key_value → "-"? TEXT (":" TEXT)?
    ///
    /// A key without `:` is plain text and drops any preceding `-`. A `-` without a key
    /// is the text `-`.
    fn key_value(&mut self) -> Rule {
        self.skip_whitespace()?;
        let negated = self.consume_if(TokenKind::Neg)?.is_some();
        self.skip_whitespace()?;

        let Some(key) = self.accept_text()? else {
            return Ok(negated.then(|| Node::text(LONE_NEGATION)));
        };
        if self.consume_if(TokenKind::Colon)?.is_none() {
            return Ok(Some(Node::text(key)));
        }
        let value = self.expect_text()?;
        Ok(Some(Node::key_value(negated, key, value)))
    }

    /// Parses: "(" statement ")"
    fn bracketed(&mut self) -> Rule {
        if self.consume_if(TokenKind::OpenParen)?.is_none() {
            return Ok(None);
        }
        if self.depth == MAX_NESTING {
            return Err(GrammarError::TooDeep {
                limit: MAX_NESTING,
                position: self.position,
            }
            .into());
        }
        self.depth += 1;
        let inner = self.statement();
        self.depth -= 1;
        let inner = inner?;
        self.require(TokenKind::CloseParen)?;
        Ok(inner)
    }

    /// Returns true if the next non-whitespace token is the given keyword.
    fn at_keyword(&mut self, keyword: &str) -> Result<bool, QueryError> {
        self.skip_whitespace()?;
        Ok(self
            .peek(TokenKind::Text)?
            .and_then(Token::text)
            .is_some_and(|text| text.eq_ignore_ascii_case(keyword)))
    }

    /// Consumes a TEXT token and any whitespace around it.
    fn accept_text(&mut self) -> Result<Option<String>, QueryError> {
        self.skip_whitespace()?;
        let Some(token) = self.consume_if(TokenKind::Text)? else {
            return Ok(None);
        };
        let text = text_of(token)?;
        self.skip_whitespace()?;
        Ok(Some(text))
    }

    /// Like [`Self::accept_text`], but the text is mandatory.
    fn expect_text(&mut self) -> Result<String, QueryError> {
        match self.accept_text()? {
            Some(text) => Ok(text),
            None => Err(GrammarError::ExpectedText {
                position: self.position,
            }
            .into()),
        }
    }

    /// Consumes a whitespace token if one is next.
    fn skip_whitespace(&mut self) -> Result<(), QueryError> {
        self.consume_if(TokenKind::Whitespace)?;
        Ok(())
    }

    /// Returns the lookahead token, fetching it from the lexer if needed.
    fn fill(&mut self) -> Result<Option<&Token>, QueryError> {
        if self.lookahead.is_none() {
            self.position = self.lexer.position();
            self.lookahead = self.lexer.next_token()?;
            trace!("lookahead {:?} at {}", self.lookahead, self.position);
        }
        Ok(self.lookahead.as_ref())
    }

    /// Returns the lookahead token if it has the given kind, without consuming it.
    fn peek(&mut self, kind: TokenKind) -> Result<Option<&Token>, QueryError> {
        Ok(self.fill()?.filter(|token| token.kind() == kind))
    }

    /// Consumes and returns the lookahead token if it has the given kind.
    fn consume_if(&mut self, kind: TokenKind) -> Result<Option<Token>, QueryError> {
        if self.peek(kind)?.is_some() {
            Ok(self.lookahead.take())
        } else {
            Ok(None)
        }
    }

    /// Consumes the lookahead token, which must have the given kind.
    fn require(&mut self, kind: TokenKind) -> Result<Token, QueryError> {
        self.fill()?;
        let position = self.position;
        match self.lookahead.take() {
            Some(token) if token.kind() == kind => Ok(token),
            Some(token) => Err(GrammarError::Mismatch {
                expected: kind,
                found: token.kind(),
                position,
            }
            .into()),
            None => Err(GrammarError::Exhausted {
                expected: kind,
                position,
            }
            .into()),
        }
    }
}

/// Extracts the text of a TEXT token.
fn text_of(token: Token) -> Result<String, QueryError> {
    let kind = token.kind();
    token.into_text().ok_or(QueryError::Invariant { kind })
}

/// Parses a query string.
///
/// Returns `Ok(None)` for queries with nothing to parse, `Ok(Some(node))` for valid
/// queries, or the first lexing or grammar error.
pub fn parse(input: &str) -> Result<Option<Node>, QueryError> {
    Parser::new(input.chars()).statement()
}

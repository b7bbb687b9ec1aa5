//! Lexer, parser and AST for key:value boolean queries.
//!
//! The query language looks like search-engine query syntax:
//!
//! - **Terms**: `rust` - bare words
//! - **Quoted text**: `"error handling"` - with `\` escaping the next character
//! - **Filters**: `title:guide` - key/value pairs
//! - **Negated filters**: `-status:deprecated`
//! - **Comparisons**: `price<10`, `rating>4`, `lang=en`
//! - **AND / OR**: `a AND b OR c` - case-insensitive keywords, AND binds tighter
//! - **Grouping**: `(a OR b) c` - juxtaposed nodes form a statement
//!
//! The parser knows nothing about what keys and values mean. Consumers walk the tree
//! directly, or flatten it with [`to_polish_notation`] or [`to_stack`].
//!
//! # Example
//!
//! ```
//! use colon_query::{parse, to_polish_notation};
//!
//! let node = parse("title:guide AND (rust OR golang)").unwrap().unwrap();
//! assert_eq!(
//!     to_polish_notation(&node),
//!     ["AND", ":", "title", "guide", "OR", "rust", "golang"]
//! );
//! ```

#![warn(missing_docs)]

mod ast;
mod error;
mod lexer;
mod notation;
mod parser;

pub use ast::{ComparisonOp, Node};
pub use error::{GrammarError, LexError, QueryError};
pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use notation::{to_polish_notation, to_stack};
pub use parser::{MAX_NESTING, Parser, parse};

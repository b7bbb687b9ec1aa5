//! Query abstract syntax tree.
//!
//! Nodes are built bottom-up by the parser and never mutated afterwards. Binary nodes own
//! their operands exclusively, so a tree is always finite and acyclic.

use std::fmt;

use serde::Serialize;

use crate::lexer::TokenKind;

/// Comparison operator of a [`Node::Comparison`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ComparisonOp {
    /// `=`
    #[serde(rename = "=")]
    Eq,
    /// `<`
    #[serde(rename = "<")]
    Lt,
    /// `>`
    #[serde(rename = ">")]
    Gt,
}

impl ComparisonOp {
    /// The operator as written in a query.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
        }
    }

    /// The token that spells this operator.
    pub fn token_kind(self) -> TokenKind {
        match self {
            Self::Eq => TokenKind::Eq,
            Self::Lt => TokenKind::Lt,
            Self::Gt => TokenKind::Gt,
        }
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A parsed query node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// A bare word or the content of a quoted string.
    Text {
        /// The word, without quotes.
        value: String,
    },

    /// A `key:value` filter, optionally negated with a leading `-`.
    KeyValue {
        /// True for `-key:value`.
        negated: bool,
        /// Text before the colon.
        key: String,
        /// Text after the colon.
        value: String,
    },

    /// A binary comparison such as `price<10`.
    Comparison {
        /// The operator.
        operator: ComparisonOp,
        /// Left operand.
        left: Box<Self>,
        /// Right operand.
        right: Box<Self>,
    },

    /// Both operands must match.
    And {
        /// Left operand.
        left: Box<Self>,
        /// Right operand.
        right: Box<Self>,
    },

    /// At least one operand must match.
    Or {
        /// Left operand.
        left: Box<Self>,
        /// Right operand.
        right: Box<Self>,
    },

    /// Two or more juxtaposed nodes with no operator between them.
    Statement {
        /// Nodes in the order they appeared.
        children: Vec<Self>,
    },
}

impl Node {
    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
        }
    }

    /// Creates a key/value node.
    pub fn key_value(negated: bool, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::KeyValue {
            negated,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a comparison node.
    pub fn comparison(operator: ComparisonOp, left: Self, right: Self) -> Self {
        Self::Comparison {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates an AND node.
    pub fn and(left: Self, right: Self) -> Self {
        Self::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates an OR node.
    pub fn or(left: Self, right: Self) -> Self {
        Self::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a statement node.
    pub fn statement(children: Vec<Self>) -> Self {
        Self::Statement { children }
    }

    /// Returns true for nodes without children.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Text { .. } | Self::KeyValue { .. })
    }

    /// Visits this node and all of its descendants in pre-order: a node before its
    /// children, children left to right.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Self)) {
        visit(self);
        match self {
            Self::Text { .. } | Self::KeyValue { .. } => {}
            Self::Comparison { left, right, .. }
            | Self::And { left, right }
            | Self::Or { left, right } => {
                left.walk(visit);
                right.walk(visit);
            }
            Self::Statement { children } => {
                for child in children {
                    child.walk(visit);
                }
            }
        }
    }

    /// Names the node without its children, as in one line of the tree rendering.
    pub fn label(&self) -> String {
        match self {
            Self::Text { value } => format!("Text({value:?})"),
            Self::KeyValue {
                negated,
                key,
                value,
            } => {
                let neg = if *negated { "-" } else { "" };
                format!("KeyValue({neg}{key:?}:{value:?})")
            }
            Self::Comparison { operator, .. } => format!("Comparison({operator})"),
            Self::And { .. } => "And".to_string(),
            Self::Or { .. } => "Or".to_string(),
            Self::Statement { .. } => "Statement".to_string(),
        }
    }

    /// Formats the node as an indented tree.
    fn fmt_tree(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        writeln!(f, "{}{}", "  ".repeat(indent), self.label())?;
        match self {
            Self::Text { .. } | Self::KeyValue { .. } => Ok(()),
            Self::Comparison { left, right, .. }
            | Self::And { left, right }
            | Self::Or { left, right } => {
                left.fmt_tree(f, indent + 1)?;
                right.fmt_tree(f, indent + 1)
            }
            Self::Statement { children } => {
                for child in children {
                    child.fmt_tree(f, indent + 1)?;
                }
                Ok(())
            }
        }
    }

    /// Formats the node as a query string that parses back to the same tree.
    ///
    /// Text that would not lex as a single bare word is quoted, and operands that the
    /// grammar would otherwise split differently are parenthesised. Quotes do not stop
    /// `AND`/`OR` from being read as operators, so text and keys equal to a keyword are
    /// wrapped in a group of their own.
    pub fn to_query_string(&self) -> String {
        match self {
            Self::Text { value } if is_keyword(value) => format!("({value})"),
            Self::Text { value } => quote_if_needed(value),
            Self::KeyValue {
                negated,
                key,
                value,
            } => {
                let neg = if *negated { "-" } else { "" };
                let pair = format!("{neg}{}:{}", quote_if_needed(key), quote_if_needed(value));
                if is_keyword(key) {
                    format!("({pair})")
                } else {
                    pair
                }
            }
            Self::Comparison {
                operator,
                left,
                right,
            } => format!(
                "{}{operator}{}",
                left.comparison_operand(),
                right.comparison_operand()
            ),
            Self::And { left, right } => format!(
                "{} AND {}",
                left.boolean_operand(),
                right.boolean_operand()
            ),
            Self::Or { left, right } => format!(
                "{} OR {}",
                left.boolean_operand(),
                right.boolean_operand()
            ),
            Self::Statement { children } => children
                .iter()
                .map(|child| match child {
                    Self::Statement { .. } => child.grouped(),
                    _ => child.to_query_string(),
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// The node wrapped in parentheses.
    fn grouped(&self) -> String {
        format!("({})", self.to_query_string())
    }

    /// Renders an operand of `AND`/`OR`. Only comparisons and leaves bind tighter.
    fn boolean_operand(&self) -> String {
        match self {
            Self::And { .. } | Self::Or { .. } | Self::Statement { .. } => self.grouped(),
            _ => self.to_query_string(),
        }
    }

    /// Renders an operand of a comparison.
    fn comparison_operand(&self) -> String {
        if self.is_leaf() {
            self.to_query_string()
        } else {
            self.grouped()
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_tree(f, 0)
    }
}

/// Returns true if `text` reads as the `AND` or `OR` operator wherever an operator may
/// follow.
fn is_keyword(text: &str) -> bool {
    text.eq_ignore_ascii_case("AND") || text.eq_ignore_ascii_case("OR")
}

/// Returns true if `text` lexes back as exactly one bare TEXT token with the same value.
fn is_bare_word(text: &str) -> bool {
    let Some(first) = text.chars().next() else {
        return false;
    };
    first != '-'
        && first != '"'
        && !text
            .chars()
            .any(|ch| ch.is_whitespace() || matches!(ch, ':' | '*' | '(' | ')' | '=' | '<' | '>'))
}

/// Quotes `text` unless it is a bare word.
fn quote_if_needed(text: &str) -> String {
    if is_bare_word(text) {
        return text.to_string();
    }
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for ch in text.chars() {
        if ch == '"' || ch == '\\' {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> Node {
        Node::text(s)
    }

    #[test]
    fn walk_is_pre_order() {
        let tree = Node::statement(vec![Node::or(t("a"), Node::and(t("b"), t("c"))), t("d")]);
        let mut seen = Vec::new();
        tree.walk(&mut |node| {
            seen.push(match node {
                Node::Text { value } => value.as_str(),
                Node::And { .. } => "AND",
                Node::Or { .. } => "OR",
                Node::Statement { .. } => ",",
                _ => "?",
            })
        });
        assert_eq!(seen, [",", "OR", "a", "AND", "b", "c", "d"]);
    }

    #[test]
    fn labels_omit_children() {
        let tree = Node::or(Node::and(t("a"), t("b")), t("c"));
        assert_eq!(tree.label(), "Or");
        assert_eq!(t("a").label(), "Text(\"a\")");
        assert_eq!(Node::key_value(true, "k", "v").label(), "KeyValue(-\"k\":\"v\")");
        assert_eq!(
            Node::comparison(ComparisonOp::Lt, t("a"), t("b")).label(),
            "Comparison(<)"
        );
        assert_eq!(Node::statement(vec![t("a"), t("b")]).label(), "Statement");
    }

    #[test]
    fn tree_display() {
        let tree = Node::and(
            Node::key_value(true, "k", "v"),
            Node::comparison(ComparisonOp::Gt, t("a"), t("b")),
        );
        assert_eq!(
            tree.to_string(),
            "And\n  KeyValue(-\"k\":\"v\")\n  Comparison(>)\n    Text(\"a\")\n    Text(\"b\")\n"
        );
    }

    #[test]
    fn query_string_leaves() {
        assert_eq!(t("rust").to_query_string(), "rust");
        assert_eq!(t("two words").to_query_string(), "\"two words\"");
        assert_eq!(t("").to_query_string(), "\"\"");
        assert_eq!(t("-").to_query_string(), "\"-\"");
        assert_eq!(t("say \"hi\"").to_query_string(), "\"say \\\"hi\\\"\"");
        assert_eq!(t("or").to_query_string(), "(or)");
        assert_eq!(
            Node::key_value(true, "AND", "x").to_query_string(),
            "(-AND:x)"
        );
        assert_eq!(
            Node::key_value(true, "title", "a:b").to_query_string(),
            "-title:\"a:b\""
        );
    }

    #[test]
    fn query_string_groups_operands() {
        let tree = Node::statement(vec![
            Node::and(Node::or(t("a"), t("b")), t("c")),
            Node::comparison(ComparisonOp::Lt, Node::and(t("x"), t("y")), t("z")),
        ]);
        assert_eq!(tree.to_query_string(), "(a OR b) AND c (x AND y)<z");
    }

    #[test]
    fn comparison_symbols() {
        assert_eq!(ComparisonOp::Eq.symbol(), "=");
        assert_eq!(ComparisonOp::Lt.token_kind(), TokenKind::Lt);
        assert_eq!(ComparisonOp::Gt.to_string(), ">");
    }
}

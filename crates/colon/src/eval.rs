//! Reference evaluator for parsed queries.
//!
//! [`evaluate`] walks the tree; [`evaluate_stack`] runs over the node stack produced by
//! [`to_stack`](colon_query::to_stack), popping nodes from the top so that leaves push
//! operands and operators pop theirs. Bare terms stay as text until an operator needs a
//! truth value, at which point they become "the document text contains this term". A
//! statement is the conjunction of its children. Comparisons take their operands as
//! text: the left names a document field and the right is the literal it is compared
//! with.

use std::cmp::Ordering;

use colon_query::{ComparisonOp, Node};
use log::{debug, trace};
use thiserror::Error;

use crate::document::Document;

/// Errors raised while evaluating a query.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EvalError {
    /// An operator found fewer than two operands on the stack.
    #[error("operator {operator} needs two operands")]
    Underflow {
        /// Label of the operator.
        operator: &'static str,
    },

    /// A comparison operand was not plain text.
    #[error("comparison {operator} needs a field name and a value")]
    NonTextComparison {
        /// The comparison operator.
        operator: ComparisonOp,
    },
}

/// A value on the evaluation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operand<'a> {
    /// A bare term, not yet matched against the document.
    Text(&'a str),
    /// A computed truth value.
    Bool(bool),
}

impl Operand<'_> {
    /// Returns the operand's truth value against a document.
    fn truth(self, doc: &Document) -> bool {
        match self {
            Self::Text(term) => doc.contains(term),
            Self::Bool(value) => value,
        }
    }
}

/// Evaluates a query tree against a document.
pub fn evaluate(node: &Node, doc: &Document) -> Result<bool, EvalError> {
    let result = operand(node, doc)?.truth(doc);
    debug!("query evaluated to {result}");
    Ok(result)
}

/// Evaluates one node to an operand. Both sides of an operator are evaluated, so an
/// error anywhere in the tree is reported.
fn operand<'a>(node: &'a Node, doc: &Document) -> Result<Operand<'a>, EvalError> {
    let result = match node {
        Node::Text { value } => Operand::Text(value),
        Node::KeyValue {
            negated,
            key,
            value,
        } => Operand::Bool((doc.field(key) == Some(value.as_str())) != *negated),
        Node::And { left, right } => {
            let (left, right) = (operand(left, doc)?, operand(right, doc)?);
            Operand::Bool(left.truth(doc) && right.truth(doc))
        }
        Node::Or { left, right } => {
            let (left, right) = (operand(left, doc)?, operand(right, doc)?);
            Operand::Bool(left.truth(doc) || right.truth(doc))
        }
        Node::Comparison {
            operator,
            left,
            right,
        } => {
            let (Node::Text { value: field }, Node::Text { value: literal }) =
                (left.as_ref(), right.as_ref())
            else {
                return Err(EvalError::NonTextComparison {
                    operator: *operator,
                });
            };
            Operand::Bool(compare(doc.field(field), *operator, literal))
        }
        Node::Statement { children } => {
            let mut all = true;
            for child in children {
                all &= operand(child, doc)?.truth(doc);
            }
            Operand::Bool(all)
        }
    };
    trace!("{} -> {result:?}", node.label());
    Ok(result)
}

/// Evaluates a node stack, top last, against a document.
///
/// Operands left over when the stack is empty, such as the children of a top-level
/// statement, are combined with AND. An empty stack matches every document.
///
/// The stack holds no statement headers, so a statement nested under an operator loses
/// its grouping: `(a b) OR c` stacks like `a OR b` followed by `c`. Use [`evaluate`] for
/// trees with nested statements.
pub fn evaluate_stack(mut stack: Vec<&Node>, doc: &Document) -> Result<bool, EvalError> {
    let mut operands: Vec<Operand<'_>> = Vec::new();

    while let Some(node) = stack.pop() {
        let operand = match node {
            Node::Text { value } => Operand::Text(value),
            Node::KeyValue {
                negated,
                key,
                value,
            } => Operand::Bool((doc.field(key) == Some(value.as_str())) != *negated),
            Node::And { .. } => {
                let (left, right) = pop_pair(&mut operands, "AND")?;
                Operand::Bool(left.truth(doc) && right.truth(doc))
            }
            Node::Or { .. } => {
                let (left, right) = pop_pair(&mut operands, "OR")?;
                Operand::Bool(left.truth(doc) || right.truth(doc))
            }
            Node::Comparison { operator, .. } => {
                let (left, right) = pop_pair(&mut operands, operator.symbol())?;
                let (Operand::Text(field), Operand::Text(literal)) = (left, right) else {
                    return Err(EvalError::NonTextComparison {
                        operator: *operator,
                    });
                };
                Operand::Bool(compare(doc.field(field), *operator, literal))
            }
            // Statements only group; their children carry the operands.
            Node::Statement { .. } => continue,
        };
        trace!("{node:?} -> {operand:?}");
        operands.push(operand);
    }

    let result = operands.into_iter().all(|operand| operand.truth(doc));
    debug!("query evaluated to {result}");
    Ok(result)
}

/// Pops an operator's operands: the first pop is the left operand.
fn pop_pair<'a>(
    operands: &mut Vec<Operand<'a>>,
    operator: &'static str,
) -> Result<(Operand<'a>, Operand<'a>), EvalError> {
    match (operands.pop(), operands.pop()) {
        (Some(left), Some(right)) => Ok((left, right)),
        _ => Err(EvalError::Underflow { operator }),
    }
}

/// Compares a field value with a literal.
///
/// Numbers compare numerically when both sides parse as numbers, otherwise the strings
/// compare lexicographically. A missing field never matches.
fn compare(field: Option<&str>, operator: ComparisonOp, literal: &str) -> bool {
    let Some(field) = field else {
        return false;
    };
    let ordering = match (field.trim().parse::<f64>(), literal.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b),
        _ => Some(field.cmp(literal)),
    };
    let wanted = match operator {
        ComparisonOp::Eq => Ordering::Equal,
        ComparisonOp::Lt => Ordering::Less,
        ComparisonOp::Gt => Ordering::Greater,
    };
    ordering == Some(wanted)
}

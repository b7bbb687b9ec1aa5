//! Linear forms of a query tree.
//!
//! Both traversals visit nodes in pre-order, an operator before its operands.

use crate::ast::Node;

/// Label emitted for a statement header.
const STATEMENT_LABEL: &str = ",";

/// Label emitted before a negated key/value.
const NEGATION_LABEL: &str = "-";

/// Label emitted before a key/value's key.
const KEY_VALUE_LABEL: &str = ":";

/// Converts a tree to prefix ("Polish") notation, one label per string.
///
/// `AND`, `OR` and comparison symbols precede their operands, `,` precedes the children
/// of a statement, and a key/value becomes `[-] : key value`.
pub fn to_polish_notation(node: &Node) -> Vec<String> {
    let mut labels = Vec::new();
    node.walk(&mut |node| match node {
        Node::Text { value } => labels.push(value.clone()),
        Node::KeyValue {
            negated,
            key,
            value,
        } => {
            if *negated {
                labels.push(NEGATION_LABEL.to_string());
            }
            labels.push(KEY_VALUE_LABEL.to_string());
            labels.push(key.clone());
            labels.push(value.clone());
        }
        Node::Comparison { operator, .. } => labels.push(operator.symbol().to_string()),
        Node::And { .. } => labels.push("AND".to_string()),
        Node::Or { .. } => labels.push("OR".to_string()),
        Node::Statement { .. } => labels.push(STATEMENT_LABEL.to_string()),
    });
    labels
}

/// Converts a tree to a stack of operator and leaf nodes.
///
/// Nodes are pushed in pre-order, statement headers are skipped. The last element is the
/// top of the stack, so popping yields operands before the operator that combines them.
pub fn to_stack(node: &Node) -> Vec<&Node> {
    let mut stack = Vec::new();
    node.walk(&mut |node| {
        if !matches!(node, Node::Statement { .. }) {
            stack.push(node);
        }
    });
    stack
}

//! Test helpers shared by the unit test modules.
#![cfg(test)]
#![allow(clippy::unwrap_used)]

use serde_json::Value;

use crate::node::Node;

/// Builds a payload tree from a JSON literal.
pub(crate) fn node(value: Value) -> Node {
    Node::from(value)
}

/// Converts an acyclic tree back to JSON.
pub(crate) fn to_value(node: &Node) -> Value {
    node.to_json().unwrap()
}

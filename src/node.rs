//! Payload tree model.
//!
//! Records and sequences are shared handles: cloning a [`Record`] or
//! [`Sequence`] clones the handle, not the contents. Two handles are the same
//! node when they point at the same allocation, which is what lets a payload
//! express shared sub-trees and reference cycles.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{
    Map,
    Number,
    Value,
};
use thiserror::Error;

/// Field map of a record, in insertion order.
pub type Fields = IndexMap<String, Node>;

/// Errors raised when converting a tree back to JSON.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// A record or sequence contains itself.
    #[error("Reference cycle at '{path}' cannot be represented as JSON")]
    Cycle { path: String },
}

/// Identity of a record or sequence allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Any value in a payload tree.
#[derive(Debug, Clone)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Sequence(Sequence),
    Record(Record),
}

/// Shared handle to an ordered list of nodes.
#[derive(Clone, Default)]
pub struct Sequence(Rc<RefCell<Vec<Node>>>);

/// Shared handle to a field map.
#[derive(Clone, Default)]
pub struct Record(Rc<RefCell<Fields>>);

impl Node {
    /// Builds a record node from `(field, value)` pairs.
    pub fn record<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Self)>,
    {
        Self::Record(Record::from_fields(fields.into_iter().map(|(k, v)| (k.into(), v)).collect()))
    }

    /// Builds a sequence node.
    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::Sequence(Sequence::from_vec(items.into_iter().collect()))
    }

    #[must_use]
    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_sequence(&self) -> Option<&Sequence> {
        match self {
            Self::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Sequence(_) | Self::Record(_))
    }

    /// Identity of the underlying allocation. `None` for scalars.
    #[must_use]
    pub fn id(&self) -> Option<NodeId> {
        match self {
            Self::Sequence(sequence) => Some(sequence.id()),
            Self::Record(record) => Some(record.id()),
            _ => None,
        }
    }

    /// Whether both nodes are handles to the same record or sequence.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Sequence(a), Self::Sequence(b)) => a.ptr_eq(b),
            (Self::Record(a), Self::Record(b)) => a.ptr_eq(b),
            _ => false,
        }
    }

    /// Converts the tree to a JSON value.
    ///
    /// Shared sub-trees are written out once per reference.
    ///
    /// # Errors
    /// Returns [`NodeError::Cycle`] when a node is reachable from itself.
    pub fn to_json(&self) -> Result<Value, NodeError> {
        let mut ancestors = HashSet::new();
        to_json_value(self, "$", &mut ancestors)
    }
}

/// Converts `node`, located at `path`. `ancestors` holds the containers on the
/// current path.
fn to_json_value(
    node: &Node,
    path: &str,
    ancestors: &mut HashSet<NodeId>,
) -> Result<Value, NodeError> {
    let value = match node {
        Node::Null => Value::Null,
        Node::Bool(b) => Value::Bool(*b),
        Node::Number(n) => Value::Number(n.clone()),
        Node::String(s) => Value::String(s.clone()),
        Node::Sequence(sequence) => {
            if !ancestors.insert(sequence.id()) {
                return Err(NodeError::Cycle { path: path.to_string() });
            }
            let mut items = Vec::with_capacity(sequence.len());
            for (index, item) in sequence.items().iter().enumerate() {
                items.push(to_json_value(item, &format!("{path}[{index}]"), ancestors)?);
            }
            ancestors.remove(&sequence.id());
            Value::Array(items)
        }
        Node::Record(record) => {
            if !ancestors.insert(record.id()) {
                return Err(NodeError::Cycle { path: path.to_string() });
            }
            let mut map = Map::new();
            for (key, field) in record.fields() {
                let value = to_json_value(&field, &format!("{path}.{key}"), ancestors)?;
                map.insert(key, value);
            }
            ancestors.remove(&record.id());
            Value::Object(map)
        }
    };
    Ok(value)
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::sequence(items.into_iter().map(Self::from)),
            Value::Object(map) => Self::record(map.into_iter().map(|(k, v)| (k, Self::from(v)))),
        }
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Record> for Node {
    fn from(record: Record) -> Self {
        Self::Record(record)
    }
}

impl From<Sequence> for Node {
    fn from(sequence: Sequence) -> Self {
        Self::Sequence(sequence)
    }
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_fields(fields: Fields) -> Self {
        Self(Rc::new(RefCell::new(fields)))
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        NodeId(Rc::as_ptr(&self.0).addr())
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<Node> {
        self.0.borrow().get(key).cloned()
    }

    /// Runs `inspect` on a field without cloning it out of the record.
    #[must_use]
    pub fn with_field<R>(&self, key: &str, inspect: impl FnOnce(Option<&Node>) -> R) -> R {
        inspect(self.0.borrow().get(key))
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    /// Sets a field, keeping its position if it already exists.
    pub fn insert(&self, key: impl Into<String>, value: Node) -> Option<Node> {
        self.0.borrow_mut().insert(key.into(), value)
    }

    /// Removes a field, keeping the order of the remaining ones.
    pub fn remove(&self, key: &str) -> Option<Node> {
        self.0.borrow_mut().shift_remove(key)
    }

    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Shallow snapshot of the fields. Nested records stay shared.
    #[must_use]
    pub fn fields(&self) -> Fields {
        self.0.borrow().clone()
    }

    pub fn replace_fields(&self, fields: Fields) {
        *self.0.borrow_mut() = fields;
    }
}

impl Sequence {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_vec(items: Vec<Node>) -> Self {
        Self(Rc::new(RefCell::new(items)))
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        NodeId(Rc::as_ptr(&self.0).addr())
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<Node> {
        self.0.borrow().get(index).cloned()
    }

    pub fn push(&self, item: Node) {
        self.0.borrow_mut().push(item);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Shallow snapshot of the items.
    #[must_use]
    pub fn items(&self) -> Vec<Node> {
        self.0.borrow().clone()
    }

    pub fn replace_items(&self, items: Vec<Node>) {
        *self.0.borrow_mut() = items;
    }
}

// Contents are not printed: a cyclic tree would never finish formatting.
impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record").field("id", &self.id()).field("keys", &self.keys()).finish()
    }
}

impl fmt::Debug for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence").field("id", &self.id()).field("len", &self.len()).finish()
    }
}

//! Node arena.
//!
//! Nodes live in a [`Tree`] and are addressed by [`NodeId`] handles. Parent
//! and child links are handles too, so the parent/child graph carries no
//! reference cycles and dropping the tree drops every node at once.
//!
//! Ownership is exclusive: a node has at most one parent, and attaching it
//! somewhere else detaches it from its previous parent first. Detached
//! nodes stay in the arena until the tree is dropped.

use crate::error::{Result, TransformError};
use crate::identifier::{Identifier, CLASS_ARRAY, CLASS_OBJECT, CLASS_VALUE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a node inside a [`Tree`].
///
/// Handles are only meaningful for the tree that created them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in the arena.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Scalar payload of a value node.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl Scalar {
    /// Class tag describing the scalar type (`null` has none).
    pub fn class(&self) -> Option<&'static str> {
        match self {
            Scalar::Null => None,
            Scalar::Bool(_) => Some("boolean"),
            Scalar::Int(_) => Some("int"),
            Scalar::Float(_) => Some("double"),
            Scalar::String(_) => Some("string"),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Scalar::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) => Some(*f),
            _ => None,
        }
    }
}

/// Text form used by attribute selectors.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            // `1.0` keeps its fraction so it does not read as an int.
            Scalar::Float(x) => write!(f, "{x:?}"),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Int(value.into())
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

/// Shape of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JsonType {
    Value,
    Array,
    Object,
}

/// Node payload.
///
/// Object members are kept as an ordered list; a member's key is the
/// `name` of its [`Identifier`].
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Value(Scalar),
    Array(Vec<NodeId>),
    Object(Vec<NodeId>),
}

impl NodeKind {
    pub fn json_type(&self) -> JsonType {
        match self {
            NodeKind::Value(_) => JsonType::Value,
            NodeKind::Array(_) => JsonType::Array,
            NodeKind::Object(_) => JsonType::Object,
        }
    }

    fn children(&self) -> &[NodeId] {
        match self {
            NodeKind::Value(_) => &[],
            NodeKind::Array(children) | NodeKind::Object(children) => children,
        }
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    identifier: Identifier,
    parent: Option<NodeId>,
}

/// Arena holding every node of one or more JSON trees.
///
/// Slots are never reclaimed. Detached nodes, removed children and merge
/// copies keep their slot for the life of the tree, so a long-lived tree
/// edited by many pipelines only grows. Rebuild it from its JSON value to
/// start over with a compact arena.
#[derive(Debug, Clone, Default)]
pub struct Tree {
    nodes: Vec<NodeData>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes ever created, attached or not. Never shrinks.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// # Panics
    ///
    /// When the arena already holds `u32::MAX + 1` nodes.
    fn push(&mut self, kind: NodeKind, identifier: Identifier) -> NodeId {
        let slot = u32::try_from(self.nodes.len()).expect("node arena exhausted the u32 id space");
        let id = NodeId(slot);
        self.nodes.push(NodeData {
            kind,
            identifier,
            parent: None,
        });
        id
    }

    #[inline]
    fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    #[inline]
    fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    // ------------------------------------------------------------- creation

    /// Create a detached value node tagged `value` plus its scalar type.
    pub fn create_value(&mut self, value: Scalar) -> NodeId {
        let mut identifier = Identifier::new();
        identifier.add_class(CLASS_VALUE);
        if let Some(class) = value.class() {
            identifier.add_class(class);
        }
        self.push(NodeKind::Value(value), identifier)
    }

    /// Create a detached, empty array node tagged `array`.
    pub fn create_array(&mut self) -> NodeId {
        let mut identifier = Identifier::new();
        identifier.add_class(CLASS_ARRAY);
        self.push(NodeKind::Array(Vec::new()), identifier)
    }

    /// Create a detached, empty object node tagged `object`.
    pub fn create_object(&mut self) -> NodeId {
        let mut identifier = Identifier::new();
        identifier.add_class(CLASS_OBJECT);
        self.push(NodeKind::Object(Vec::new()), identifier)
    }

    /// Create an empty node of the given shape; values start as `null`.
    pub fn create(&mut self, json_type: JsonType) -> NodeId {
        match json_type {
            JsonType::Value => self.create_value(Scalar::Null),
            JsonType::Array => self.create_array(),
            JsonType::Object => self.create_object(),
        }
    }

    /// Copy a subtree, identifiers included. The copy is detached.
    pub fn deep_copy(&mut self, source: NodeId) -> NodeId {
        let mut root = None;
        let mut stack: Vec<(NodeId, Option<NodeId>)> = vec![(source, None)];

        while let Some((original, new_parent)) = stack.pop() {
            let data = self.data(original);
            let identifier = data.identifier.clone();
            let (kind, children) = match &data.kind {
                NodeKind::Value(value) => (NodeKind::Value(value.clone()), Vec::new()),
                NodeKind::Array(children) => (NodeKind::Array(Vec::new()), children.clone()),
                NodeKind::Object(children) => (NodeKind::Object(Vec::new()), children.clone()),
            };

            let copy = self.push(kind, identifier);
            match new_parent {
                Some(parent) => self.attach(parent, copy),
                None => root = Some(copy),
            }

            for child in children.into_iter().rev() {
                stack.push((child, Some(copy)));
            }
        }

        root.unwrap_or(source)
    }

    // --------------------------------------------------------------- access

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.data(id).kind
    }

    pub fn json_type(&self, id: NodeId) -> JsonType {
        self.data(id).kind.json_type()
    }

    pub fn is_value(&self, id: NodeId) -> bool {
        matches!(self.data(id).kind, NodeKind::Value(_))
    }

    pub fn is_array(&self, id: NodeId) -> bool {
        matches!(self.data(id).kind, NodeKind::Array(_))
    }

    pub fn is_object(&self, id: NodeId) -> bool {
        matches!(self.data(id).kind, NodeKind::Object(_))
    }

    pub fn is_container(&self, id: NodeId) -> bool {
        !self.is_value(id)
    }

    pub fn scalar(&self, id: NodeId) -> Option<&Scalar> {
        match &self.data(id).kind {
            NodeKind::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Replace the scalar of a value node.
    pub fn set_scalar(&mut self, id: NodeId, value: Scalar) -> Result<()> {
        self.update_scalar(id, |current| *current = value)
    }

    /// Mutate the scalar of a value node in place.
    ///
    /// The scalar type class tag (`string`, `int`, ...) follows the new
    /// value.
    pub fn update_scalar<F>(&mut self, id: NodeId, update: F) -> Result<()>
    where
        F: FnOnce(&mut Scalar),
    {
        let data = self.data_mut(id);
        let value = match &mut data.kind {
            NodeKind::Value(value) => value,
            other => {
                return Err(TransformError::invalid(format!(
                    "node {id} is {:?}, not a value",
                    other.json_type()
                )))
            }
        };

        let old_class = value.class();
        update(value);
        let new_class = value.class();

        if old_class != new_class {
            if let Some(class) = old_class {
                data.identifier.remove_class(class);
            }
            if let Some(class) = new_class {
                data.identifier.add_class(class);
            }
        }
        Ok(())
    }

    pub fn identifier(&self, id: NodeId) -> &Identifier {
        &self.data(id).identifier
    }

    pub fn identifier_mut(&mut self, id: NodeId) -> &mut Identifier {
        &mut self.data_mut(id).identifier
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.data(id).identifier.name()
    }

    pub fn set_name(&mut self, id: NodeId, name: Option<String>) {
        self.data_mut(id).identifier.set_name(name);
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    /// Children in order; empty for value nodes.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.data(id).kind.children()
    }

    pub fn child_count(&self, id: NodeId) -> usize {
        self.children(id).len()
    }

    /// Child at `index` of an array or object.
    pub fn child_at(&self, id: NodeId, index: usize) -> Result<NodeId> {
        match &self.data(id).kind {
            NodeKind::Value(_) => Err(TransformError::invalid(format!(
                "positional access on value node {id}"
            ))),
            NodeKind::Array(children) | NodeKind::Object(children) => {
                children.get(index).copied().ok_or_else(|| {
                    TransformError::invalid(format!(
                        "index {index} out of range for node {id} with {} children",
                        children.len()
                    ))
                })
            }
        }
    }

    /// First member of an object with the given name.
    pub fn child_by_name(&self, id: NodeId, name: &str) -> Result<Option<NodeId>> {
        match &self.data(id).kind {
            NodeKind::Object(children) => Ok(self.first_named(children, name)),
            other => Err(TransformError::invalid(format!(
                "named access on {:?} node {id}",
                other.json_type()
            ))),
        }
    }

    /// First child with the given name, for any node kind.
    pub fn find_child(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.first_named(self.children(id), name)
    }

    fn first_named(&self, children: &[NodeId], name: &str) -> Option<NodeId> {
        children
            .iter()
            .copied()
            .find(|child| self.name(*child) == Some(name))
    }

    /// Position of the node among its parent's children.
    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|c| *c == id)
    }

    // ------------------------------------------------------------ structure

    /// Append `child` to `parent`, detaching it from its current parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check_attachable(parent, child)?;
        self.detach(child);
        self.attach(parent, child);
        Ok(())
    }

    /// Detach `child` if it is a direct child of `parent`.
    ///
    /// Returns whether anything was removed.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        match &mut self.data_mut(parent).kind {
            NodeKind::Array(children) | NodeKind::Object(children) => {
                children.retain(|c| *c != child);
            }
            NodeKind::Value(_) => return false,
        }
        self.data_mut(child).parent = None;
        true
    }

    /// Detach a node from its parent, if any.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.parent(node) {
            self.remove_child(parent, node);
        }
    }

    /// Move a node under `new_parent`, or only detach it when `None`.
    ///
    /// The new parent is validated before the node is detached, so a failed
    /// call leaves the tree untouched.
    pub fn change_parent(&mut self, node: NodeId, new_parent: Option<NodeId>) -> Result<()> {
        match new_parent {
            Some(parent) => self.add_child(parent, node),
            None => {
                self.detach(node);
                Ok(())
            }
        }
    }

    /// Rename `child` if it is a direct child of `parent`.
    pub fn rename_child(&mut self, parent: NodeId, child: NodeId, name: &str) -> bool {
        if self.parent(child) != Some(parent) {
            return false;
        }
        self.set_name(child, Some(name.to_string()));
        true
    }

    fn check_attachable(&self, parent: NodeId, child: NodeId) -> Result<()> {
        if self.is_value(parent) {
            return Err(TransformError::invalid(format!(
                "cannot add a child to value node {parent}"
            )));
        }
        if parent == child || self.is_ancestor(child, parent) {
            return Err(TransformError::invalid(format!(
                "cannot add node {child} below itself"
            )));
        }
        Ok(())
    }

    /// Link a detached child; callers have validated both ends.
    fn attach(&mut self, parent: NodeId, child: NodeId) {
        if let NodeKind::Array(children) | NodeKind::Object(children) =
            &mut self.data_mut(parent).kind
        {
            children.push(child);
        }
        self.data_mut(child).parent = Some(parent);
    }

    // ------------------------------------------------------------ traversal

    /// Ancestors of a node, nearest first, ending at the root.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        self.ancestors(id).collect()
    }

    /// Iterator over the ancestors of a node, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|a| a == ancestor)
    }

    /// Topmost ancestor of a node (the node itself when detached).
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().unwrap_or(id)
    }

    /// Strict descendants of a node in depth-first pre-order.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = self.children(id).to_vec();
        stack.reverse();
        Descendants { tree: self, stack }
    }
}

/// See [`Tree::ancestors`].
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// See [`Tree::descendants`].
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(node).iter().rev().copied());
        Some(node)
    }
}

//! Documents: a tree plus the node set holding its root.

use crate::cache::CacheIndex;
use crate::convert::{tree_to_value, value_to_tree};
use crate::error::Result;
use crate::node::{NodeId, Tree};
use crate::nodes::NodeSet;
use crate::options::DocumentOptions;
use crate::transform::Transformer;
use serde_json::Value;

/// A JSON document that can be queried and transformed in place.
///
/// The document's node set holds only the root, so selectors are matched
/// against the root's descendants.
#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree,
    root: NodeId,
    nodes: NodeSet,
    options: DocumentOptions,
}

impl Document {
    /// Wrap an existing tree.
    pub fn new(tree: Tree, root: NodeId) -> Self {
        Self::with_options(tree, root, DocumentOptions::default())
    }

    pub fn with_options(tree: Tree, root: NodeId, options: DocumentOptions) -> Self {
        Self {
            tree,
            root,
            nodes: NodeSet::of(root).with_document(root),
            options,
        }
    }

    pub fn parse(text: &str) -> Result<Self> {
        Self::parse_with(text, DocumentOptions::default())
    }

    pub fn parse_with(text: &str, options: DocumentOptions) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value_with(&value, options)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self> {
        Self::from_value_with(value, DocumentOptions::default())
    }

    pub fn from_value_with(value: &Value, options: DocumentOptions) -> Result<Self> {
        let mut tree = Tree::new();
        let root = value_to_tree(&mut tree, value, options.naming.strategy())?;
        Ok(Self::with_options(tree, root, options))
    }

    pub fn to_value(&self) -> Value {
        tree_to_value(&self.tree, self.root(), self.options.naming.strategy())
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_value())?)
    }

    pub fn to_json_string_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value())?)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    /// The node set holding the root.
    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub(crate) fn parts_mut(&mut self) -> (&mut Tree, &NodeSet) {
        (&mut self.tree, &self.nodes)
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: DocumentOptions) {
        self.options = options;
    }

    pub fn select(&self, selector: &str) -> Result<NodeSet> {
        self.nodes.select(&self.tree, selector)
    }

    pub fn select_single(&self, selector: &str) -> Result<Option<NodeId>> {
        self.nodes.select_single(&self.tree, selector)
    }

    pub fn find_by_name(&self, name: &str) -> NodeSet {
        self.nodes.find_by_name(&self.tree, name)
    }

    /// A fresh cache index over the whole document.
    pub fn cache_index(&self) -> CacheIndex {
        CacheIndex::new(self.nodes.clone())
    }

    /// Start a pipeline whose scope is resolved against the whole document.
    pub fn transform(&mut self, scope: &str) -> Transformer<'_> {
        Transformer::new(self, None, scope)
    }

    /// Start a pipeline whose scope is resolved below `nodes`.
    pub fn transform_nodes(&mut self, nodes: NodeSet, scope: &str) -> Transformer<'_> {
        Transformer::new(self, Some(nodes), scope)
    }
}

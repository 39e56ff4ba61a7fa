//! Ordered node selections.

use crate::distance::{distance, NodeDistance};
use crate::engine::{self, CompiledSelector};
use crate::error::Result;
use crate::filter::NodeFilter;
use crate::node::{NodeId, Tree};
use indexmap::IndexSet;
use std::collections::HashSet;

/// An ordered, duplicate-free set of nodes used as roots for queries.
///
/// Queries only look below the members, never at the members themselves,
/// so chained selections narrow progressively. Excluded nodes and their
/// subtrees are invisible to queries run from this set.
///
/// A set may remember the root of the document it came from; selections
/// derived from it keep that root, which [`NodeSet::parent_matching`]
/// resolves its selector against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    roots: IndexSet<NodeId>,
    exclusions: HashSet<NodeId>,
    document: Option<NodeId>,
}

impl NodeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding one node.
    pub fn of(node: NodeId) -> Self {
        let mut set = Self::new();
        set.roots.insert(node);
        set
    }

    pub fn from_nodes<I: IntoIterator<Item = NodeId>>(nodes: I) -> Self {
        Self {
            roots: nodes.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Remember `root` as the document this set belongs to.
    pub fn with_document(mut self, root: NodeId) -> Self {
        self.document = Some(root);
        self
    }

    pub fn document(&self) -> Option<NodeId> {
        self.document
    }

    /// A new set over `roots` that shares this set's document.
    fn derive(&self, roots: IndexSet<NodeId>) -> Self {
        Self {
            roots,
            exclusions: HashSet::new(),
            document: self.document,
        }
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.iter().copied()
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.roots.contains(&node)
    }

    pub fn first(&self) -> Option<NodeId> {
        self.roots.first().copied()
    }

    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.roots.get_index(index).copied()
    }

    pub fn to_vec(&self) -> Vec<NodeId> {
        self.iter().collect()
    }

    pub(crate) fn roots(&self) -> &IndexSet<NodeId> {
        &self.roots
    }

    /// Append a member. Excluded nodes and duplicates are refused.
    pub fn add_root(&mut self, node: NodeId) -> bool {
        if self.exclusions.contains(&node) {
            return false;
        }
        self.roots.insert(node)
    }

    /// Hide `node` and its subtree from queries run from this set.
    pub fn add_exclusion(&mut self, node: NodeId) {
        self.exclusions.insert(node);
    }

    pub fn clear_exclusions(&mut self) {
        self.exclusions.clear();
    }

    pub fn exclusions(&self) -> &HashSet<NodeId> {
        &self.exclusions
    }

    pub fn is_excluded(&self, node: NodeId) -> bool {
        self.exclusions.contains(&node)
    }

    // -------------------------------------------------------------- queries

    /// Nodes below the members that match `selector`.
    ///
    /// Blank selector text returns a copy of this set.
    pub fn select(&self, tree: &Tree, selector: &str) -> Result<NodeSet> {
        let compiled = CompiledSelector::compile(selector)?;
        Ok(self.select_compiled(tree, &compiled))
    }

    pub fn select_compiled(&self, tree: &Tree, selector: &CompiledSelector) -> NodeSet {
        self.derive(engine::evaluate(tree, &self.roots, &self.exclusions, selector))
    }

    /// First match of `selector`, if any.
    pub fn select_single(&self, tree: &Tree, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.select(tree, selector)?.first())
    }

    /// Nodes below the members named `name`.
    pub fn find_by_name(&self, tree: &Tree, name: &str) -> NodeSet {
        self.filter(tree, &NodeFilter::Name(name.to_string()))
    }

    /// Nodes below the members accepted by `filter`.
    pub fn filter(&self, tree: &Tree, filter: &NodeFilter) -> NodeSet {
        self.derive(engine::traverse(tree, &self.roots, &self.exclusions, filter))
    }

    /// Filter accepting exactly the members of this set.
    pub fn membership(&self) -> NodeFilter {
        NodeFilter::In(self.roots.clone())
    }

    /// Direct parents of the members; roots contribute nothing.
    pub fn parent(&self, tree: &Tree) -> NodeSet {
        self.derive(self.iter().filter_map(|n| tree.parent(n)).collect())
    }

    /// Nearest ancestor of every member that matches `selector`.
    ///
    /// The selector is resolved against the document root, or against this
    /// set when it has no document.
    pub fn parent_matching(&self, tree: &Tree, selector: &str) -> Result<NodeSet> {
        let candidates = match self.document {
            Some(root) => NodeSet::of(root).with_document(root).select(tree, selector)?,
            None => self.select(tree, selector)?,
        };

        let candidates = candidates.membership();
        let parents = self
            .iter()
            .filter_map(|node| tree.ancestors(node).find(|a| candidates.accepts(tree, *a, None)))
            .collect();
        Ok(self.derive(parents))
    }

    /// Members other than `node` at the smallest distance from it.
    ///
    /// Several entries mean the closest member is ambiguous; no entries mean
    /// there is no other member.
    pub fn closest_to(&self, tree: &Tree, node: NodeId) -> Vec<NodeDistance> {
        let distances: Vec<NodeDistance> = self
            .iter()
            .filter(|other| *other != node)
            .map(|other| NodeDistance {
                node: other,
                distance: distance(tree, node, other),
            })
            .collect();

        let Some(min) = distances.iter().map(|d| d.distance).min() else {
            return Vec::new();
        };
        distances.into_iter().filter(|d| d.distance == min).collect()
    }
}

impl FromIterator<NodeId> for NodeSet {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        Self::from_nodes(iter)
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<indexmap::set::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.roots.iter().copied()
    }
}

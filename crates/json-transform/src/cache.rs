//! Name, class and id index over a node set.
//!
//! The index is derived data: it is rebuilt wholesale after
//! [`CacheIndex::mark_dirty`] and repaired node by node through
//! [`CacheIndex::notify`]. Candidates found through the maps are checked
//! again against the tree before they are returned, so a query answered
//! from the index equals a traversal of the same roots, order included.

use crate::engine::{self, CompiledSelector};
use crate::error::Result;
use crate::filter::{IndexKey, NodeFilter};
use crate::node::{NodeId, Tree};
use crate::nodes::NodeSet;
use indexmap::IndexSet;
use log::trace;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct CacheIndex {
    nodes: NodeSet,
    names: HashMap<String, Vec<NodeId>>,
    classes: HashMap<String, Vec<NodeId>>,
    ids: HashMap<String, Vec<NodeId>>,
    /// Keys each node is currently listed under.
    registered: HashMap<NodeId, Vec<(Field, String)>>,
    dirty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Class,
    Id,
}

impl CacheIndex {
    /// Index the subtrees of `nodes`. Built on first use.
    pub fn new(nodes: NodeSet) -> Self {
        Self {
            nodes,
            names: HashMap::new(),
            classes: HashMap::new(),
            ids: HashMap::new(),
            registered: HashMap::new(),
            dirty: true,
        }
    }

    pub fn nodes(&self) -> &NodeSet {
        &self.nodes
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Force a full rebuild before the next query.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn add_exclusion(&mut self, node: NodeId) {
        self.nodes.add_exclusion(node);
    }

    pub fn clear_exclusions(&mut self) {
        self.nodes.clear_exclusions();
    }

    fn ensure_fresh(&mut self, tree: &Tree) {
        if !self.dirty {
            return;
        }
        self.names.clear();
        self.classes.clear();
        self.ids.clear();
        self.registered.clear();

        let mut count = 0;
        for root in self.nodes.to_vec() {
            for node in tree.descendants(root) {
                self.register(tree, node);
                count += 1;
            }
        }
        self.dirty = false;
        trace!(
            "rebuilt cache index: {} node(s), {} name(s), {} class(es), {} id(s)",
            count,
            self.names.len(),
            self.classes.len(),
            self.ids.len()
        );
    }

    fn map_mut(&mut self, field: Field) -> &mut HashMap<String, Vec<NodeId>> {
        match field {
            Field::Name => &mut self.names,
            Field::Class => &mut self.classes,
            Field::Id => &mut self.ids,
        }
    }

    fn register(&mut self, tree: &Tree, node: NodeId) {
        let identifier = tree.identifier(node);
        let mut keys = Vec::new();
        if let Some(name) = identifier.name() {
            keys.push((Field::Name, name.to_string()));
        }
        if let Some(id) = identifier.id() {
            keys.push((Field::Id, id.to_string()));
        }
        keys.extend(identifier.classes().map(|c| (Field::Class, c.to_string())));

        for (field, key) in &keys {
            let nodes = self.map_mut(*field).entry(key.clone()).or_default();
            if !nodes.contains(&node) {
                nodes.push(node);
            }
        }
        self.registered.insert(node, keys);
    }

    /// Drop every entry recorded for `node`, whatever its identifier is now.
    fn unregister(&mut self, node: NodeId) {
        let Some(keys) = self.registered.remove(&node) else {
            return;
        };
        for (field, key) in keys {
            let map = self.map_mut(field);
            if let Some(nodes) = map.get_mut(&key) {
                nodes.retain(|n| *n != node);
                if nodes.is_empty() {
                    map.remove(&key);
                }
            }
        }
    }

    /// Re-register `node` under its current name, id and classes.
    ///
    /// Must be called after a node's identifier or position changes. A
    /// node that is no longer below the indexed roots is only dropped.
    pub fn notify(&mut self, tree: &Tree, node: NodeId) {
        if self.dirty {
            return;
        }
        self.unregister(node);
        if self.is_indexed(tree, node) {
            self.register(tree, node);
        }
    }

    /// [`notify`](Self::notify) for a node and all of its descendants.
    pub fn notify_subtree(&mut self, tree: &Tree, node: NodeId) {
        if self.dirty {
            return;
        }
        self.notify(tree, node);
        for descendant in tree.descendants(node) {
            self.notify(tree, descendant);
        }
    }

    fn is_indexed(&self, tree: &Tree, node: NodeId) -> bool {
        tree.ancestors(node).any(|a| self.nodes.contains(a))
    }

    // -------------------------------------------------------------- queries

    pub fn find_by_name(&mut self, tree: &Tree, name: &str) -> NodeSet {
        self.filter(tree, &NodeFilter::Name(name.to_string()))
    }

    pub fn find_by_class(&mut self, tree: &Tree, class: &str) -> NodeSet {
        self.filter(tree, &NodeFilter::Class(class.to_string()))
    }

    /// First node in document order carrying `id`.
    pub fn find_by_id(&mut self, tree: &Tree, id: &str) -> Option<NodeId> {
        self.filter(tree, &NodeFilter::Id(id.to_string())).first()
    }

    pub fn select(&mut self, tree: &Tree, selector: &str) -> Result<NodeSet> {
        let compiled = CompiledSelector::compile(selector)?;
        Ok(self.select_compiled(tree, &compiled))
    }

    pub fn select_compiled(&mut self, tree: &Tree, selector: &CompiledSelector) -> NodeSet {
        let Some((first, rest)) = selector.steps().split_first() else {
            return self.nodes.select_compiled(tree, selector);
        };

        let mut current = self.lookup(tree, first);
        for step in rest {
            if current.is_empty() {
                break;
            }
            current = engine::traverse(tree, &current, self.nodes.exclusions(), step);
        }

        let mut result = NodeSet::from_nodes(current);
        if let Some(root) = self.nodes.document() {
            result = result.with_document(root);
        }
        result
    }

    /// Same result as [`NodeSet::filter`] over the indexed roots.
    pub fn filter(&mut self, tree: &Tree, filter: &NodeFilter) -> NodeSet {
        let mut result = NodeSet::from_nodes(self.lookup(tree, filter));
        if let Some(root) = self.nodes.document() {
            result = result.with_document(root);
        }
        result
    }

    fn lookup(&mut self, tree: &Tree, filter: &NodeFilter) -> IndexSet<NodeId> {
        let candidates = match filter.index_key() {
            Some(key) => {
                self.ensure_fresh(tree);
                let map = match key {
                    IndexKey::Name(_) => &self.names,
                    IndexKey::Class(_) => &self.classes,
                    IndexKey::Id(_) => &self.ids,
                };
                let value = match key {
                    IndexKey::Name(v) | IndexKey::Class(v) | IndexKey::Id(v) => v,
                };
                map.get(value).cloned().unwrap_or_default()
            }
            None => {
                return engine::traverse(tree, self.nodes.roots(), self.nodes.exclusions(), filter)
            }
        };

        let mut ordered: Vec<(Vec<usize>, NodeId)> = candidates
            .into_iter()
            .filter(|node| filter.accepts(tree, *node, tree.index_in_parent(*node)))
            .filter_map(|node| self.document_order(tree, node).map(|key| (key, node)))
            .collect();
        ordered.sort();
        ordered.into_iter().map(|(_, node)| node).collect()
    }

    /// Position of `node` in a traversal of the indexed roots, or `None`
    /// when the traversal would not reach it.
    ///
    /// The key is the index of the first root reaching the node followed by
    /// the child positions leading from that root down to the node.
    fn document_order(&self, tree: &Tree, node: NodeId) -> Option<Vec<usize>> {
        let mut chain = vec![node];
        chain.extend(tree.ancestors(node));

        for (root_index, root) in self.nodes.iter().enumerate() {
            let Some(depth) = chain.iter().position(|n| *n == root) else {
                continue;
            };
            if depth == 0 || chain[..=depth].iter().any(|n| self.nodes.is_excluded(*n)) {
                continue;
            }

            let mut key = Vec::with_capacity(depth + 1);
            key.push(root_index);
            for n in chain[..depth].iter().rev() {
                key.push(tree.index_in_parent(*n).unwrap_or(0));
            }
            return Some(key);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Scalar;

    fn object_with(tree: &mut Tree, parent: NodeId, name: &str) -> NodeId {
        let node = tree.create_object();
        tree.set_name(node, Some(name.to_string()));
        tree.add_child(parent, node).unwrap();
        node
    }

    #[test]
    fn test_lazy_build() {
        let mut tree = Tree::new();
        let root = tree.create_object();
        let a = object_with(&mut tree, root, "a");

        let mut cache = CacheIndex::new(NodeSet::of(root));
        assert!(cache.is_dirty());
        assert_eq!(cache.find_by_name(&tree, "a").to_vec(), vec![a]);
        assert!(!cache.is_dirty());
    }

    #[test]
    fn test_notify_after_rename() {
        let mut tree = Tree::new();
        let root = tree.create_object();
        let a = object_with(&mut tree, root, "a");
        let mut cache = CacheIndex::new(NodeSet::of(root));
        assert_eq!(cache.find_by_name(&tree, "a").len(), 1);

        tree.set_name(a, Some("b".into()));
        cache.notify(&tree, a);
        assert!(cache.find_by_name(&tree, "a").is_empty());
        assert_eq!(cache.find_by_name(&tree, "b").to_vec(), vec![a]);
    }

    #[test]
    fn test_results_follow_document_order() {
        let mut tree = Tree::new();
        let root = tree.create_object();
        let first = object_with(&mut tree, root, "x");
        let holder = object_with(&mut tree, root, "holder");
        let mut cache = CacheIndex::new(NodeSet::of(root));
        assert_eq!(cache.find_by_name(&tree, "x").len(), 1);

        let late = tree.create_object();
        tree.set_name(late, Some("x".into()));
        tree.add_child(holder, late).unwrap();
        cache.notify(&tree, late);

        // Move the first match behind the second one.
        tree.add_child(holder, first).unwrap();
        cache.notify(&tree, first);

        let cached = cache.find_by_name(&tree, "x").to_vec();
        let walked = NodeSet::of(root).find_by_name(&tree, "x").to_vec();
        assert_eq!(cached, vec![late, first]);
        assert_eq!(cached, walked);
    }

    #[test]
    fn test_detached_nodes_disappear() {
        let mut tree = Tree::new();
        let root = tree.create_object();
        let a = object_with(&mut tree, root, "a");
        let inner = object_with(&mut tree, a, "inner");
        let mut cache = CacheIndex::new(NodeSet::of(root));
        assert_eq!(cache.find_by_name(&tree, "inner").len(), 1);

        tree.detach(a);
        cache.notify(&tree, a);
        assert!(cache.find_by_name(&tree, "a").is_empty());
        assert!(cache.find_by_name(&tree, "inner").is_empty());
        assert_eq!(tree.parent(inner), Some(a));
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let mut tree = Tree::new();
        let root = tree.create_array();
        let a = tree.create_value(Scalar::Null);
        tree.identifier_mut(a).set_id(Some("7".into()));
        tree.add_child(root, a).unwrap();
        let b = tree.deep_copy(a);
        tree.add_child(root, b).unwrap();

        let mut cache = CacheIndex::new(NodeSet::of(root));
        assert_eq!(cache.find_by_id(&tree, "7"), Some(a));
        tree.detach(a);
        cache.notify(&tree, a);
        assert_eq!(cache.find_by_id(&tree, "7"), Some(b));
    }

    #[test]
    fn test_exclusions() {
        let mut tree = Tree::new();
        let root = tree.create_object();
        let a = object_with(&mut tree, root, "a");
        let b = object_with(&mut tree, root, "b");
        let a_obj = object_with(&mut tree, a, "o");
        let b_obj = object_with(&mut tree, b, "o");

        let mut cache = CacheIndex::new(NodeSet::of(root));
        cache.add_exclusion(a);
        assert_eq!(cache.find_by_name(&tree, "o").to_vec(), vec![b_obj]);
        cache.clear_exclusions();
        assert_eq!(cache.find_by_name(&tree, "o").to_vec(), vec![a_obj, b_obj]);
    }

    #[test]
    fn test_select_descendant_chain() {
        let mut tree = Tree::new();
        let root = tree.create_object();
        let a = object_with(&mut tree, root, "a");
        let b = object_with(&mut tree, root, "b");
        object_with(&mut tree, a, "o");
        let b_obj = object_with(&mut tree, b, "o");

        let mut cache = CacheIndex::new(NodeSet::of(root));
        assert_eq!(cache.select(&tree, "b o").unwrap().to_vec(), vec![b_obj]);
        assert_eq!(cache.select(&tree, "*").unwrap().len(), 4);
        assert_eq!(cache.select(&tree, "").unwrap().to_vec(), vec![root]);
    }
}

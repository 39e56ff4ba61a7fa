//! Ancestor distance between two nodes of one tree.
//!
//! Distances count the nodes strictly between the two ends of the path
//! plus one, i.e. edges minus one: a node's parent is at distance 0, its
//! grandparent at 1, and two siblings are at distance 1.

use crate::node::{NodeId, Tree};

/// A node paired with its distance to some reference node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDistance {
    pub node: NodeId,
    pub distance: usize,
}

/// Distance between `a` and `b` through their lowest common ancestor.
///
/// When one node is an ancestor of the other the distance is the position
/// of the ancestor in the other node's [`Tree::path_to_root`]. Nodes of
/// different trees are measured as if their roots were siblings.
pub fn distance(tree: &Tree, a: NodeId, b: NodeId) -> usize {
    if a == b {
        return 0;
    }

    let path_a = tree.path_to_root(a);
    if let Some(index) = path_a.iter().position(|n| *n == b) {
        return index;
    }
    let path_b = tree.path_to_root(b);
    if let Some(index) = path_b.iter().position(|n| *n == a) {
        return index;
    }

    // Root-first; zip stops at the shorter path.
    let lca_depth = path_a
        .iter()
        .rev()
        .zip(path_b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count() as isize
        - 1;

    let total = path_a.len() as isize + path_b.len() as isize - 2 * lca_depth - 1;
    total.max(0) as usize
}

impl Tree {
    /// See [`distance`].
    pub fn distance(&self, a: NodeId, b: NodeId) -> usize {
        distance(self, a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Scalar;

    /// root -> Y -> Z -> X -> H -> b[] -> {} -> E
    fn chain() -> (Tree, Vec<NodeId>) {
        let mut tree = Tree::new();
        let root = tree.create_object();
        let mut parent = root;
        let mut nodes = vec![root];
        for name in ["Y", "Z", "X", "H", "b"] {
            let node = if name == "b" {
                tree.create_array()
            } else {
                tree.create_object()
            };
            tree.set_name(node, Some(name.to_string()));
            tree.add_child(parent, node).unwrap();
            nodes.push(node);
            parent = node;
        }
        let element = tree.create_object();
        tree.add_child(parent, element).unwrap();
        let e = tree.create_value(Scalar::Int(1));
        tree.set_name(e, Some("E".to_string()));
        tree.add_child(element, e).unwrap();
        nodes.push(element);
        nodes.push(e);
        (tree, nodes)
    }

    #[test]
    fn test_ancestor_distances() {
        let (tree, nodes) = chain();
        let (y, z, x, h, e) = (nodes[1], nodes[2], nodes[3], nodes[4], nodes[7]);
        assert_eq!(distance(&tree, e, h), 2);
        assert_eq!(distance(&tree, e, x), 3);
        assert_eq!(distance(&tree, e, z), 4);
        assert_eq!(distance(&tree, e, y), 5);
    }

    #[test]
    fn test_ancestor_distance_is_symmetric() {
        let (tree, nodes) = chain();
        for &a in &nodes {
            for &b in &nodes {
                assert_eq!(distance(&tree, a, b), distance(&tree, b, a));
            }
        }
    }

    #[test]
    fn test_parent_and_siblings() {
        let mut tree = Tree::new();
        let root = tree.create_array();
        let left = tree.create_object();
        let right = tree.create_object();
        let nephew = tree.create_value(Scalar::Null);
        tree.add_child(root, left).unwrap();
        tree.add_child(root, right).unwrap();
        tree.add_child(right, nephew).unwrap();

        assert_eq!(tree.distance(left, root), 0);
        assert_eq!(tree.distance(left, right), 1);
        assert_eq!(tree.distance(left, nephew), 2);
        assert_eq!(tree.distance(left, left), 0);
    }
}

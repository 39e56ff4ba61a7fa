use json_transform::{distance, Document, NodeId, Tree};
use proptest::prelude::*;
use serde_json::json;

fn chain() -> Document {
    Document::from_value(&json!({"Y": {"Z": {"X": {"H": {"b": [{"E": 1}]}}}}})).unwrap()
}

fn single(doc: &Document, selector: &str) -> NodeId {
    doc.select_single(selector)
        .unwrap()
        .unwrap_or_else(|| panic!("no match for '{selector}'"))
}

#[test]
fn ancestor_distance_matrix() {
    let doc = chain();
    let e = single(&doc, "E");
    let element = doc.tree().parent(e).unwrap();
    assert_eq!(distance(doc.tree(), e, element), 0);

    let cases: &[(&str, usize)] = &[("b", 1), ("H", 2), ("X", 3), ("Z", 4), ("Y", 5)];
    for (selector, expected) in cases {
        let other = single(&doc, selector);
        assert_eq!(distance(doc.tree(), e, other), *expected, "E to {selector}");
        assert_eq!(distance(doc.tree(), other, e), *expected, "{selector} to E");
    }
    assert_eq!(distance(doc.tree(), e, doc.root()), 6);
}

#[test]
fn sibling_and_cousin_distances() {
    let doc = Document::from_value(&json!({
        "a": {"a1": 1, "a2": 2},
        "b": {"b1": {"deep": 3}}
    }))
    .unwrap();
    let a1 = single(&doc, "a1");
    let a2 = single(&doc, "a2");
    let b1 = single(&doc, "b1");
    let deep = single(&doc, "deep");
    let a = single(&doc, "a");
    let b = single(&doc, "b");

    assert_eq!(doc.tree().distance(a1, a1), 0);
    assert_eq!(doc.tree().distance(a1, a2), 1);
    assert_eq!(doc.tree().distance(a, b), 1);
    assert_eq!(doc.tree().distance(a1, b), 2);
    assert_eq!(doc.tree().distance(a1, b1), 3);
    assert_eq!(doc.tree().distance(a1, deep), 4);
}

#[test]
fn detached_nodes_are_measured_through_virtual_root() {
    let mut tree = Tree::new();
    let left = tree.create_object();
    let right = tree.create_object();
    let child = tree.create_array();
    tree.add_child(right, child).unwrap();

    assert_eq!(tree.distance(left, right), 1);
    assert_eq!(tree.distance(left, child), 2);
}

/// A tree whose node `i > 0` hangs below one of the nodes before it.
fn arb_tree() -> impl Strategy<Value = (Tree, Vec<NodeId>)> {
    prop::collection::vec(any::<prop::sample::Index>(), 1..40).prop_map(|parents| {
        let mut tree = Tree::new();
        let mut nodes = vec![tree.create_object()];
        for (i, parent) in parents.iter().enumerate() {
            let node = tree.create_object();
            let parent = nodes[parent.index(i + 1)];
            tree.add_child(parent, node).unwrap();
            nodes.push(node);
        }
        (tree, nodes)
    })
}

proptest! {
    #[test]
    fn distance_is_symmetric(
        (tree, nodes) in arb_tree(),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let a = nodes[a.index(nodes.len())];
        let b = nodes[b.index(nodes.len())];
        prop_assert_eq!(distance(&tree, a, b), distance(&tree, b, a));
    }

    #[test]
    fn ancestor_distance_is_path_position(
        (tree, nodes) in arb_tree(),
        pick in any::<prop::sample::Index>(),
    ) {
        let node = nodes[pick.index(nodes.len())];
        for (position, ancestor) in tree.ancestors(node).enumerate() {
            prop_assert_eq!(distance(&tree, node, ancestor), position);
        }
    }

    #[test]
    fn children_of_one_parent_are_one_apart(
        (tree, nodes) in arb_tree(),
        pick in any::<prop::sample::Index>(),
    ) {
        let parent = nodes[pick.index(nodes.len())];
        let children = tree.children(parent);
        for pair in children.windows(2) {
            prop_assert_eq!(distance(&tree, pair[0], pair[1]), 1);
        }
    }
}

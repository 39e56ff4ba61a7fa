//! Node predicates.
//!
//! Compiled selectors are lists of [`NodeFilter`]s; callers can also build
//! filters directly and run them with [`NodeSet::filter`](crate::NodeSet::filter).

use crate::node::{NodeId, Tree};
use indexmap::IndexSet;

/// Value comparison of an attribute condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeTest {
    /// `[a=v]`
    Equals(String),
    /// `[a^=v]`
    Prefix(String),
    /// `[a*=v]`
    Contains(String),
}

impl AttributeTest {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            AttributeTest::Equals(expected) => text == expected,
            AttributeTest::Prefix(prefix) => text.starts_with(prefix.as_str()),
            AttributeTest::Contains(needle) => text.contains(needle.as_str()),
        }
    }
}

/// Predicate over a node and its position inside its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeFilter {
    /// Matches every node.
    Any,
    Name(String),
    Id(String),
    Class(String),
    /// A container with a child of this name.
    HasAttribute(String),
    /// A container with a scalar child of this name whose text passes
    /// `test`.
    Attribute { name: String, test: AttributeTest },
    /// The child at this position of its parent.
    Position(usize),
    /// Membership in a fixed collection of nodes.
    In(IndexSet<NodeId>),
    And(Vec<NodeFilter>),
    Not(Box<NodeFilter>),
}

/// Lookup key usable against a cache index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndexKey<'a> {
    Name(&'a str),
    Class(&'a str),
    Id(&'a str),
}

impl NodeFilter {
    /// Whether `node` passes. `index` is the node's position in its parent,
    /// if it has one.
    pub fn accepts(&self, tree: &Tree, node: NodeId, index: Option<usize>) -> bool {
        match self {
            NodeFilter::Any => true,
            NodeFilter::Name(name) => tree.name(node) == Some(name.as_str()),
            NodeFilter::Id(id) => tree.identifier(node).id() == Some(id.as_str()),
            NodeFilter::Class(class) => tree.identifier(node).has_class(class),
            NodeFilter::HasAttribute(name) => {
                tree.is_container(node) && tree.find_child(node, name).is_some()
            }
            NodeFilter::Attribute { name, test } => {
                if tree.is_value(node) {
                    return false;
                }
                tree.find_child(node, name)
                    .and_then(|child| tree.scalar(child))
                    .map_or(false, |value| test.matches(&value.to_string()))
            }
            NodeFilter::Position(position) => index == Some(*position),
            NodeFilter::In(nodes) => nodes.contains(&node),
            NodeFilter::And(filters) => filters.iter().all(|f| f.accepts(tree, node, index)),
            NodeFilter::Not(filter) => !filter.accepts(tree, node, index),
        }
    }

    /// Conjunction, flattening nested `And`s and dropping `Any`.
    pub fn and(self, other: NodeFilter) -> NodeFilter {
        let mut filters = Vec::new();
        for filter in [self, other] {
            match filter {
                NodeFilter::Any => {}
                NodeFilter::And(inner) => filters.extend(inner),
                other => filters.push(other),
            }
        }
        match filters.len() {
            0 => NodeFilter::Any,
            1 => filters.remove(0),
            _ => NodeFilter::And(filters),
        }
    }

    pub fn negate(self) -> NodeFilter {
        match self {
            NodeFilter::Not(inner) => *inner,
            other => NodeFilter::Not(Box::new(other)),
        }
    }

    /// A name, class or id every accepted node must carry.
    pub(crate) fn index_key(&self) -> Option<IndexKey<'_>> {
        match self {
            NodeFilter::Name(name) => Some(IndexKey::Name(name)),
            NodeFilter::Id(id) => Some(IndexKey::Id(id)),
            NodeFilter::Class(class) => Some(IndexKey::Class(class)),
            NodeFilter::And(filters) => filters.iter().find_map(NodeFilter::index_key),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Scalar;

    fn person(tree: &mut Tree, name: Scalar, age: Option<i64>) -> NodeId {
        let object = tree.create_object();
        let value = tree.create_value(name);
        tree.set_name(value, Some("name".into()));
        tree.add_child(object, value).unwrap();
        if let Some(age) = age {
            let value = tree.create_value(Scalar::Int(age));
            tree.set_name(value, Some("age".into()));
            tree.add_child(object, value).unwrap();
        }
        object
    }

    #[test]
    fn test_attribute_tests() {
        let mut tree = Tree::new();
        let jon = person(&mut tree, "Jon Snow".into(), Some(16));

        let equals = NodeFilter::Attribute {
            name: "name".into(),
            test: AttributeTest::Equals("Jon Snow".into()),
        };
        let prefix = NodeFilter::Attribute {
            name: "name".into(),
            test: AttributeTest::Prefix("Jon".into()),
        };
        let contains = NodeFilter::Attribute {
            name: "name".into(),
            test: AttributeTest::Contains("Sno".into()),
        };
        let age = NodeFilter::Attribute {
            name: "age".into(),
            test: AttributeTest::Equals("16".into()),
        };
        for filter in [&equals, &prefix, &contains, &age] {
            assert!(filter.accepts(&tree, jon, None), "{:?}", filter);
        }

        let wrong = NodeFilter::Attribute {
            name: "name".into(),
            test: AttributeTest::Equals("Jon".into()),
        };
        assert!(!wrong.accepts(&tree, jon, None));
    }

    #[test]
    fn test_attribute_requires_scalar_child_of_container() {
        let mut tree = Tree::new();
        let outer = tree.create_object();
        let inner = person(&mut tree, "x".into(), None);
        tree.set_name(inner, Some("name".into()));
        tree.add_child(outer, inner).unwrap();

        let test = NodeFilter::Attribute {
            name: "name".into(),
            test: AttributeTest::Contains(String::new()),
        };
        assert!(!test.accepts(&tree, outer, None));
        assert!(NodeFilter::HasAttribute("name".into()).accepts(&tree, outer, None));

        let leaf = tree.children(inner)[0];
        assert!(!NodeFilter::HasAttribute("name".into()).accepts(&tree, leaf, None));
    }

    #[test]
    fn test_null_compares_as_text() {
        let mut tree = Tree::new();
        let object = person(&mut tree, Scalar::Null, None);
        let filter = NodeFilter::Attribute {
            name: "name".into(),
            test: AttributeTest::Equals("null".into()),
        };
        assert!(filter.accepts(&tree, object, None));
    }

    #[test]
    fn test_combinators() {
        let mut tree = Tree::new();
        let jon = person(&mut tree, "Jon".into(), None);
        tree.set_name(jon, Some("son".into()));

        let filter = NodeFilter::Name("son".into()).and(NodeFilter::Class("object".into()));
        assert!(filter.accepts(&tree, jon, None));
        assert!(!filter.clone().negate().accepts(&tree, jon, None));
        assert_eq!(filter.clone().negate().negate(), filter);

        assert_eq!(NodeFilter::Any.and(NodeFilter::Any), NodeFilter::Any);
        assert_eq!(
            NodeFilter::Any.and(NodeFilter::Name("a".into())),
            NodeFilter::Name("a".into())
        );
        match filter.and(NodeFilter::Id("x".into())) {
            NodeFilter::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected flattened conjunction, got {:?}", other),
        }
    }

    #[test]
    fn test_position() {
        let mut tree = Tree::new();
        let node = tree.create_value(Scalar::Null);
        let filter = NodeFilter::Position(1);
        assert!(filter.accepts(&tree, node, Some(1)));
        assert!(!filter.accepts(&tree, node, Some(0)));
        assert!(!filter.accepts(&tree, node, None));
    }

    #[test]
    fn test_membership_composes() {
        let mut tree = Tree::new();
        let jon = person(&mut tree, "Jon Snow".into(), Some(16));
        let sam = person(&mut tree, "Samwell".into(), None);
        let ghost = tree.create_object();

        let members = NodeFilter::In([jon, sam].into_iter().collect());
        assert!(members.accepts(&tree, jon, None));
        assert!(!members.accepts(&tree, ghost, None));

        let with_age = members.clone().and(NodeFilter::HasAttribute("age".into()));
        assert!(with_age.accepts(&tree, jon, None));
        assert!(!with_age.accepts(&tree, sam, None));

        let outside = members.clone().negate();
        assert!(outside.accepts(&tree, ghost, None));
        assert!(!outside.accepts(&tree, sam, None));
        assert_eq!(outside.negate(), members);
        assert_eq!(members.index_key(), None);
    }

    #[test]
    fn test_index_key_prefers_first_keyed_condition() {
        let filter = NodeFilter::HasAttribute("a".into())
            .and(NodeFilter::Class("object".into()))
            .and(NodeFilter::Name("n".into()));
        assert_eq!(filter.index_key(), Some(IndexKey::Class("object")));
        assert_eq!(NodeFilter::Any.index_key(), None);
    }
}

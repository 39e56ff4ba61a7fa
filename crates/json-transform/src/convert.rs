//! Conversion between `serde_json` values and trees.

use crate::error::Result;
use crate::identifier::{Identifier, CLASS_VERSION};
use crate::node::{NodeId, NodeKind, Scalar, Tree};
use log::warn;
use serde_json::{Map, Number, Value};
use std::sync::OnceLock;

/// How JSON member keys map onto identifiers and back.
pub trait NamingStrategy {
    /// Name and id for a member key.
    fn to_identifier(&self, key: &str) -> (String, Option<String>);

    /// Member key for a node, `None` when the node has no name.
    fn to_key(&self, identifier: &Identifier) -> Option<String>;

    /// Extra members written into an object that is an array element.
    fn array_members(&self, _identifier: &Identifier) -> Vec<(String, String)> {
        Vec::new()
    }
}

/// Keys are names, ids are not represented.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainNaming;

impl NamingStrategy for PlainNaming {
    fn to_identifier(&self, key: &str) -> (String, Option<String>) {
        (key.to_string(), None)
    }

    fn to_key(&self, identifier: &Identifier) -> Option<String> {
        identifier.name().map(str::to_string)
    }
}

/// Keys of the form `"name #id"` carry a hex id.
///
/// Objects inside arrays get their id written back as an `"@id"` member.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineIdNaming;

fn inline_id_regex() -> &'static regex::Regex {
    static RE: OnceLock<regex::Regex> = OnceLock::new();
    RE.get_or_init(|| regex::Regex::new(r"([A-Za-z0-9]+) #(-?[0-9a-f]+)\s*$").unwrap())
}

impl NamingStrategy for InlineIdNaming {
    fn to_identifier(&self, key: &str) -> (String, Option<String>) {
        match inline_id_regex().captures(key) {
            Some(caps) => (caps[1].to_string(), Some(caps[2].to_string())),
            None => (key.to_string(), None),
        }
    }

    fn to_key(&self, identifier: &Identifier) -> Option<String> {
        let name = identifier.name()?;
        Some(match identifier.id() {
            Some(id) => format!("{name} #{id}"),
            None => name.to_string(),
        })
    }

    fn array_members(&self, identifier: &Identifier) -> Vec<(String, String)> {
        identifier
            .id()
            .map(|id| vec![("@id".to_string(), id.to_string())])
            .unwrap_or_default()
    }
}

/// Build a detached subtree from a JSON value.
pub fn value_to_tree(tree: &mut Tree, value: &Value, naming: &dyn NamingStrategy) -> Result<NodeId> {
    convert_value(tree, None, value, naming)
}

fn convert_value(
    tree: &mut Tree,
    key: Option<&str>,
    value: &Value,
    naming: &dyn NamingStrategy,
) -> Result<NodeId> {
    let node = match value {
        Value::Null => tree.create_value(Scalar::Null),
        Value::Bool(b) => tree.create_value(Scalar::Bool(*b)),
        Value::Number(n) => tree.create_value(number_to_scalar(n)),
        Value::String(s) => tree.create_value(Scalar::String(s.clone())),
        Value::Array(items) => {
            let array = tree.create_array();
            for item in items {
                let child = convert_value(tree, None, item, naming)?;
                tree.add_child(array, child)?;
            }
            array
        }
        Value::Object(members) => {
            let object = tree.create_object();
            for (member_key, member) in members {
                let child = convert_value(tree, Some(member_key), member, naming)?;
                tree.add_child(object, child)?;
            }
            object
        }
    };

    if let Some(key) = key {
        let (name, id) = naming.to_identifier(key);
        let identifier = tree.identifier_mut(node);
        identifier.set_name(Some(name));
        identifier.set_id(id);
        if key == "@version" && !value.is_array() && !value.is_object() {
            identifier.add_class(CLASS_VERSION);
        }
    }

    Ok(node)
}

fn number_to_scalar(n: &Number) -> Scalar {
    match n.as_i64() {
        Some(i) => Scalar::Int(i),
        None => n.as_f64().map_or(Scalar::Null, Scalar::Float),
    }
}

/// Serialize a subtree into a JSON value.
pub fn tree_to_value(tree: &Tree, node: NodeId, naming: &dyn NamingStrategy) -> Value {
    match tree.kind(node) {
        NodeKind::Value(scalar) => scalar_to_value(scalar),
        NodeKind::Array(children) => Value::Array(
            children
                .iter()
                .map(|child| {
                    let mut value = tree_to_value(tree, *child, naming);
                    if let Value::Object(members) = &mut value {
                        for (k, v) in naming.array_members(tree.identifier(*child)) {
                            members.insert(k, Value::String(v));
                        }
                    }
                    value
                })
                .collect(),
        ),
        NodeKind::Object(children) => {
            let mut members = Map::new();
            for child in children {
                let Some(key) = naming.to_key(tree.identifier(*child)) else {
                    warn!("dropping unnamed member {} of object {}", child, node);
                    continue;
                };
                if members.contains_key(&key) {
                    warn!("dropping duplicate member '{}' of object {}", key, node);
                    continue;
                }
                members.insert(key, tree_to_value(tree, *child, naming));
            }
            Value::Object(members)
        }
    }
}

fn scalar_to_value(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Null => Value::Null,
        Scalar::Bool(b) => Value::Bool(*b),
        Scalar::Int(i) => Value::from(*i),
        Scalar::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Scalar::String(s) => Value::String(s.clone()),
    }
}

//! Per-node matching metadata.

use indexmap::IndexSet;
use std::fmt;

/// Class given to object nodes.
pub const CLASS_OBJECT: &str = "object";
/// Class given to array nodes.
pub const CLASS_ARRAY: &str = "array";
/// Class given to every scalar node.
pub const CLASS_VALUE: &str = "value";
/// Class given to containers created by a partition step.
pub const CLASS_PARTITIONED: &str = "sysclass_partitioned";
/// Class given to a scalar member named `@version`.
pub const CLASS_VERSION: &str = "sysclass_version";

/// Name, id and class tags of a node.
///
/// Identifiers carry no data content; selectors match on them and nothing
/// else. Every node owns its identifier, so changing one never affects
/// another node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identifier {
    name: Option<String>,
    id: Option<String>,
    classes: IndexSet<String>,
}

impl Identifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: Option<String>) {
        self.id = id;
    }

    /// Class tags in insertion order.
    pub fn classes(&self) -> impl Iterator<Item = &str> + '_ {
        self.classes.iter().map(String::as_str)
    }

    /// Returns `false` if the class was already present.
    pub fn add_class(&mut self, class: impl Into<String>) -> bool {
        self.classes.insert(class.into())
    }

    /// Removes a class, keeping the order of the remaining ones.
    pub fn remove_class(&mut self, class: &str) -> bool {
        self.classes.shift_remove(class)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Identifier[{}, #{}, classes: [{}]]",
            self.name.as_deref().unwrap_or("-"),
            self.id.as_deref().unwrap_or("-"),
            self.classes
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classes_keep_insertion_order() {
        let mut identifier = Identifier::named("age");
        assert!(identifier.add_class("value"));
        assert!(identifier.add_class("int"));
        assert!(!identifier.add_class("value"));
        assert_eq!(identifier.classes().collect::<Vec<_>>(), vec!["value", "int"]);

        assert!(identifier.remove_class("value"));
        identifier.add_class("value");
        assert_eq!(identifier.classes().collect::<Vec<_>>(), vec!["int", "value"]);
    }

    #[test]
    fn test_display() {
        let mut identifier = Identifier::named("person");
        identifier.set_id(Some("7f".into()));
        identifier.add_class("object");
        assert_eq!(
            identifier.to_string(),
            "Identifier[person, #7f, classes: [object]]"
        );
    }
}

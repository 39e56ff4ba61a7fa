//! Mutable JSON trees with CSS-style selectors and a chainable
//! transformation pipeline.
//!
//! A [`Document`] owns a [`Tree`] of value, array and object nodes. Every
//! node carries an [`Identifier`] (member name, optional id and class
//! tags) that selectors match against: `name`, `#id`, `.class`, `[attr]`,
//! `[attr=v]`, `[attr^=v]`, `[attr*=v]` and the descendant combinator.
//!
//! Conversion from JSON tags objects with class `object`, arrays with
//! `array`, and scalars with `value` plus one of `boolean`, `int`, `double`
//! or `string`.
//!
//! # Example
//!
//! ```
//! use json_transform::Document;
//! use serde_json::json;
//!
//! let mut doc = Document::from_value(&json!({
//!     "ned": {"son": {"name": "Jon Snow", "age": 16}},
//!     "castle-black": {"residents": [{"name": "Aemon Targaryen"}]}
//! }))
//! .unwrap();
//!
//! assert_eq!(doc.select("name").unwrap().len(), 2);
//!
//! doc.transform("residents").move_to("ned").apply().unwrap();
//! doc.transform("son").rename_to("heir").apply().unwrap();
//!
//! assert_eq!(
//!     doc.to_value(),
//!     json!({
//!         "ned": {
//!             "heir": {"name": "Jon Snow", "age": 16},
//!             "residents": [{"name": "Aemon Targaryen"}]
//!         },
//!         "castle-black": {}
//!     })
//! );
//! ```

mod error;
pub use error::{Result, TransformError};

mod identifier;
pub use identifier::{
    Identifier, CLASS_ARRAY, CLASS_OBJECT, CLASS_PARTITIONED, CLASS_VALUE, CLASS_VERSION,
};

mod node;
pub use node::{Ancestors, Descendants, JsonType, NodeId, NodeKind, Scalar, Tree};

mod distance;
pub use distance::{distance, NodeDistance};

mod filter;
pub use filter::{AttributeTest, NodeFilter};

mod engine;
pub use engine::CompiledSelector;

mod nodes;
pub use nodes::NodeSet;

mod cache;
pub use cache::CacheIndex;

mod convert;
pub use convert::{tree_to_value, value_to_tree, InlineIdNaming, NamingStrategy, PlainNaming};

mod options;
pub use options::{DocumentOptions, NamingStrategyKind};

mod document;
pub use document::Document;

pub mod transform;
pub use transform::{
    ChildRef, ContainerKind, MergeValueFunction, MergeValues, NewNode, NoopMerge,
    TransformContext, TransformationFunction, Transformer,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fixture() -> Document {
        Document::from_value(&json!({
            "ned": {"son": {"name": "Jon Snow", "status": "alive", "age": 16}},
            "castle-black": {
                "residents": [
                    {"name": "Aemon Targaryen", "title": "Maester", "age": 104},
                    {"name": "Ratty McRatson"}
                ]
            }
        }))
        .unwrap()
    }

    fn names(doc: &Document, set: &NodeSet) -> Vec<String> {
        set.iter()
            .map(|n| doc.tree().name(n).unwrap_or("-").to_string())
            .collect()
    }

    #[test]
    fn test_document_root_is_not_matched() {
        let doc = fixture();
        assert!(doc.select("*").unwrap().iter().all(|n| n != doc.root()));
        assert_eq!(doc.select("*").unwrap().len(), 13);
    }

    #[test]
    fn test_select_single_absent() {
        let doc = fixture();
        assert_eq!(doc.select_single("nothing").unwrap(), None);
        assert!(doc.select_single("son").unwrap().is_some());
    }

    #[test]
    fn test_builder_errors_are_reported_by_apply() {
        let mut doc = fixture();
        let before = doc.to_value();

        let err = doc
            .transform("son")
            .rename_to("heir")
            .move_to("a[")
            .apply()
            .unwrap_err();
        assert!(err.is_parse_error());

        let err = doc.transform("son").add_json("x", "{oops").apply().unwrap_err();
        assert!(matches!(err, TransformError::Document(_)));

        let err = doc.transform("a > b").rename_to("c").apply().unwrap_err();
        assert!(matches!(err, TransformError::UnsupportedSelector(_)));

        assert_eq!(doc.to_value(), before);
    }

    #[test]
    fn test_transform_nodes_scopes_below_set() {
        let mut doc = fixture();
        let castle = doc.select("castle-black").unwrap();
        doc.transform_nodes(castle, "name")
            .manipulate_value(|v| *v = Scalar::from("?"))
            .apply()
            .unwrap();

        assert_eq!(
            doc.to_value()["ned"]["son"]["name"],
            json!("Jon Snow")
        );
        assert_eq!(
            doc.to_value()["castle-black"]["residents"][1]["name"],
            json!("?")
        );
    }

    #[test]
    fn test_apply_returns_document_for_chaining() {
        let mut doc = fixture();
        let found = doc
            .transform("son")
            .rename_to("heir")
            .apply()
            .unwrap()
            .select("heir")
            .unwrap();
        assert_eq!(names(&doc, &found), vec!["heir"]);
    }

    #[test]
    fn test_custom_step() {
        struct Tag;

        impl TransformationFunction for Tag {
            fn name(&self) -> &'static str {
                "tag"
            }

            fn apply(&mut self, ctx: &mut TransformContext<'_>, sources: &NodeSet) -> Result<()> {
                for source in sources {
                    ctx.tree_mut().identifier_mut(source).add_class("tagged");
                    ctx.notify(source);
                }
                Ok(())
            }
        }

        let mut doc = fixture();
        doc.transform("residents .object").step(Tag).apply().unwrap();
        assert_eq!(doc.select(".tagged").unwrap().len(), 2);
    }
}

//! AST construction helpers.

use crate::types::*;

/// Helper functions for constructing selector AST nodes.
pub struct Ast;

impl Ast {
    /// Create a selector list.
    pub fn list(selectors: Vec<Selector>) -> SelectorList {
        SelectorList::new(selectors)
    }

    /// Create a compound selector from a type selector and conditions.
    pub fn compound(element: ElementSelector, conditions: Vec<Condition>) -> CompoundSelector {
        CompoundSelector::new(element, conditions)
    }

    /// Create a selector matching nodes by name: `name`.
    pub fn name(name: impl Into<String>) -> Selector {
        Selector::Compound(CompoundSelector::new(
            ElementSelector::Name(name.into()),
            vec![],
        ))
    }

    /// Create a selector matching everything: `*`.
    pub fn universal() -> Selector {
        Selector::Compound(CompoundSelector::new(ElementSelector::Universal, vec![]))
    }

    /// Chain two selectors with the descendant combinator: `left right`.
    pub fn descendant(left: Selector, right: CompoundSelector) -> Selector {
        Self::combine(left, Combinator::Descendant, right)
    }

    /// Chain two selectors with any combinator.
    pub fn combine(left: Selector, combinator: Combinator, right: CompoundSelector) -> Selector {
        Selector::Combined {
            left: Box::new(left),
            combinator,
            right,
        }
    }

    /// Create an id condition: `#id`.
    pub fn id(id: impl Into<String>) -> Condition {
        Condition::Id(id.into())
    }

    /// Create a class condition: `.class`.
    pub fn class(class: impl Into<String>) -> Condition {
        Condition::Class(class.into())
    }

    /// Create an attribute presence condition: `[name]`.
    pub fn has_attribute(name: impl Into<String>) -> Condition {
        Condition::Attribute(AttributeSelector {
            name: name.into(),
            matcher: None,
        })
    }

    /// Create an attribute value condition: `[name<op>value]`.
    pub fn attribute(
        name: impl Into<String>,
        operator: AttributeOperator,
        value: impl Into<String>,
    ) -> Condition {
        Condition::Attribute(AttributeSelector {
            name: name.into(),
            matcher: Some(AttributeMatcher {
                operator,
                value: value.into(),
            }),
        })
    }
}

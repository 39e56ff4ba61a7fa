//! Selector compilation and evaluation.
//!
//! A selector is compiled into one [`NodeFilter`] per compound selector.
//! Evaluation applies the steps left to right: each step walks the
//! subtrees of the current roots and the matches become the roots of the
//! next step, which is how the descendant combinator narrows the scope.

use crate::error::{Result, TransformError};
use crate::filter::{AttributeTest, NodeFilter};
use crate::node::{NodeId, Tree};
use indexmap::IndexSet;
use json_transform_selector::{
    AttributeOperator, AttributeSelector, Combinator, CompoundSelector, Condition,
    ElementSelector, Selector, SelectorParser,
};
use log::trace;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A parsed and validated selector.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSelector {
    source: String,
    steps: Vec<NodeFilter>,
}

impl CompiledSelector {
    /// Parse and compile selector text.
    ///
    /// Blank text compiles to the identity selector. Constructs outside
    /// the supported subset fail with [`TransformError::UnsupportedSelector`].
    pub fn compile(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::identity());
        }

        let list = SelectorParser::parse(text).map_err(|source| TransformError::Selector {
            selector: text.to_string(),
            source,
        })?;

        let selector = match list.selectors.as_slice() {
            [selector] => selector,
            _ => {
                return Err(TransformError::UnsupportedSelector(format!(
                    "selector list '{text}'"
                )))
            }
        };

        let mut steps = Vec::with_capacity(selector.compound_count());
        compile_selector(selector, &mut steps)?;
        trace!("compiled selector '{}' into {} step(s)", text, steps.len());

        Ok(Self {
            source: text.to_string(),
            steps,
        })
    }

    /// Selector that returns its roots unchanged.
    pub fn identity() -> Self {
        Self {
            source: String::new(),
            steps: Vec::new(),
        }
    }

    /// Selector running a single filter.
    pub fn from_filter(filter: NodeFilter) -> Self {
        Self {
            source: String::new(),
            steps: vec![filter],
        }
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn steps(&self) -> &[NodeFilter] {
        &self.steps
    }
}

impl FromStr for CompiledSelector {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self> {
        Self::compile(s)
    }
}

impl fmt::Display for CompiledSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn compile_selector(selector: &Selector, steps: &mut Vec<NodeFilter>) -> Result<()> {
    match selector {
        Selector::Compound(compound) => {
            steps.push(compile_compound(compound)?);
        }
        Selector::Combined {
            left,
            combinator,
            right,
        } => {
            if *combinator != Combinator::Descendant {
                return Err(TransformError::UnsupportedSelector(format!(
                    "combinator '{}'",
                    combinator.as_str().trim()
                )));
            }
            compile_selector(left, steps)?;
            steps.push(compile_compound(right)?);
        }
    }
    Ok(())
}

fn compile_compound(compound: &CompoundSelector) -> Result<NodeFilter> {
    let mut filter = match &compound.element {
        ElementSelector::Universal => NodeFilter::Any,
        ElementSelector::Name(name) => NodeFilter::Name(name.clone()),
    };

    for condition in &compound.conditions {
        let next = match condition {
            Condition::Id(id) => NodeFilter::Id(id.clone()),
            Condition::Class(class) => NodeFilter::Class(class.clone()),
            Condition::Attribute(attribute) => compile_attribute(attribute)?,
            Condition::PseudoClass(name) => {
                return Err(TransformError::UnsupportedSelector(format!(
                    "pseudo-class ':{name}'"
                )))
            }
        };
        filter = filter.and(next);
    }

    Ok(filter)
}

fn compile_attribute(attribute: &AttributeSelector) -> Result<NodeFilter> {
    let Some(matcher) = &attribute.matcher else {
        return Ok(NodeFilter::HasAttribute(attribute.name.clone()));
    };

    let value = matcher.value.clone();
    let test = match matcher.operator {
        AttributeOperator::Equals => AttributeTest::Equals(value),
        AttributeOperator::Prefix => AttributeTest::Prefix(value),
        AttributeOperator::Substring => AttributeTest::Contains(value),
        other => {
            return Err(TransformError::UnsupportedSelector(format!(
                "attribute operator '{}'",
                other.as_str()
            )))
        }
    };

    Ok(NodeFilter::Attribute {
        name: attribute.name.clone(),
        test,
    })
}

/// Collect every strict descendant of `roots` accepted by `filter`.
///
/// Depth-first pre-order; excluded nodes are neither tested nor entered.
/// Matching a node does not stop the walk from entering its children.
pub(crate) fn traverse<'a, I>(
    tree: &Tree,
    roots: I,
    exclusions: &HashSet<NodeId>,
    filter: &NodeFilter,
) -> IndexSet<NodeId>
where
    I: IntoIterator<Item = &'a NodeId>,
{
    let mut matches = IndexSet::new();
    let mut stack: Vec<(NodeId, usize)> = Vec::new();

    for &root in roots {
        if exclusions.contains(&root) {
            continue;
        }
        push_children(tree, root, &mut stack);

        while let Some((node, index)) = stack.pop() {
            if exclusions.contains(&node) {
                continue;
            }
            if filter.accepts(tree, node, Some(index)) {
                matches.insert(node);
            }
            push_children(tree, node, &mut stack);
        }
    }

    matches
}

fn push_children(tree: &Tree, node: NodeId, stack: &mut Vec<(NodeId, usize)>) {
    stack.extend(
        tree.children(node)
            .iter()
            .copied()
            .enumerate()
            .rev()
            .map(|(index, child)| (child, index)),
    );
}

/// Run every step of `selector` starting from `roots`.
pub(crate) fn evaluate(
    tree: &Tree,
    roots: &IndexSet<NodeId>,
    exclusions: &HashSet<NodeId>,
    selector: &CompiledSelector,
) -> IndexSet<NodeId> {
    let mut current = roots.clone();
    for step in selector.steps() {
        current = traverse(tree, &current, exclusions, step);
        if current.is_empty() {
            break;
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsupported(text: &str) -> String {
        match CompiledSelector::compile(text) {
            Err(TransformError::UnsupportedSelector(what)) => what,
            other => panic!("expected unsupported selector for '{}', got {:?}", text, other),
        }
    }

    #[test]
    fn test_compile_steps() {
        let selector = CompiledSelector::compile("residents .object[name^=Ratty]").unwrap();
        assert_eq!(selector.steps().len(), 2);
        assert_eq!(selector.steps()[0], NodeFilter::Name("residents".into()));
        assert_eq!(
            selector.steps()[1],
            NodeFilter::And(vec![
                NodeFilter::Class("object".into()),
                NodeFilter::Attribute {
                    name: "name".into(),
                    test: AttributeTest::Prefix("Ratty".into()),
                },
            ])
        );
        assert_eq!(selector.to_string(), "residents .object[name^=Ratty]");
    }

    #[test]
    fn test_blank_is_identity() {
        assert!(CompiledSelector::compile("").unwrap().is_identity());
        assert!(CompiledSelector::compile("  \t").unwrap().is_identity());
        assert!(!CompiledSelector::compile("*").unwrap().is_identity());
    }

    #[test]
    fn test_parse_errors_surface_at_compile_time() {
        let err = CompiledSelector::compile("a[").unwrap_err();
        assert!(err.is_parse_error());
        assert!(err.to_string().contains("a["));
    }

    #[test]
    fn test_unsupported_constructs_are_named() {
        assert_eq!(unsupported("a > b"), "combinator '>'");
        assert_eq!(unsupported("a + b"), "combinator '+'");
        assert_eq!(unsupported("a ~ b"), "combinator '~'");
        assert_eq!(unsupported("a:first-child"), "pseudo-class ':first-child'");
        assert_eq!(unsupported("[a$=b]"), "attribute operator '$='");
        assert_eq!(unsupported("[a~=b]"), "attribute operator '~='");
        assert_eq!(unsupported("[a|=b]"), "attribute operator '|='");
        assert_eq!(unsupported("a, b"), "selector list 'a, b'");
    }

    #[test]
    fn test_traverse_skips_roots_and_excluded_subtrees() {
        let mut tree = Tree::new();
        let root = tree.create_object();
        let a = tree.create_object();
        let a1 = tree.create_object();
        let b = tree.create_object();
        tree.add_child(root, a).unwrap();
        tree.add_child(a, a1).unwrap();
        tree.add_child(root, b).unwrap();

        let roots: IndexSet<NodeId> = [root].into_iter().collect();
        let all = traverse(&tree, &roots, &HashSet::new(), &NodeFilter::Any);
        assert_eq!(all.into_iter().collect::<Vec<_>>(), vec![a, a1, b]);

        let excluded: HashSet<NodeId> = [a].into_iter().collect();
        let rest = traverse(&tree, &roots, &excluded, &NodeFilter::Any);
        assert_eq!(rest.into_iter().collect::<Vec<_>>(), vec![b]);
    }
}

use super::{materialize, TransformContext, TransformationFunction};
use crate::error::Result;
use crate::node::{NodeId, Scalar};
use crate::nodes::NodeSet;
use serde_json::Value;

/// Shape of an added container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Array,
    Object,
}

/// Node appended by an add step.
#[derive(Debug, Clone, PartialEq)]
pub enum NewNode {
    /// An existing subtree, adopted by the first source and copied for the
    /// others.
    Subtree(NodeId),
    Scalar(Scalar),
    /// An empty container.
    Container(ContainerKind),
    /// A JSON fragment, converted once per source.
    Json(Value),
}

/// Appends a new child to every source.
pub(crate) struct Adder {
    name: Option<String>,
    node: NewNode,
}

impl Adder {
    pub(crate) fn new(name: Option<String>, node: NewNode) -> Self {
        Self { name, node }
    }
}

impl TransformationFunction for Adder {
    fn name(&self) -> &'static str {
        "add"
    }

    fn apply(&mut self, ctx: &mut TransformContext<'_>, sources: &NodeSet) -> Result<()> {
        let mut adopted = false;
        for source in sources {
            let child = match &self.node {
                NewNode::Subtree(subtree) if adopted => ctx.tree_mut().deep_copy(*subtree),
                other => materialize(ctx, other)?,
            };
            adopted = true;

            let tree = ctx.tree_mut();
            tree.set_name(child, self.name.clone());
            tree.add_child(source, child)?;
            ctx.notify(source);
            ctx.notify_subtree(child);
        }
        Ok(())
    }
}

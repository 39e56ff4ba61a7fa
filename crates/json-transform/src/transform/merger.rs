use super::{TransformContext, TransformationFunction};
use crate::engine::CompiledSelector;
use crate::error::Result;
use crate::node::{JsonType, NodeId, Tree};
use crate::nodes::NodeSet;
use log::debug;

/// Folds a merge source into a scalar destination.
///
/// The method called depends on the shape of the source. All of them do
/// nothing by default.
pub trait MergeValueFunction {
    fn apply_value(&mut self, _tree: &mut Tree, _source: NodeId, _destination: NodeId) -> Result<()> {
        Ok(())
    }

    fn apply_object(&mut self, _tree: &mut Tree, _source: NodeId, _destination: NodeId) -> Result<()> {
        Ok(())
    }

    fn apply_array(&mut self, _tree: &mut Tree, _source: NodeId, _destination: NodeId) -> Result<()> {
        Ok(())
    }
}

/// Leaves scalar destinations untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMerge;

impl MergeValueFunction for NoopMerge {}

/// Adapts a closure that folds scalar sources; container sources are
/// ignored.
pub struct MergeValues<F>(pub F);

impl<F> MergeValueFunction for MergeValues<F>
where
    F: FnMut(&mut Tree, NodeId, NodeId) -> Result<()>,
{
    fn apply_value(&mut self, tree: &mut Tree, source: NodeId, destination: NodeId) -> Result<()> {
        (self.0)(tree, source, destination)
    }
}

/// Merges every source into its resolved destination without moving it.
///
/// Containers adopt a copy of the source. When the destination is an array
/// the source loses its name, and so does the copy. Scalar destinations go
/// through the merge function.
pub(crate) struct Merger<M> {
    destination: CompiledSelector,
    function: M,
}

impl<M: MergeValueFunction> Merger<M> {
    pub(crate) fn new(destination: CompiledSelector, function: M) -> Self {
        Self {
            destination,
            function,
        }
    }
}

impl<M: MergeValueFunction> TransformationFunction for Merger<M> {
    fn name(&self) -> &'static str {
        "merge"
    }

    fn apply(&mut self, ctx: &mut TransformContext<'_>, sources: &NodeSet) -> Result<()> {
        for source in sources {
            let Some(destination) = ctx.resolve_destination(source, &self.destination) else {
                continue;
            };

            if ctx.tree().is_container(destination) {
                let tree = ctx.tree_mut();
                let unnamed = tree.is_array(destination);
                if unnamed {
                    tree.set_name(source, None);
                }
                let copy = tree.deep_copy(source);
                tree.add_child(destination, copy)?;
                ctx.notify_subtree(copy);
                if unnamed {
                    ctx.notify(source);
                }
            } else {
                let tree = ctx.tree_mut();
                match tree.json_type(source) {
                    JsonType::Value => self.function.apply_value(tree, source, destination)?,
                    JsonType::Object => self.function.apply_object(tree, source, destination)?,
                    JsonType::Array => self.function.apply_array(tree, source, destination)?,
                }
                ctx.notify(source);
                ctx.notify(destination);
            }
            debug!("merged node {} into {}", source, destination);
        }
        Ok(())
    }
}

use super::{TransformContext, TransformationFunction};
use crate::engine::CompiledSelector;
use crate::error::Result;
use crate::node::NodeId;
use crate::nodes::NodeSet;

/// Reparents every source under its resolved destination.
///
/// Destinations are resolved for all sources before anything moves.
pub(crate) struct Mover {
    destination: CompiledSelector,
}

impl Mover {
    pub(crate) fn new(destination: CompiledSelector) -> Self {
        Self { destination }
    }
}

impl TransformationFunction for Mover {
    fn name(&self) -> &'static str {
        "move"
    }

    fn apply(&mut self, ctx: &mut TransformContext<'_>, sources: &NodeSet) -> Result<()> {
        let moves: Vec<(NodeId, NodeId)> = sources
            .iter()
            .filter_map(|source| {
                ctx.resolve_destination(source, &self.destination)
                    .map(|destination| (source, destination))
            })
            .collect();

        for (source, destination) in moves {
            ctx.tree_mut().change_parent(source, Some(destination))?;
            ctx.notify(source);
        }
        Ok(())
    }
}

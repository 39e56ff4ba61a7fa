use super::{ChildRef, TransformContext, TransformationFunction};
use crate::error::Result;
use crate::nodes::NodeSet;

/// Detaches one child from every source; absent children are ignored.
pub(crate) struct Deleter {
    target: ChildRef,
}

impl Deleter {
    pub(crate) fn new(target: ChildRef) -> Self {
        Self { target }
    }
}

impl TransformationFunction for Deleter {
    fn name(&self) -> &'static str {
        "delete"
    }

    fn apply(&mut self, ctx: &mut TransformContext<'_>, sources: &NodeSet) -> Result<()> {
        for source in sources {
            let Some(child) = self.target.resolve(ctx.tree(), source) else {
                continue;
            };
            if ctx.tree_mut().remove_child(source, child) {
                ctx.notify(child);
            }
        }
        Ok(())
    }
}

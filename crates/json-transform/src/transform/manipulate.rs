use super::{ChildRef, TransformContext, TransformationFunction};
use crate::error::{Result, TransformError};
use crate::node::Scalar;
use crate::nodes::NodeSet;

/// Mutates a scalar in place: the source itself or one of its children.
pub(crate) struct Manipulator<F> {
    target: Option<ChildRef>,
    function: F,
}

impl<F> Manipulator<F>
where
    F: FnMut(&mut Scalar),
{
    pub(crate) fn new(target: Option<ChildRef>, function: F) -> Self {
        Self { target, function }
    }
}

impl<F> TransformationFunction for Manipulator<F>
where
    F: FnMut(&mut Scalar),
{
    fn name(&self) -> &'static str {
        "manipulate"
    }

    fn apply(&mut self, ctx: &mut TransformContext<'_>, sources: &NodeSet) -> Result<()> {
        for source in sources {
            let target = match &self.target {
                None => Some(source),
                Some(child) => child.resolve(ctx.tree(), source),
            };
            let target = target
                .filter(|t| ctx.tree().is_value(*t))
                .ok_or_else(|| {
                    let at = self.target.as_ref().map_or("itself".into(), ToString::to_string);
                    TransformError::invalid(format!("node {source} has no value at {at}"))
                })?;

            ctx.tree_mut().update_scalar(target, &mut self.function)?;
            ctx.notify(target);
        }
        Ok(())
    }
}

use super::{TransformContext, TransformationFunction};
use crate::error::Result;
use crate::nodes::NodeSet;

/// Renames matched nodes, or one named child of each.
pub(crate) struct Renamer {
    child: Option<String>,
    new_name: String,
}

impl Renamer {
    pub(crate) fn new(child: Option<String>, new_name: &str) -> Self {
        Self {
            child,
            new_name: new_name.to_string(),
        }
    }
}

impl TransformationFunction for Renamer {
    fn name(&self) -> &'static str {
        "rename"
    }

    fn apply(&mut self, ctx: &mut TransformContext<'_>, sources: &NodeSet) -> Result<()> {
        for source in sources {
            let (parent, target) = match &self.child {
                Some(child) => match ctx.tree().find_child(source, child) {
                    Some(target) => (source, target),
                    None => continue,
                },
                None => match ctx.tree().parent(source) {
                    Some(parent) => (parent, source),
                    None => continue,
                },
            };

            if ctx.tree_mut().rename_child(parent, target, &self.new_name) {
                ctx.notify(target);
            }
        }
        Ok(())
    }
}

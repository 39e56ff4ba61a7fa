use super::{TransformContext, TransformationFunction};
use crate::error::{Result, TransformError};
use crate::identifier::CLASS_PARTITIONED;
use crate::node::{NodeId, Tree};
use crate::nodes::NodeSet;
use std::collections::HashSet;

/// Splits named children of every source into new sibling objects.
///
/// Every key of every source is looked up before anything moves, so a
/// missing key fails the step without changing the tree.
pub(crate) struct Partitioner {
    groups: Vec<(String, Vec<String>)>,
}

impl Partitioner {
    /// Groups without keys are dropped.
    pub(crate) fn new(groups: Vec<(String, Vec<String>)>) -> Self {
        Self {
            groups: groups.into_iter().filter(|(_, keys)| !keys.is_empty()).collect(),
        }
    }

    /// Children of `source` to move, per group, in key order.
    fn plan(&self, tree: &Tree, source: NodeId) -> Result<Vec<Vec<NodeId>>> {
        let mut taken = HashSet::new();
        let mut plan = Vec::with_capacity(self.groups.len());

        for (group, keys) in &self.groups {
            let mut children = Vec::with_capacity(keys.len());
            for key in keys {
                let child = tree
                    .children(source)
                    .iter()
                    .copied()
                    .find(|c| tree.name(*c) == Some(key.as_str()) && !taken.contains(c))
                    .ok_or_else(|| {
                        TransformError::MissingTarget(format!(
                            "key '{key}' of partition '{group}' not found on node {source}"
                        ))
                    })?;
                taken.insert(child);
                children.push(child);
            }
            plan.push(children);
        }
        Ok(plan)
    }
}

impl TransformationFunction for Partitioner {
    fn name(&self) -> &'static str {
        "partition"
    }

    fn apply(&mut self, ctx: &mut TransformContext<'_>, sources: &NodeSet) -> Result<()> {
        let mut plans = Vec::new();
        for source in sources {
            let tree = ctx.tree();
            if tree.is_value(source) || tree.parent(source).is_none() {
                continue;
            }
            plans.push((source, self.plan(tree, source)?));
        }

        for (source, plan) in plans {
            let Some(parent) = ctx.tree().parent(source) else {
                continue;
            };

            for ((group, _), children) in self.groups.iter().zip(plan) {
                let tree = ctx.tree_mut();
                let container = tree.create_object();
                tree.set_name(container, Some(group.clone()));
                tree.identifier_mut(container).add_class(CLASS_PARTITIONED);
                tree.add_child(parent, container)?;
                for child in &children {
                    tree.add_child(container, *child)?;
                }

                ctx.notify(container);
                for child in children {
                    ctx.notify(child);
                }
            }
            ctx.notify(source);
        }
        Ok(())
    }
}

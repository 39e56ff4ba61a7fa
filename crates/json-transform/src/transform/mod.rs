//! Selector-scoped transformation pipeline.
//!
//! A [`Transformer`] collects steps bound to one scope selector. When the
//! pipeline is applied, the scope is resolved again right before every
//! step, so a later step sees the nodes as the earlier ones left them.
//! The first failing step aborts the pipeline; steps that already ran
//! stay applied.

mod add;
mod deleter;
mod manipulate;
mod merger;
mod mover;
mod partition;
mod rename;

pub use add::{ContainerKind, NewNode};
pub use merger::{MergeValueFunction, MergeValues, NoopMerge};

use crate::cache::CacheIndex;
use crate::convert::{value_to_tree, NamingStrategy};
use crate::document::Document;
use crate::engine::CompiledSelector;
use crate::error::{Result, TransformError};
use crate::node::{JsonType, NodeId, Scalar, Tree};
use crate::nodes::NodeSet;
use log::debug;
use std::fmt;

/// One step of a pipeline.
pub trait TransformationFunction {
    /// Short label used in log output.
    fn name(&self) -> &'static str;

    /// Run the step against the nodes currently matched by the scope.
    fn apply(&mut self, ctx: &mut TransformContext<'_>, sources: &NodeSet) -> Result<()>;
}

/// A child addressed by name or by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildRef {
    Name(String),
    Index(usize),
}

impl ChildRef {
    /// The referenced child of `node`, if it exists.
    pub fn resolve(&self, tree: &Tree, node: NodeId) -> Option<NodeId> {
        match self {
            ChildRef::Name(name) => tree.find_child(node, name),
            ChildRef::Index(index) => tree.child_at(node, *index).ok(),
        }
    }
}

impl fmt::Display for ChildRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildRef::Name(name) => write!(f, "child '{name}'"),
            ChildRef::Index(index) => write!(f, "child {index}"),
        }
    }
}

/// What a step can reach while it runs.
pub struct TransformContext<'t> {
    tree: &'t mut Tree,
    document: &'t NodeSet,
    naming: &'static dyn NamingStrategy,
    cache: Option<CacheIndex>,
}

impl<'t> TransformContext<'t> {
    pub fn tree(&self) -> &Tree {
        &*self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut *self.tree
    }

    pub fn naming(&self) -> &'static dyn NamingStrategy {
        self.naming
    }

    /// Report a changed identifier or position to the cache index.
    pub fn notify(&mut self, node: NodeId) {
        if let Some(cache) = self.cache.as_mut() {
            cache.notify(self.tree, node);
        }
    }

    /// Report a subtree that was created or attached from elsewhere.
    pub fn notify_subtree(&mut self, node: NodeId) {
        if let Some(cache) = self.cache.as_mut() {
            cache.notify_subtree(self.tree, node);
        }
    }

    fn select_document(&mut self, selector: &CompiledSelector) -> NodeSet {
        match self.cache.as_mut() {
            Some(cache) => cache.select_compiled(self.tree, selector),
            None => self.document.select_compiled(self.tree, selector),
        }
    }

    /// Query the whole document with `excluded` and its subtree hidden.
    pub fn select_document_excluding(
        &mut self,
        selector: &CompiledSelector,
        excluded: NodeId,
    ) -> NodeSet {
        match self.cache.as_mut() {
            Some(cache) => {
                cache.add_exclusion(excluded);
                let result = cache.select_compiled(self.tree, selector);
                cache.clear_exclusions();
                result
            }
            None => {
                let mut document = self.document.clone();
                document.add_exclusion(excluded);
                document.select_compiled(self.tree, selector)
            }
        }
    }

    /// The single destination of `selector` for `source`.
    ///
    /// Several candidates are narrowed to the ones closest to `source`;
    /// `None` when nothing matches or the closest candidates are tied.
    pub fn resolve_destination(
        &mut self,
        source: NodeId,
        selector: &CompiledSelector,
    ) -> Option<NodeId> {
        let candidates = self.select_document_excluding(selector, source);
        match candidates.len() {
            0 => {
                debug!("no destination '{}' for node {}", selector, source);
                None
            }
            1 => candidates.first(),
            n => {
                let closest = candidates.closest_to(self.tree, source);
                if let [single] = closest.as_slice() {
                    Some(single.node)
                } else {
                    debug!(
                        "{} destination(s) '{}' for node {}, {} tied at distance {}",
                        n,
                        selector,
                        source,
                        closest.len(),
                        closest.first().map_or(0, |d| d.distance)
                    );
                    None
                }
            }
        }
    }
}

/// Builder of a transformation pipeline.
///
/// Created by [`Document::transform`] or [`Document::transform_nodes`].
/// Invalid builder input (a malformed selector or JSON fragment) is
/// reported by [`apply`](Self::apply) before any step runs.
pub struct Transformer<'a> {
    document: &'a mut Document,
    destination: Option<NodeSet>,
    scope: CompiledSelector,
    steps: Vec<Box<dyn TransformationFunction + 'a>>,
    error: Option<TransformError>,
}

impl<'a> Transformer<'a> {
    pub(crate) fn new(document: &'a mut Document, destination: Option<NodeSet>, scope: &str) -> Self {
        let (scope, error) = match CompiledSelector::compile(scope) {
            Ok(scope) => (scope, None),
            Err(error) => (CompiledSelector::identity(), Some(error)),
        };
        Self {
            document,
            destination,
            scope,
            steps: Vec::new(),
            error,
        }
    }

    fn compile(&mut self, selector: &str) -> CompiledSelector {
        match CompiledSelector::compile(selector) {
            Ok(compiled) => compiled,
            Err(error) => {
                self.error.get_or_insert(error);
                CompiledSelector::identity()
            }
        }
    }

    /// Append a custom step.
    pub fn step(mut self, step: impl TransformationFunction + 'a) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Rename every matched node.
    pub fn rename_to(self, new_name: &str) -> Self {
        self.step(rename::Renamer::new(None, new_name))
    }

    /// Rename the child `from` of every matched node.
    pub fn rename_child(self, from: &str, to: &str) -> Self {
        let child = (!from.is_empty()).then(|| from.to_string());
        self.step(rename::Renamer::new(child, to))
    }

    /// Reparent every matched node under its single closest `destination`.
    pub fn move_to(mut self, destination: &str) -> Self {
        let destination = self.compile(destination);
        self.step(mover::Mover::new(destination))
    }

    /// Merge every matched node into its single closest `destination`.
    pub fn merge(self, destination: &str) -> Self {
        self.merge_with(destination, NoopMerge)
    }

    /// [`merge`](Self::merge) with a function folding sources into scalar
    /// destinations.
    pub fn merge_with(mut self, destination: &str, function: impl MergeValueFunction + 'a) -> Self {
        let destination = self.compile(destination);
        self.step(merger::Merger::new(destination, function))
    }

    pub fn delete_child(self, name: &str) -> Self {
        self.step(deleter::Deleter::new(ChildRef::Name(name.to_string())))
    }

    pub fn delete_child_at(self, index: usize) -> Self {
        self.step(deleter::Deleter::new(ChildRef::Index(index)))
    }

    /// Add an empty child of the given shape; values start as `null`.
    pub fn add(self, name: &str, json_type: JsonType) -> Self {
        let node = match json_type {
            JsonType::Value => NewNode::Scalar(Scalar::Null),
            JsonType::Array => NewNode::Container(ContainerKind::Array),
            JsonType::Object => NewNode::Container(ContainerKind::Object),
        };
        self.add_node(name, node)
    }

    pub fn add_value(self, name: &str, value: impl Into<Scalar>) -> Self {
        self.add_node(name, NewNode::Scalar(value.into()))
    }

    /// Append an unnamed scalar, typically to arrays.
    pub fn add_unnamed_value(self, value: impl Into<Scalar>) -> Self {
        self.step(add::Adder::new(None, NewNode::Scalar(value.into())))
    }

    pub fn add_node(self, name: &str, node: NewNode) -> Self {
        self.step(add::Adder::new(Some(name.to_string()), node))
    }

    /// Add a JSON fragment verbatim.
    pub fn add_json(mut self, name: &str, json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(value) => self.add_node(name, NewNode::Json(value)),
            Err(error) => {
                self.error.get_or_insert(TransformError::Document(error));
                self
            }
        }
    }

    /// Split named children out into new sibling objects.
    ///
    /// Each group is the name of the new object and the keys moved into it.
    pub fn partition<N, K, I>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = (N, Vec<K>)>,
        N: Into<String>,
        K: Into<String>,
    {
        let groups = groups
            .into_iter()
            .map(|(name, keys)| (name.into(), keys.into_iter().map(Into::into).collect()))
            .collect();
        self.step(partition::Partitioner::new(groups))
    }

    /// Mutate every matched scalar node.
    pub fn manipulate_value<F>(self, function: F) -> Self
    where
        F: FnMut(&mut Scalar) + 'a,
    {
        self.step(manipulate::Manipulator::new(None, function))
    }

    /// Mutate the scalar child `name` of every matched node.
    pub fn manipulate_child<F>(self, name: &str, function: F) -> Self
    where
        F: FnMut(&mut Scalar) + 'a,
    {
        self.step(manipulate::Manipulator::new(
            Some(ChildRef::Name(name.to_string())),
            function,
        ))
    }

    /// Mutate the scalar child at `index` of every matched node.
    pub fn manipulate_index<F>(self, index: usize, function: F) -> Self
    where
        F: FnMut(&mut Scalar) + 'a,
    {
        self.step(manipulate::Manipulator::new(Some(ChildRef::Index(index)), function))
    }

    /// Run every step in order and hand the document back.
    pub fn apply(self) -> Result<&'a mut Document> {
        let Transformer {
            document,
            destination,
            scope,
            mut steps,
            error,
        } = self;

        if let Some(error) = error {
            return Err(error);
        }

        let options = document.options().clone();
        {
            let (tree, nodes) = document.parts_mut();
            let mut ctx = TransformContext {
                tree,
                document: nodes,
                naming: options.naming.strategy(),
                cache: options.caching.then(|| CacheIndex::new(nodes.clone())),
            };

            for step in steps.iter_mut() {
                let sources = match &destination {
                    Some(set) => set.select_compiled(ctx.tree, &scope),
                    None => ctx.select_document(&scope),
                };
                debug!(
                    "{}: {} node(s) matched by '{}'",
                    step.name(),
                    sources.len(),
                    scope
                );
                step.apply(&mut ctx, &sources)?;
            }
        }

        Ok(document)
    }
}

/// Build a detached subtree for `node`; `Subtree` handles are returned as is.
pub(crate) fn materialize(ctx: &mut TransformContext<'_>, node: &NewNode) -> Result<NodeId> {
    Ok(match node {
        NewNode::Subtree(id) => *id,
        NewNode::Scalar(value) => ctx.tree.create_value(value.clone()),
        NewNode::Container(ContainerKind::Array) => ctx.tree.create_array(),
        NewNode::Container(ContainerKind::Object) => ctx.tree.create_object(),
        NewNode::Json(value) => {
            let naming = ctx.naming;
            value_to_tree(ctx.tree, value, naming)?
        }
    })
}

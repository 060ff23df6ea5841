//! Seam to the external dependency resolver.
//!
//! The resolver hands out a tree of [`ResolvedRecord`]s per project. Each
//! record is adapted exactly once into a [`DependencyNode`] when the
//! [`DependencyTree`] is built, and the tree is then walked depth-first with
//! paired `enter`/`leave` callbacks.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;

use crate::core::artifact::Artifact;
use crate::core::node::DependencyNode;
use crate::graph::GraphError;

pub mod json;
pub mod record;

pub use record::{RecordShape, ResolvedRecord};

/// Depth-first enter/leave protocol over resolved dependency nodes.
///
/// Returning `false` from `enter` skips the node's children; `leave` is still
/// called for it. Returning `false` from `leave` stops the walk.
pub trait DependencyVisitor {
    fn enter(&mut self, node: &DependencyNode) -> bool;
    fn leave(&mut self, node: &DependencyNode) -> bool;
}

/// A module taking part in a graph-generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub artifact: Artifact,
    pub parent: Option<Artifact>,
}

impl Project {
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact,
            parent: None,
        }
    }

    pub fn with_parent(mut self, parent: Artifact) -> Self {
        self.parent = Some(parent);
        self
    }
}

/// Hands out the resolved tree of a project. Trees are shared, never deep-copied.
pub trait DependencyResolver: Send + Sync {
    fn resolve(&self, project: &Project) -> anyhow::Result<Arc<ResolvedRecord>>;
}

/// Resolver backed by trees that were resolved ahead of time.
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    trees: HashMap<String, Arc<ResolvedRecord>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, project: &Artifact, tree: ResolvedRecord) {
        self.trees.insert(project.coordinates(), Arc::new(tree));
    }
}

impl DependencyResolver for StaticResolver {
    fn resolve(&self, project: &Project) -> anyhow::Result<Arc<ResolvedRecord>> {
        let key = project.artifact.coordinates();
        self.trees
            .get(&key)
            .map(Arc::clone)
            .ok_or_else(|| anyhow!("no resolved dependency tree for {key}"))
    }
}

#[derive(Debug)]
struct TreeEntry {
    node: DependencyNode,
    children: Vec<usize>,
}

/// Adapted resolver output, stored flat so arbitrarily deep trees are
/// built and walked without recursion.
#[derive(Debug)]
pub struct DependencyTree {
    entries: Vec<TreeEntry>,
}

impl DependencyTree {
    pub fn from_record(root: &ResolvedRecord) -> Result<Self, GraphError> {
        let mut entries = Vec::new();
        let mut pending: Vec<(&ResolvedRecord, Option<usize>)> = vec![(root, None)];

        while let Some((record, parent)) = pending.pop() {
            let index = entries.len();
            entries.push(TreeEntry {
                node: DependencyNode::from_record(record)?,
                children: Vec::new(),
            });
            if let Some(parent) = parent {
                entries[parent].children.push(index);
            }
            // Reversed so children come off the stack, and get registered, in order.
            for child in record.children.iter().rev() {
                pending.push((child, Some(index)));
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walks the tree depth-first. Returns `false` if the visitor stopped the walk.
    pub fn accept<V: DependencyVisitor + ?Sized>(&self, visitor: &mut V) -> bool {
        let Some(root) = self.entries.first() else {
            return true;
        };
        if !visitor.enter(&root.node) {
            return visitor.leave(&root.node);
        }

        let mut stack: Vec<(usize, usize)> = vec![(0, 0)];
        while let Some(top) = stack.last_mut() {
            let (index, position) = *top;
            let children = &self.entries[index].children;
            if position < children.len() {
                top.1 += 1;
                let child = children[position];
                let node = &self.entries[child].node;
                if visitor.enter(node) {
                    stack.push((child, 0));
                } else if !visitor.leave(node) {
                    return false;
                }
            } else {
                stack.pop();
                if !visitor.leave(&self.entries[index].node) {
                    return false;
                }
            }
        }
        true
    }
}

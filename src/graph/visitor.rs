use std::collections::HashSet;

use tracing::trace;

use crate::core::artifact::TEST_SCOPE;
use crate::core::node::{DependencyNode, NodeResolution};
use crate::graph::builder::GraphBuilder;
use crate::graph::filter::ArtifactFilter;
use crate::resolver::DependencyVisitor;

/// Predicates deciding which resolver nodes become part of the graph.
#[derive(Debug, Clone)]
pub struct TraversalSettings {
    pub global_filter: ArtifactFilter,
    /// Applied to nodes below the direct dependencies only.
    pub transitive_filter: ArtifactFilter,
    /// Nodes leading to a target produce edges. Accepting everything draws the whole tree.
    pub target_filter: ArtifactFilter,
    pub included_resolutions: HashSet<NodeResolution>,
    /// Skip an edge when its target is already reachable from its source.
    /// `test` scoped edges are never skipped.
    pub omit_reachable_paths: bool,
}

impl Default for TraversalSettings {
    fn default() -> Self {
        Self {
            global_filter: ArtifactFilter::accept_all(),
            transitive_filter: ArtifactFilter::accept_all(),
            target_filter: ArtifactFilter::accept_all(),
            included_resolutions: [NodeResolution::Included, NodeResolution::Parent]
                .into_iter()
                .collect(),
            omit_reachable_paths: false,
        }
    }
}

/// Maps one resolver tree onto a [`GraphBuilder`].
///
/// Lives for exactly one traversal: the stack and the cutoff depth are never
/// shared between trees.
pub struct GraphBuildingVisitor<'a> {
    builder: &'a mut GraphBuilder<DependencyNode>,
    settings: &'a TraversalSettings,
    stack: Vec<DependencyNode>,
    cutoff_depth: usize,
    skipping: bool,
}

impl<'a> GraphBuildingVisitor<'a> {
    pub fn new(
        builder: &'a mut GraphBuilder<DependencyNode>,
        settings: &'a TraversalSettings,
    ) -> Self {
        Self {
            builder,
            settings,
            stack: Vec::new(),
            cutoff_depth: 0,
            skipping: false,
        }
    }

    fn is_excluded(&self, node: &DependencyNode, depth: usize) -> bool {
        let artifact = node.artifact();
        !self.settings.global_filter.accepts(artifact)
            || (depth > 1 && !self.settings.transitive_filter.accepts(artifact))
            || !self
                .settings
                .included_resolutions
                .contains(&node.resolution())
    }

    fn emit(&mut self, parent: &DependencyNode, node: DependencyNode) {
        if let Some(existing) = self.builder.effective_node_mut(&node) {
            existing.merge(&node);
        }

        let is_test = node.artifact().scope() == Some(TEST_SCOPE);
        if self.settings.omit_reachable_paths
            && !is_test
            && self.builder.is_reachable(parent, &node)
        {
            trace!(
                from = %parent.artifact().coordinates(),
                to = %node.artifact().coordinates(),
                "skipping edge to already reachable node"
            );
            return;
        }
        self.builder.add_edge(parent, &node);
    }
}

impl DependencyVisitor for GraphBuildingVisitor<'_> {
    fn enter(&mut self, node: &DependencyNode) -> bool {
        if self.is_excluded(node, self.stack.len()) {
            // The walker skips the children and calls `leave` for this node next.
            self.skipping = true;
            return false;
        }

        self.stack.push(node.clone());
        if self.settings.target_filter.accepts(node.artifact()) {
            self.cutoff_depth = self.stack.len();
        }
        true
    }

    fn leave(&mut self, _node: &DependencyNode) -> bool {
        if std::mem::take(&mut self.skipping) {
            return true;
        }
        let Some(node) = self.stack.pop() else {
            return true;
        };

        let depth = self.stack.len();
        if depth < self.cutoff_depth {
            match self.stack.last().cloned() {
                Some(parent) => self.emit(&parent, node),
                None => {
                    self.builder.add_node(node);
                }
            }
            self.cutoff_depth = depth;
        }
        true
    }
}

use std::collections::{HashMap, HashSet};

use tracing::{info, instrument, warn};

use crate::core::artifact::Artifact;
use crate::core::node::DependencyNode;
use crate::graph::builder::GraphBuilder;
use crate::graph::render::{
    DependencyEdgeRenderer, DependencyNodeIdRenderer, DependencyNodeNameRenderer,
};
use crate::graph::visitor::{GraphBuildingVisitor, TraversalSettings};
use crate::graph::GraphError;
use crate::resolver::{DependencyResolver, DependencyTree, Project};

/// Everything one graph-generation request needs besides its input.
#[derive(Debug, Clone)]
pub struct GraphSettings {
    pub traversal: TraversalSettings,
    pub id_renderer: DependencyNodeIdRenderer,
    pub name_renderer: DependencyNodeNameRenderer,
    pub edge_renderer: DependencyEdgeRenderer,
    pub omit_self_references: bool,
    pub reduce_edges: bool,
    pub show_parents: bool,
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            traversal: TraversalSettings::default(),
            id_renderer: DependencyNodeIdRenderer::versionless(),
            name_renderer: DependencyNodeNameRenderer::default(),
            edge_renderer: DependencyEdgeRenderer::default(),
            omit_self_references: true,
            reduce_edges: false,
            show_parents: true,
        }
    }
}

impl GraphSettings {
    pub fn new_builder(&self) -> GraphBuilder<DependencyNode> {
        GraphBuilder::new(self.id_renderer)
            .with_node_name_renderer(self.name_renderer)
            .with_edge_renderer(self.edge_renderer)
            .omit_self_references(self.omit_self_references)
    }
}

fn traverse_project<R>(
    resolver: &R,
    settings: &GraphSettings,
    project: &Project,
    builder: &mut GraphBuilder<DependencyNode>,
) -> Result<(), GraphError>
where
    R: DependencyResolver + ?Sized,
{
    let record = resolver
        .resolve(project)
        .map_err(|source| GraphError::Resolution {
            project: project.artifact.coordinates(),
            source,
        })?;
    let tree = DependencyTree::from_record(&record)?;
    let mut visitor = GraphBuildingVisitor::new(builder, &settings.traversal);
    if !tree.accept(&mut visitor) {
        warn!(
            project = %project.artifact.coordinates(),
            "dependency traversal stopped early"
        );
    }
    Ok(())
}

/// Graph of a single project's dependency tree.
pub struct SimpleGraphFactory<'a, R: ?Sized> {
    resolver: &'a R,
    settings: &'a GraphSettings,
}

impl<'a, R> SimpleGraphFactory<'a, R>
where
    R: DependencyResolver + ?Sized,
{
    pub fn new(resolver: &'a R, settings: &'a GraphSettings) -> Self {
        Self { resolver, settings }
    }

    #[instrument(skip_all, fields(project = %project.artifact.coordinates()))]
    pub fn create_graph(&self, project: &Project) -> Result<GraphBuilder<DependencyNode>, GraphError> {
        let mut builder = self.settings.new_builder();
        traverse_project(self.resolver, self.settings, project, &mut builder)?;
        if self.settings.reduce_edges {
            builder.reduce_edges();
        }
        info!(
            nodes = builder.node_count(),
            edges = builder.edges().len(),
            "built dependency graph"
        );
        Ok(builder)
    }
}

/// One graph for all modules of a multi-module build.
pub struct AggregatingGraphFactory<'a, R: ?Sized> {
    resolver: &'a R,
    settings: &'a GraphSettings,
}

impl<'a, R> AggregatingGraphFactory<'a, R>
where
    R: DependencyResolver + ?Sized,
{
    pub fn new(resolver: &'a R, settings: &'a GraphSettings) -> Self {
        Self { resolver, settings }
    }

    #[instrument(skip_all, fields(projects = projects.len()))]
    pub fn create_graph(
        &self,
        projects: &[Project],
    ) -> Result<GraphBuilder<DependencyNode>, GraphError> {
        let mut builder = self.settings.new_builder();
        if self.settings.show_parents {
            self.add_parent_edges(projects, &mut builder);
        }
        for project in projects {
            traverse_project(self.resolver, self.settings, project, &mut builder)?;
        }
        if self.settings.reduce_edges {
            builder.reduce_edges();
        }
        info!(
            nodes = builder.node_count(),
            edges = builder.edges().len(),
            "built aggregated dependency graph"
        );
        Ok(builder)
    }

    /// Permanent edges from every parent in a module's parent chain to its child.
    fn add_parent_edges(&self, projects: &[Project], builder: &mut GraphBuilder<DependencyNode>) {
        let by_coordinates: HashMap<String, &Project> = projects
            .iter()
            .map(|project| (project.artifact.coordinates(), project))
            .collect();

        for project in projects {
            let mut child = &project.artifact;
            let mut child_is_parent = false;
            let mut parent = project.parent.as_ref();
            let mut seen = HashSet::new();

            while let Some(parent_artifact) = parent {
                if !seen.insert(parent_artifact.coordinates()) {
                    warn!(
                        project = %project.artifact.coordinates(),
                        "cyclic parent chain"
                    );
                    break;
                }
                let parent_node = self.filter_project(parent_artifact, true);
                let child_node = self.filter_project(child, child_is_parent);
                if let (Some(parent_node), Some(child_node)) = (parent_node, child_node) {
                    builder.add_permanent_edge(&parent_node, &child_node);
                }

                child = parent_artifact;
                child_is_parent = true;
                parent = by_coordinates
                    .get(&parent_artifact.coordinates())
                    .copied()
                    .and_then(|next| next.parent.as_ref());
            }
        }
    }

    fn filter_project(&self, artifact: &Artifact, is_parent: bool) -> Option<DependencyNode> {
        if !self.settings.traversal.global_filter.accepts(artifact) {
            return None;
        }
        let node = if is_parent {
            DependencyNode::parent(artifact.clone())
        } else {
            DependencyNode::new(artifact.clone())
        };
        Some(node)
    }
}

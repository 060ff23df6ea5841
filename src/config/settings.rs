use std::path::Path;

use serde::Deserialize;

use crate::config::ConfigError;
use crate::core::node::NodeResolution;
use crate::graph::factory::GraphSettings;
use crate::graph::filter::ArtifactFilter;
use crate::graph::render::{
    DependencyEdgeRenderer, DependencyNodeIdRenderer, DependencyNodeNameRenderer, IdFormat,
};
use crate::graph::visitor::TraversalSettings;
use crate::style::{StyleConfiguration, StyleResolver};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DepgraphConfig {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub style: StyleConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reduce_edges: Option<bool>,
    #[serde(default)]
    pub omit_self_references: Option<bool>,
    #[serde(default)]
    pub omit_reachable_paths: Option<bool>,
    #[serde(default)]
    pub show_duplicates: Option<bool>,
    #[serde(default)]
    pub show_conflicts: Option<bool>,
    #[serde(default)]
    pub show_cycles: Option<bool>,
    #[serde(default)]
    pub show_parents: Option<bool>,
    #[serde(default)]
    pub merge_types: Option<bool>,
    #[serde(default)]
    pub merge_classifiers: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub includes: Option<Vec<String>>,
    #[serde(default)]
    pub excludes: Option<Vec<String>>,
    #[serde(default)]
    pub transitive_includes: Option<Vec<String>>,
    #[serde(default)]
    pub transitive_excludes: Option<Vec<String>>,
    #[serde(default)]
    pub targets: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderConfig {
    #[serde(default)]
    pub id_format: Option<IdFormat>,
    #[serde(default)]
    pub show_group_ids: Option<bool>,
    #[serde(default)]
    pub show_versions: Option<bool>,
    #[serde(default)]
    pub show_types: Option<bool>,
    #[serde(default)]
    pub show_classifiers: Option<bool>,
    #[serde(default)]
    pub show_scopes: Option<bool>,
    #[serde(default)]
    pub show_optional: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    pub path: Option<String>,
}

fn list(values: &Option<Vec<String>>) -> &[String] {
    values.as_deref().unwrap_or(&[])
}

impl DepgraphConfig {
    pub fn graph_settings(&self) -> Result<GraphSettings, ConfigError> {
        let graph = &self.graph;
        let filter = &self.filter;
        let render = &self.render;
        let defaults = GraphSettings::default();

        let mut included_resolutions = TraversalSettings::default().included_resolutions;
        let optional_resolutions = [
            (graph.show_duplicates, NodeResolution::OmittedForDuplicate),
            (graph.show_conflicts, NodeResolution::OmittedForConflict),
            (graph.show_cycles, NodeResolution::OmittedForCycle),
        ];
        for (enabled, resolution) in optional_resolutions {
            if enabled.unwrap_or(false) {
                included_resolutions.insert(resolution);
            }
        }

        let traversal = TraversalSettings {
            global_filter: ArtifactFilter::new(list(&filter.includes), list(&filter.excludes))?,
            transitive_filter: ArtifactFilter::new(
                list(&filter.transitive_includes),
                list(&filter.transitive_excludes),
            )?,
            target_filter: ArtifactFilter::new(list(&filter.targets), Vec::<String>::new())?,
            included_resolutions,
            omit_reachable_paths: graph.omit_reachable_paths.unwrap_or(false),
        };

        let id_renderer = DependencyNodeIdRenderer::for_format(render.id_format.unwrap_or_default());
        let id_renderer = match render.id_format.unwrap_or_default() {
            IdFormat::GroupOnly => id_renderer,
            _ => id_renderer
                .with_types(!graph.merge_types.unwrap_or(false))
                .with_classifiers(!graph.merge_classifiers.unwrap_or(false)),
        };

        let name_defaults = DependencyNodeNameRenderer::default();
        let show_versions = render.show_versions.unwrap_or(name_defaults.show_versions);
        let name_renderer = DependencyNodeNameRenderer {
            show_group_ids: render.show_group_ids.unwrap_or(name_defaults.show_group_ids),
            show_artifact_ids: render.id_format != Some(IdFormat::GroupOnly),
            show_versions,
            show_types: render.show_types.unwrap_or(name_defaults.show_types),
            show_classifiers: render
                .show_classifiers
                .unwrap_or(name_defaults.show_classifiers),
            show_scopes: render.show_scopes.unwrap_or(name_defaults.show_scopes),
            show_optional: render.show_optional.unwrap_or(name_defaults.show_optional),
        };
        let edge_renderer = DependencyEdgeRenderer {
            show_scope: render.show_scopes.unwrap_or(true),
            show_versions,
        };

        Ok(GraphSettings {
            traversal,
            id_renderer,
            name_renderer,
            edge_renderer,
            omit_self_references: graph
                .omit_self_references
                .unwrap_or(defaults.omit_self_references),
            reduce_edges: graph.reduce_edges.unwrap_or(defaults.reduce_edges),
            show_parents: graph.show_parents.unwrap_or(defaults.show_parents),
        })
    }

    /// Loads and validates the configured style file. Relative paths are
    /// resolved against `base_dir`.
    pub fn style_resolver(&self, base_dir: Option<&Path>) -> Result<StyleResolver, ConfigError> {
        let Some(path) = self.style.path.as_deref() else {
            return Ok(StyleResolver::default());
        };
        let path = match base_dir {
            Some(base) => base.join(path),
            None => Path::new(path).to_path_buf(),
        };
        StyleResolver::new(StyleConfiguration::load(&path)?)
    }
}

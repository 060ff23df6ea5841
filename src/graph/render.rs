use serde::Deserialize;

use crate::core::artifact::DEFAULT_SCOPE;
use crate::core::node::{DependencyNode, NodeResolution};
use crate::graph::{EdgeRenderer, NodeRenderer};

/// Which coordinates make up a node id. Nodes with equal ids are one graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyNodeIdRenderer {
    pub group_id: bool,
    pub artifact_id: bool,
    pub types: bool,
    pub classifiers: bool,
    pub version: bool,
    pub scope: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdFormat {
    #[default]
    Versionless,
    Versioned,
    Scoped,
    GroupOnly,
}

impl DependencyNodeIdRenderer {
    pub fn versionless() -> Self {
        Self {
            group_id: true,
            artifact_id: true,
            types: true,
            classifiers: true,
            version: false,
            scope: false,
        }
    }

    pub fn versioned() -> Self {
        Self {
            version: true,
            ..Self::versionless()
        }
    }

    pub fn scoped() -> Self {
        Self {
            scope: true,
            ..Self::versioned()
        }
    }

    pub fn group_only() -> Self {
        Self {
            group_id: true,
            artifact_id: false,
            types: false,
            classifiers: false,
            version: false,
            scope: false,
        }
    }

    pub fn for_format(format: IdFormat) -> Self {
        match format {
            IdFormat::Versionless => Self::versionless(),
            IdFormat::Versioned => Self::versioned(),
            IdFormat::Scoped => Self::scoped(),
            IdFormat::GroupOnly => Self::group_only(),
        }
    }

    pub fn with_types(mut self, types: bool) -> Self {
        self.types = types;
        self
    }

    pub fn with_classifiers(mut self, classifiers: bool) -> Self {
        self.classifiers = classifiers;
        self
    }
}

impl NodeRenderer<DependencyNode> for DependencyNodeIdRenderer {
    fn render(&self, node: &DependencyNode) -> String {
        let artifact = node.artifact();
        let mut parts: Vec<&str> = Vec::new();
        if self.group_id {
            parts.push(&artifact.group_id);
        }
        if self.artifact_id {
            parts.push(&artifact.artifact_id);
        }
        if self.types {
            parts.push(&artifact.type_);
        }
        if self.classifiers {
            if let Some(classifier) = artifact.classifier() {
                parts.push(classifier);
            }
        }
        if self.version {
            parts.push(&artifact.version);
        }
        if self.scope {
            parts.push(artifact.scope().unwrap_or(DEFAULT_SCOPE));
        }
        parts.join(":")
    }
}

/// Multi-line node label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyNodeNameRenderer {
    pub show_group_ids: bool,
    pub show_artifact_ids: bool,
    pub show_versions: bool,
    pub show_types: bool,
    pub show_classifiers: bool,
    pub show_scopes: bool,
    pub show_optional: bool,
}

impl Default for DependencyNodeNameRenderer {
    fn default() -> Self {
        Self {
            show_group_ids: true,
            show_artifact_ids: true,
            show_versions: true,
            show_types: false,
            show_classifiers: false,
            show_scopes: true,
            show_optional: true,
        }
    }
}

impl NodeRenderer<DependencyNode> for DependencyNodeNameRenderer {
    fn render(&self, node: &DependencyNode) -> String {
        let artifact = node.artifact();
        let mut lines = Vec::new();
        if self.show_group_ids {
            lines.push(artifact.group_id.clone());
        }
        if self.show_artifact_ids {
            lines.push(artifact.artifact_id.clone());
        }
        if self.show_versions {
            if node.effective_version() == artifact.version {
                lines.push(artifact.version.clone());
            } else {
                lines.push(format!("{} ({})", artifact.version, node.effective_version()));
            }
        }
        if self.show_types {
            let types: Vec<String> = node.types().iter().map(|t| format!(".{t}")).collect();
            lines.push(types.join("/"));
        }
        if self.show_classifiers && !node.classifiers().is_empty() {
            let classifiers: Vec<&str> = node.classifiers().iter().map(String::as_str).collect();
            lines.push(classifiers.join("/"));
        }
        if self.show_scopes && !node.scopes().is_empty() {
            let scopes: Vec<&str> = node.scopes().iter().map(String::as_str).collect();
            lines.push(format!("({})", scopes.join("/")));
        }
        if self.show_optional && node.is_optional() {
            lines.push("optional".to_string());
        }
        lines.join("\n")
    }
}

/// Edge attribute text: the dependency's scope unless it is `compile`, and
/// the winning version for conflict losers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyEdgeRenderer {
    pub show_scope: bool,
    pub show_versions: bool,
}

impl Default for DependencyEdgeRenderer {
    fn default() -> Self {
        Self {
            show_scope: true,
            show_versions: true,
        }
    }
}

impl EdgeRenderer<DependencyNode> for DependencyEdgeRenderer {
    fn render(&self, from: &DependencyNode, to: &DependencyNode) -> String {
        if from.resolution() == NodeResolution::Parent {
            return "parent".to_string();
        }
        let mut parts = Vec::new();
        if self.show_scope {
            if let Some(scope) = to.artifact().scope() {
                if scope != DEFAULT_SCOPE {
                    parts.push(scope.to_string());
                }
            }
        }
        if self.show_versions && to.resolution() == NodeResolution::OmittedForConflict {
            parts.push(format!(
                "{} -> {}",
                to.artifact().version,
                to.effective_version()
            ));
        }
        parts.join(", ")
    }
}

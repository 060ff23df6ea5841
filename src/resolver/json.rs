use std::path::Path;

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::core::artifact::Artifact;
use crate::resolver::record::ResolvedRecord;
use crate::resolver::{Project, StaticResolver};

/// Multi-module build description: every module with its resolved tree.
#[derive(Debug, Clone, Deserialize)]
pub struct Reactor {
    #[serde(default)]
    pub name: Option<String>,
    pub projects: Vec<ReactorProject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReactorProject {
    pub artifact: Artifact,
    #[serde(default)]
    pub parent: Option<Artifact>,
    pub tree: ResolvedRecord,
}

impl Reactor {
    pub fn into_parts(self) -> (Vec<Project>, StaticResolver) {
        let mut resolver = StaticResolver::new();
        let mut projects = Vec::with_capacity(self.projects.len());
        for entry in self.projects {
            resolver.insert(&entry.artifact, entry.tree);
            projects.push(Project {
                artifact: entry.artifact,
                parent: entry.parent,
            });
        }
        (projects, resolver)
    }
}

pub fn load_tree(path: &Path) -> anyhow::Result<ResolvedRecord> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read dependency tree {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse dependency tree {}", path.display()))
}

pub fn load_reactor(path: &Path) -> anyhow::Result<Reactor> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read reactor {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse reactor {}", path.display()))
}

/// Single-project request: the project is the root record's artifact.
pub fn single_project(tree: ResolvedRecord) -> anyhow::Result<(Project, StaticResolver)> {
    let artifact = tree
        .artifact
        .clone()
        .ok_or_else(|| anyhow!("dependency tree root has no artifact"))?;
    let mut resolver = StaticResolver::new();
    resolver.insert(&artifact, tree);
    Ok((Project::new(artifact), resolver))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::DependencyResolver;

    #[test]
    fn reactor_splits_into_projects_and_resolver() {
        let json = r#"{
            "projects": [
                {
                    "artifact": {"groupId": "g", "artifactId": "parent", "version": "1.0", "type": "pom"},
                    "tree": {"shape": "graph", "artifact": {"groupId": "g", "artifactId": "parent", "version": "1.0", "type": "pom"}}
                },
                {
                    "artifact": {"groupId": "g", "artifactId": "module", "version": "1.0"},
                    "parent": {"groupId": "g", "artifactId": "parent", "version": "1.0", "type": "pom"},
                    "tree": {"shape": "graph", "artifact": {"groupId": "g", "artifactId": "module", "version": "1.0"}}
                }
            ]
        }"#;
        let reactor: Reactor = serde_json::from_str(json).expect("parse reactor");
        let (projects, resolver) = reactor.into_parts();
        assert_eq!(projects.len(), 2);
        assert_eq!(
            projects[1].parent.as_ref().map(|p| p.artifact_id.as_str()),
            Some("parent")
        );
        let tree = resolver.resolve(&projects[1]).expect("resolve module");
        assert_eq!(
            tree.artifact.as_ref().map(|a| a.artifact_id.as_str()),
            Some("module")
        );
    }

    #[test]
    fn single_project_rejects_root_without_artifact() {
        let tree: ResolvedRecord = serde_json::from_str(r#"{"shape": "graph"}"#).expect("parse");
        assert!(single_project(tree).is_err());
    }
}

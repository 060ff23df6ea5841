use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::artifact::{Artifact, DEFAULT_SCOPE};
use crate::graph::GraphError;
use crate::resolver::record::{classify, ResolvedRecord};

/// How the resolver treated one occurrence of an artifact.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeResolution {
    #[default]
    Included,
    OmittedForDuplicate,
    OmittedForConflict,
    OmittedForCycle,
    /// Synthetic reactor parent, never the target of a resolved dependency.
    Parent,
}

impl NodeResolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeResolution::Included => "included",
            NodeResolution::OmittedForDuplicate => "omitted_for_duplicate",
            NodeResolution::OmittedForConflict => "omitted_for_conflict",
            NodeResolution::OmittedForCycle => "omitted_for_cycle",
            NodeResolution::Parent => "parent",
        }
    }

    pub fn is_omitted(&self) -> bool {
        matches!(
            self,
            NodeResolution::OmittedForDuplicate
                | NodeResolution::OmittedForConflict
                | NodeResolution::OmittedForCycle
        )
    }
}

/// One artifact occurrence in the dependency graph.
///
/// Scopes, classifiers and types accumulate when several occurrences of the
/// same graph node are merged. The resolution is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyNode {
    artifact: Artifact,
    resolution: NodeResolution,
    effective_version: String,
    scopes: BTreeSet<String>,
    classifiers: BTreeSet<String>,
    types: BTreeSet<String>,
}

impl DependencyNode {
    pub fn new(artifact: Artifact) -> Self {
        let version = artifact.version.clone();
        Self::with_resolution(artifact, NodeResolution::Included, version)
    }

    pub fn parent(artifact: Artifact) -> Self {
        let version = artifact.version.clone();
        Self::with_resolution(artifact, NodeResolution::Parent, version)
    }

    pub fn with_resolution(
        artifact: Artifact,
        resolution: NodeResolution,
        effective_version: impl Into<String>,
    ) -> Self {
        let mut scopes = BTreeSet::new();
        if let Some(scope) = artifact.scope() {
            scopes.insert(scope.to_string());
        }
        let mut classifiers = BTreeSet::new();
        if let Some(classifier) = artifact.classifier() {
            classifiers.insert(classifier.to_string());
        }
        let mut types = BTreeSet::new();
        types.insert(artifact.type_.clone());

        Self {
            artifact,
            resolution,
            effective_version: effective_version.into(),
            scopes,
            classifiers,
            types,
        }
    }

    /// Wraps one resolver record. The record's own children are not visited.
    pub fn from_record(record: &ResolvedRecord) -> Result<Self, GraphError> {
        let artifact = record.artifact.as_ref().ok_or(GraphError::MissingArtifact)?;
        let classification = classify(artifact, &record.shape)?;
        Ok(Self::with_resolution(
            artifact.clone(),
            classification.resolution,
            classification.effective_version,
        ))
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    pub fn resolution(&self) -> NodeResolution {
        self.resolution
    }

    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    pub fn classifiers(&self) -> &BTreeSet<String> {
        &self.classifiers
    }

    pub fn types(&self) -> &BTreeSet<String> {
        &self.types
    }

    /// The version the resolver actually chose. Differs from the artifact's
    /// own version for nodes omitted in favour of a conflict winner.
    pub fn effective_version(&self) -> &str {
        &self.effective_version
    }

    pub fn effective_scope(&self) -> &str {
        self.scopes
            .iter()
            .next()
            .map(String::as_str)
            .unwrap_or(DEFAULT_SCOPE)
    }

    pub fn is_optional(&self) -> bool {
        self.artifact.optional
    }

    pub fn merge(&mut self, other: &DependencyNode) {
        if self.artifact.optional {
            self.artifact.optional = other.artifact.optional;
        }
        self.scopes.extend(other.scopes.iter().cloned());
        self.classifiers.extend(other.classifiers.iter().cloned());
        self.types.extend(other.types.iter().cloned());
    }
}

use crate::config::ConfigError;
use crate::core::node::DependencyNode;

const COMPONENTS: usize = 7;

/// Artifact selector of a style rule:
/// `groupId:artifactId:scope:type:version:classifier:optional`.
///
/// Empty or missing components match anything. groupId, artifactId, version
/// and classifier accept a trailing `*` as prefix wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleKey {
    group_id: Option<String>,
    artifact_id: Option<String>,
    scope: Option<String>,
    type_: Option<String>,
    version: Option<String>,
    classifier: Option<String>,
    optional: Option<String>,
}

impl StyleKey {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() > COMPONENTS {
            return Err(ConfigError::InvalidStyleKey {
                key: raw.to_string(),
                components: parts.len(),
            });
        }
        let component = |index: usize| {
            parts
                .get(index)
                .map(|part| part.trim())
                .filter(|part| !part.is_empty())
                .map(str::to_string)
        };
        Ok(Self {
            group_id: component(0),
            artifact_id: component(1),
            scope: component(2),
            type_: component(3),
            version: component(4),
            classifier: component(5),
            optional: component(6),
        })
    }

    /// Fully pinned key describing a node, used as match candidate.
    ///
    /// Scope and version are the effective ones: a conflict loser declared at
    /// `1.0` that lost to `2.0` is styled by a rule on `2.0`.
    pub fn from_node(node: &DependencyNode) -> Self {
        let artifact = node.artifact();
        Self {
            group_id: Some(artifact.group_id.clone()),
            artifact_id: Some(artifact.artifact_id.clone()),
            scope: Some(node.effective_scope().to_string()),
            type_: Some(artifact.type_.clone()),
            version: Some(node.effective_version().to_string()),
            classifier: artifact.classifier().map(str::to_string),
            optional: Some(node.is_optional().to_string()),
        }
    }

    /// Number of pinned components. More specific rules rank higher.
    pub fn rank(&self) -> usize {
        [
            &self.group_id,
            &self.artifact_id,
            &self.scope,
            &self.type_,
            &self.version,
            &self.classifier,
            &self.optional,
        ]
        .iter()
        .filter(|component| component.is_some())
        .count()
    }

    pub fn matches(&self, candidate: &StyleKey) -> bool {
        wildcard_match(&self.group_id, &candidate.group_id)
            && wildcard_match(&self.artifact_id, &candidate.artifact_id)
            && exact_match(&self.scope, &candidate.scope)
            && exact_match(&self.type_, &candidate.type_)
            && wildcard_match(&self.version, &candidate.version)
            && wildcard_match(&self.classifier, &candidate.classifier)
            && exact_match(&self.optional, &candidate.optional)
    }
}

fn exact_match(rule: &Option<String>, candidate: &Option<String>) -> bool {
    match rule {
        None => true,
        Some(value) => candidate.as_deref() == Some(value.as_str()),
    }
}

fn wildcard_match(rule: &Option<String>, candidate: &Option<String>) -> bool {
    match rule {
        None => true,
        Some(value) => match value.strip_suffix('*') {
            Some(prefix) => candidate.as_deref().unwrap_or("").starts_with(prefix),
            None => candidate.as_deref() == Some(value.as_str()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::Artifact;

    fn candidate(artifact: Artifact) -> StyleKey {
        StyleKey::from_node(&DependencyNode::new(artifact))
    }

    #[test]
    fn empty_key_matches_everything() {
        let key = StyleKey::parse("").expect("key");
        assert_eq!(key.rank(), 0);
        assert!(key.matches(&candidate(Artifact::new("g", "a", "1.0"))));
    }

    #[test]
    fn rank_counts_pinned_components() {
        let key = StyleKey::parse("com.example:core::jar").expect("key");
        assert_eq!(key.rank(), 3);
    }

    #[test]
    fn too_many_components_fail() {
        let err = StyleKey::parse("a:b:c:d:e:f:g:h").expect_err("invalid key");
        assert!(matches!(
            err,
            ConfigError::InvalidStyleKey { components: 8, .. }
        ));
    }

    #[test]
    fn prefix_wildcards_apply_to_group_artifact_version_and_classifier() {
        let key = StyleKey::parse("com.ex*:co*::::tes*").expect("key");
        assert!(key.matches(&candidate(
            Artifact::new("com.example", "core", "1.0").with_classifier("tests")
        )));
        assert!(!key.matches(&candidate(Artifact::new("com.example", "core", "1.0"))));

        let version = StyleKey::parse("::::2.*").expect("key");
        assert!(version.matches(&candidate(Artifact::new("g", "a", "2.5"))));
        assert!(!version.matches(&candidate(Artifact::new("g", "a", "1.5"))));
    }

    #[test]
    fn scope_type_and_optional_need_exact_values() {
        let scope = StyleKey::parse("::te*").expect("key");
        assert!(!scope.matches(&candidate(Artifact::new("g", "a", "1.0").with_scope("test"))));

        let key = StyleKey::parse("::test:jar:::true").expect("key");
        assert!(key.matches(&candidate(
            Artifact::new("g", "a", "1.0")
                .with_scope("test")
                .with_optional(true)
        )));
        assert!(!key.matches(&candidate(Artifact::new("g", "a", "1.0").with_scope("test"))));
    }

    #[test]
    fn missing_scope_counts_as_compile() {
        let key = StyleKey::parse("::compile").expect("key");
        assert!(key.matches(&candidate(Artifact::new("g", "a", "1.0"))));
    }
}

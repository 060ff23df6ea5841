use glob::Pattern;

use crate::config::ConfigError;
use crate::core::artifact::Artifact;

const MAX_SEGMENTS: usize = 5;

/// `groupId:artifactId:type:classifier:version`, each segment a glob.
/// Missing trailing segments and empty segments match anything.
#[derive(Debug, Clone)]
pub struct ArtifactPattern {
    raw: String,
    segments: Vec<Pattern>,
}

impl ArtifactPattern {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() > MAX_SEGMENTS {
            return Err(ConfigError::InvalidValue(format!(
                "artifact pattern '{raw}' has {} segments, at most {MAX_SEGMENTS} are allowed",
                parts.len()
            )));
        }
        let segments = parts
            .iter()
            .map(|part| {
                let part = if part.is_empty() { "*" } else { part };
                Pattern::new(part).map_err(|source| ConfigError::InvalidPattern {
                    pattern: raw.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, artifact: &Artifact) -> bool {
        let fields = [
            artifact.group_id.as_str(),
            artifact.artifact_id.as_str(),
            artifact.type_.as_str(),
            artifact.classifier().unwrap_or(""),
            artifact.version.as_str(),
        ];
        self.segments
            .iter()
            .zip(fields)
            .all(|(segment, field)| segment.matches(field))
    }
}

/// Include/exclude filter. No includes means everything is included.
#[derive(Debug, Clone, Default)]
pub struct ArtifactFilter {
    includes: Vec<ArtifactPattern>,
    excludes: Vec<ArtifactPattern>,
}

impl ArtifactFilter {
    pub fn accept_all() -> Self {
        Self::default()
    }

    pub fn new<I, E, S1, S2>(includes: I, excludes: E) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S1>,
        E: IntoIterator<Item = S2>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let includes = includes
            .into_iter()
            .map(|raw| ArtifactPattern::parse(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let excludes = excludes
            .into_iter()
            .map(|raw| ArtifactPattern::parse(raw.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { includes, excludes })
    }

    pub fn accepts(&self, artifact: &Artifact) -> bool {
        let included = self.includes.is_empty()
            || self
                .includes
                .iter()
                .any(|pattern| pattern.matches(artifact));
        included
            && !self
                .excludes
                .iter()
                .any(|pattern| pattern.matches(artifact))
    }
}

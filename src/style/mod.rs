//! Rendering attributes for nodes and edges.
//!
//! Node styles are layered: the default node style, then the style of the
//! node's effective scope, then the most specific matching highlight rule.
//! Highlight rules are parsed when the configuration is loaded so that a
//! malformed key fails before any graph is built.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::config::ConfigError;
use crate::core::node::{DependencyNode, NodeResolution};

pub mod key;

pub use key::StyleKey;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NodeStyle {
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub fill_color: Option<String>,
    #[serde(default)]
    pub font_color: Option<String>,
    #[serde(default)]
    pub font_name: Option<String>,
}

impl NodeStyle {
    /// Copies every attribute `other` sets over this style.
    pub fn overlay(&mut self, other: &NodeStyle) {
        let pairs = [
            (&mut self.shape, &other.shape),
            (&mut self.style, &other.style),
            (&mut self.color, &other.color),
            (&mut self.fill_color, &other.fill_color),
            (&mut self.font_color, &other.font_color),
            (&mut self.font_name, &other.font_name),
        ];
        for (target, value) in pairs {
            if value.is_some() {
                *target = value.clone();
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EdgeStyle {
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HighlightRule {
    pub key: String,
    #[serde(flatten)]
    pub style: NodeStyle,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StyleConfiguration {
    #[serde(default)]
    pub default_node: NodeStyle,
    /// Node styles keyed by effective scope.
    #[serde(default)]
    pub scopes: BTreeMap<String, NodeStyle>,
    /// Edge styles keyed by the target's resolution (`omitted_for_conflict`, ...).
    #[serde(default)]
    pub edges: BTreeMap<String, EdgeStyle>,
    #[serde(default, alias = "highlight")]
    pub highlights: Vec<HighlightRule>,
}

impl StyleConfiguration {
    /// Reads a style file; the format follows the extension (toml, json, yaml/yml).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "json" => serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            }),
            "yaml" | "yml" => {
                serde_yaml::from_str(&contents).map_err(|source| ConfigError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })
            }
            _ => toml::from_str(&contents).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Style lookups over a validated [`StyleConfiguration`].
#[derive(Debug, Clone, Default)]
pub struct StyleResolver {
    default_node: NodeStyle,
    scopes: BTreeMap<String, NodeStyle>,
    edges: BTreeMap<String, EdgeStyle>,
    rules: Vec<(StyleKey, NodeStyle)>,
}

impl StyleResolver {
    pub fn new(config: StyleConfiguration) -> Result<Self, ConfigError> {
        let rules = config
            .highlights
            .into_iter()
            .map(|rule| Ok((StyleKey::parse(&rule.key)?, rule.style)))
            .collect::<Result<Vec<_>, ConfigError>>()?;
        debug!(rules = rules.len(), "loaded style rules");
        Ok(Self {
            default_node: config.default_node,
            scopes: config.scopes,
            edges: config.edges,
            rules,
        })
    }

    /// The most specific matching rule. Equal ranks go to the first declared rule.
    pub fn resolve(&self, node: &DependencyNode) -> Option<&NodeStyle> {
        let candidate = StyleKey::from_node(node);
        let mut best: Option<(usize, &NodeStyle)> = None;
        for (key, style) in &self.rules {
            if !key.matches(&candidate) {
                continue;
            }
            let rank = key.rank();
            if best.map_or(true, |(best_rank, _)| rank > best_rank) {
                best = Some((rank, style));
            }
        }
        best.map(|(_, style)| style)
    }

    pub fn node_style(&self, node: &DependencyNode) -> NodeStyle {
        let mut style = self.default_node.clone();
        if let Some(scope_style) = self.scopes.get(node.effective_scope()) {
            style.overlay(scope_style);
        }
        if let Some(rule_style) = self.resolve(node) {
            style.overlay(rule_style);
        }
        style
    }

    pub fn edge_style(&self, from: &DependencyNode, to: &DependencyNode) -> EdgeStyle {
        let resolution = if from.resolution() == NodeResolution::Parent {
            NodeResolution::Parent
        } else {
            to.resolution()
        };
        if let Some(style) = self.edges.get(resolution.as_str()) {
            return style.clone();
        }
        let style = match resolution {
            NodeResolution::Parent => Some("dotted"),
            resolution if resolution.is_omitted() => Some("dashed"),
            _ => None,
        };
        EdgeStyle {
            style: style.map(str::to_string),
            color: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::Artifact;

    fn rule(key: &str, color: &str) -> HighlightRule {
        HighlightRule {
            key: key.to_string(),
            style: NodeStyle {
                color: Some(color.to_string()),
                ..NodeStyle::default()
            },
        }
    }

    fn resolver(rules: Vec<HighlightRule>) -> StyleResolver {
        StyleResolver::new(StyleConfiguration {
            highlights: rules,
            ..StyleConfiguration::default()
        })
        .expect("resolver")
    }

    fn color(resolver: &StyleResolver, node: &DependencyNode) -> Option<String> {
        resolver.resolve(node).and_then(|style| style.color.clone())
    }

    #[test]
    fn more_specific_rule_wins_regardless_of_order() {
        let node = DependencyNode::new(Artifact::new("com.example", "core", "1.0"));
        let group_first = resolver(vec![
            rule("com.example", "blue"),
            rule("com.example:core", "red"),
        ]);
        let artifact_first = resolver(vec![
            rule("com.example:core", "red"),
            rule("com.example", "blue"),
        ]);
        assert_eq!(color(&group_first, &node).as_deref(), Some("red"));
        assert_eq!(color(&artifact_first, &node).as_deref(), Some("red"));
    }

    #[test]
    fn equal_rank_goes_to_first_declared() {
        let node = DependencyNode::new(Artifact::new("com.example", "core", "1.0"));
        let styles = resolver(vec![rule("com.*", "green"), rule("com.example", "blue")]);
        assert_eq!(color(&styles, &node).as_deref(), Some("green"));
    }

    #[test]
    fn blank_scope_matches_compile_rule() {
        let node = DependencyNode::new(Artifact::new("g", "a", "1.0").with_scope(""));
        let styles = resolver(vec![rule("::compile", "orange")]);
        assert_eq!(color(&styles, &node).as_deref(), Some("orange"));
    }

    #[test]
    fn version_rules_match_the_effective_version() {
        let loser = DependencyNode::with_resolution(
            Artifact::new("g", "a", "1.0"),
            NodeResolution::OmittedForConflict,
            "2.0",
        );
        let declared = resolver(vec![rule("g:a:::1.0", "blue")]);
        let winner = resolver(vec![rule("g:a:::2.0", "blue")]);
        assert!(declared.resolve(&loser).is_none());
        assert_eq!(color(&winner, &loser).as_deref(), Some("blue"));
    }

    #[test]
    fn no_matching_rule_resolves_to_none() {
        let node = DependencyNode::new(Artifact::new("org.other", "core", "1.0"));
        let styles = resolver(vec![rule("com.example", "blue")]);
        assert!(styles.resolve(&node).is_none());
    }

    #[test]
    fn malformed_key_fails_at_load() {
        let err = StyleResolver::new(StyleConfiguration {
            highlights: vec![rule("a:b:c:d:e:f:g:h", "red")],
            ..StyleConfiguration::default()
        })
        .expect_err("invalid key");
        assert!(matches!(err, ConfigError::InvalidStyleKey { .. }));
    }

    #[test]
    fn node_style_layers_default_scope_and_rule() {
        let mut scopes = BTreeMap::new();
        scopes.insert(
            "test".to_string(),
            NodeStyle {
                fill_color: Some("gray".to_string()),
                color: Some("black".to_string()),
                ..NodeStyle::default()
            },
        );
        let styles = StyleResolver::new(StyleConfiguration {
            default_node: NodeStyle {
                shape: Some("box".to_string()),
                ..NodeStyle::default()
            },
            scopes,
            highlights: vec![rule("com.example", "red")],
            ..StyleConfiguration::default()
        })
        .expect("resolver");
        let node = DependencyNode::new(
            Artifact::new("com.example", "core", "1.0").with_scope("test"),
        );
        let style = styles.node_style(&node);
        assert_eq!(style.shape.as_deref(), Some("box"));
        assert_eq!(style.fill_color.as_deref(), Some("gray"));
        assert_eq!(style.color.as_deref(), Some("red"));
    }

    #[test]
    fn omitted_edges_default_to_dashed() {
        let styles = StyleResolver::default();
        let root = DependencyNode::new(Artifact::new("g", "root", "1.0"));
        let loser = DependencyNode::with_resolution(
            Artifact::new("g", "a", "1.0"),
            NodeResolution::OmittedForConflict,
            "2.0",
        );
        assert_eq!(styles.edge_style(&root, &loser).style.as_deref(), Some("dashed"));
        let included = DependencyNode::new(Artifact::new("g", "b", "1.0"));
        assert_eq!(styles.edge_style(&root, &included), EdgeStyle::default());
    }

    #[test]
    fn configuration_parses_from_toml() {
        let toml = r#"
[default_node]
shape = "box"

[scopes.test]
fill_color = "gray"

[edges.omitted_for_duplicate]
style = "dotted"

[[highlight]]
key = "com.example:*"
color = "red"
"#;
        let config: StyleConfiguration = toml::from_str(toml).expect("parse styles");
        assert_eq!(config.highlights.len(), 1);
        assert_eq!(config.highlights[0].style.color.as_deref(), Some("red"));
        assert!(config.edges.contains_key("omitted_for_duplicate"));
        assert!(StyleResolver::new(config).is_ok());
    }
}

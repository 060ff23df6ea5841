use std::collections::{HashMap, HashSet};

use serde_json::json;

use crate::core::node::DependencyNode;
use crate::graph::{Edge, GraphFormatter, NodeDefinition};
use crate::style::{EdgeStyle, NodeStyle, StyleResolver};

pub struct DotFormatter<'a> {
    styles: &'a StyleResolver,
}

impl<'a> DotFormatter<'a> {
    pub fn new(styles: &'a StyleResolver) -> Self {
        Self { styles }
    }
}

impl GraphFormatter<DependencyNode> for DotFormatter<'_> {
    fn format(
        &self,
        graph_name: &str,
        nodes: &[NodeDefinition<'_, DependencyNode>],
        edges: &[Edge],
    ) -> String {
        let by_id: HashMap<&str, &DependencyNode> = nodes
            .iter()
            .map(|definition| (definition.id.as_str(), definition.node))
            .collect();

        let mut out = format!("digraph \"{}\" {{\n", escape_dot_label(graph_name));
        for definition in nodes {
            let mut attributes = vec![format!("label=\"{}\"", escape_dot_label(&definition.name))];
            attributes.extend(node_attributes(&self.styles.node_style(definition.node)));
            out.push_str(&format!(
                "  \"{}\" [{}];\n",
                escape_dot_label(&definition.id),
                attributes.join(",")
            ));
        }
        for edge in edges {
            let mut attributes = Vec::new();
            if !edge.attributes.is_empty() {
                attributes.push(format!("label=\"{}\"", escape_dot_label(&edge.attributes)));
            }
            if let (Some(from), Some(to)) = (
                by_id.get(edge.from.as_str()),
                by_id.get(edge.to.as_str()),
            ) {
                attributes.extend(edge_attributes(&self.styles.edge_style(from, to)));
            }
            out.push_str(&format!(
                "  \"{}\" -> \"{}\"",
                escape_dot_label(&edge.from),
                escape_dot_label(&edge.to)
            ));
            if !attributes.is_empty() {
                out.push_str(&format!(" [{}]", attributes.join(",")));
            }
            out.push_str(";\n");
        }
        out.push_str("}\n");
        out
    }
}

fn node_attributes(style: &NodeStyle) -> Vec<String> {
    let mut attributes = Vec::new();
    let mut push = |name: &str, value: &Option<String>| {
        if let Some(value) = value {
            attributes.push(format!("{name}=\"{}\"", escape_dot_label(value)));
        }
    };
    push("shape", &style.shape);
    push("style", &style.style);
    push("color", &style.color);
    push("fillcolor", &style.fill_color);
    push("fontcolor", &style.font_color);
    push("fontname", &style.font_name);
    attributes
}

fn edge_attributes(style: &EdgeStyle) -> Vec<String> {
    let mut attributes = Vec::new();
    if let Some(value) = style.style.as_ref() {
        attributes.push(format!("style=\"{}\"", escape_dot_label(value)));
    }
    if let Some(value) = style.color.as_ref() {
        attributes.push(format!("color=\"{}\"", escape_dot_label(value)));
    }
    attributes
}

fn escape_dot_label(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

pub struct JsonFormatter;

impl GraphFormatter<DependencyNode> for JsonFormatter {
    fn format(
        &self,
        graph_name: &str,
        nodes: &[NodeDefinition<'_, DependencyNode>],
        edges: &[Edge],
    ) -> String {
        let artifacts: Vec<_> = nodes
            .iter()
            .map(|definition| {
                let node = definition.node;
                let artifact = node.artifact();
                json!({
                    "id": definition.id,
                    "label": definition.name,
                    "groupId": artifact.group_id,
                    "artifactId": artifact.artifact_id,
                    "version": artifact.version,
                    "effectiveVersion": node.effective_version(),
                    "resolution": node.resolution().as_str(),
                    "optional": node.is_optional(),
                    "scopes": node.scopes(),
                    "types": node.types(),
                    "classifiers": node.classifiers(),
                })
            })
            .collect();
        let dependencies: Vec<_> = edges
            .iter()
            .map(|edge| {
                json!({
                    "from": edge.from,
                    "to": edge.to,
                    "label": edge.attributes,
                    "permanent": edge.permanent,
                })
            })
            .collect();
        let graph = json!({
            "graphName": graph_name,
            "artifacts": artifacts,
            "dependencies": dependencies,
        });
        format!("{graph:#}\n")
    }
}

/// Indented tree, one root per node without incoming edges.
pub struct TextFormatter;

impl<T> GraphFormatter<T> for TextFormatter {
    fn format(&self, graph_name: &str, nodes: &[NodeDefinition<'_, T>], edges: &[Edge]) -> String {
        let labels: HashMap<&str, &str> = nodes
            .iter()
            .map(|definition| (definition.id.as_str(), definition.name.as_str()))
            .collect();
        let mut children: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
        let mut has_parent: HashSet<&str> = HashSet::new();
        for edge in edges {
            children
                .entry(edge.from.as_str())
                .or_default()
                .push((edge.to.as_str(), edge.attributes.as_str()));
            if edge.from != edge.to {
                has_parent.insert(edge.to.as_str());
            }
        }

        let mut out = String::new();
        out.push_str(graph_name);
        out.push('\n');
        let tree = TextTree {
            labels: &labels,
            children: &children,
        };
        let mut expanded: HashSet<&str> = HashSet::new();
        for definition in nodes {
            if has_parent.contains(definition.id.as_str()) {
                continue;
            }
            out.push_str(&single_line(&definition.name));
            out.push('\n');
            tree.render(definition.id.as_str(), &mut expanded, &mut out);
        }
        out
    }
}

struct TextTree<'a> {
    labels: &'a HashMap<&'a str, &'a str>,
    children: &'a HashMap<&'a str, Vec<(&'a str, &'a str)>>,
}

struct TextFrame<'a> {
    node: &'a str,
    prefix: String,
    next: usize,
}

impl<'a> TextTree<'a> {
    /// Prints the subtree below `root`. Each node's children are listed once;
    /// later occurrences get `(*)`, or `(cycle)` when they close a loop.
    fn render(&self, root: &'a str, expanded: &mut HashSet<&'a str>, out: &mut String) {
        let children_of = |node: &str| -> &'a [(&'a str, &'a str)] {
            self.children.get(node).map(Vec::as_slice).unwrap_or(&[])
        };
        expanded.insert(root);
        let mut on_path: HashSet<&'a str> = HashSet::from([root]);
        let mut frames = vec![TextFrame {
            node: root,
            prefix: String::new(),
            next: 0,
        }];

        while let Some(frame) = frames.last_mut() {
            let children = children_of(frame.node);
            let Some(&(child, attributes)) = children.get(frame.next) else {
                on_path.remove(frame.node);
                frames.pop();
                continue;
            };
            frame.next += 1;
            let is_last = frame.next == children.len();

            out.push_str(&frame.prefix);
            out.push_str(if is_last { "`-- " } else { "|-- " });
            out.push_str(&single_line(self.labels.get(child).copied().unwrap_or(child)));
            if !attributes.is_empty() {
                out.push_str(&format!(" [{attributes}]"));
            }
            if on_path.contains(child) {
                out.push_str(" (cycle)\n");
                continue;
            }
            if !expanded.insert(child) {
                if !children_of(child).is_empty() {
                    out.push_str(" (*)");
                }
                out.push('\n');
                continue;
            }
            out.push('\n');

            let mut prefix = frame.prefix.clone();
            prefix.push_str(if is_last { "    " } else { "|   " });
            on_path.insert(child);
            frames.push(TextFrame {
                node: child,
                prefix,
                next: 0,
            });
        }
    }
}

fn single_line(label: &str) -> String {
    label.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::Artifact;
    use crate::core::node::NodeResolution;
    use crate::graph::builder::GraphBuilder;
    use crate::graph::render::{DependencyEdgeRenderer, DependencyNodeIdRenderer};

    fn sample() -> GraphBuilder<DependencyNode> {
        let mut builder = GraphBuilder::new(DependencyNodeIdRenderer::versionless().with_types(false))
            .with_edge_renderer(DependencyEdgeRenderer::default());
        let root = DependencyNode::new(Artifact::new("g", "root", "1.0"));
        let lib = DependencyNode::new(Artifact::new("g", "lib", "1.0"));
        let loser = DependencyNode::with_resolution(
            Artifact::new("g", "old", "1.0").with_scope("test"),
            NodeResolution::OmittedForConflict,
            "2.0",
        );
        builder.add_edge(&root, &lib);
        builder.add_edge(&lib, &loser);
        builder
    }

    #[test]
    fn dot_output_styles_omitted_edges() {
        let styles = StyleResolver::default();
        let output = sample().format(&DotFormatter::new(&styles), "demo");
        assert!(output.starts_with("digraph \"demo\" {\n"));
        assert!(output.contains("  \"g:root\" [label=\"g:root\"];\n"));
        assert!(output.contains("  \"g:root\" -> \"g:lib\";\n"));
        assert!(output.contains(
            "  \"g:lib\" -> \"g:old\" [label=\"test, 1.0 -> 2.0\",style=\"dashed\"];\n"
        ));
        assert!(output.ends_with("}\n"));
    }

    #[test]
    fn json_output_lists_artifacts_and_dependencies() {
        let output = sample().format(&JsonFormatter, "demo");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(value["graphName"], "demo");
        assert_eq!(value["artifacts"].as_array().map(Vec::len), Some(3));
        assert_eq!(value["artifacts"][2]["resolution"], "omitted_for_conflict");
        assert_eq!(value["artifacts"][2]["effectiveVersion"], "2.0");
        assert_eq!(value["dependencies"][1]["from"], "g:lib");
        assert_eq!(value["dependencies"][1]["permanent"], false);
    }

    #[test]
    fn text_output_renders_tree_from_roots() {
        let output = sample().format(&TextFormatter, "demo");
        assert_eq!(
            output,
            "demo\ng:root\n`-- g:lib\n    `-- g:old [test, 1.0 -> 2.0]\n"
        );
    }

    #[test]
    fn text_output_expands_shared_nodes_once() {
        let mut builder = GraphBuilder::new(|id: &&str| id.to_string());
        builder.add_edge(&"root", &"a");
        builder.add_edge(&"root", &"b");
        builder.add_edge(&"a", &"c");
        builder.add_edge(&"b", &"c");
        builder.add_edge(&"c", &"d");
        builder.add_edge(&"b", &"d");
        let output = builder.format(&TextFormatter, "diamond");
        assert_eq!(
            output,
            "diamond\nroot\n|-- a\n|   `-- c\n|       `-- d\n`-- b\n    |-- c (*)\n    `-- d\n"
        );
    }

    #[test]
    fn text_output_stays_linear_for_chained_diamonds() {
        let ids: Vec<String> = (0..=40).map(|level| format!("n{level}")).collect();
        let sides: Vec<(String, String)> = (0..40)
            .map(|level| (format!("l{level}"), format!("r{level}")))
            .collect();
        let mut builder = GraphBuilder::new(|id: &String| id.clone());
        for (level, (left, right)) in sides.iter().enumerate() {
            builder.add_edge(&ids[level], left);
            builder.add_edge(&ids[level], right);
            builder.add_edge(left, &ids[level + 1]);
            builder.add_edge(right, &ids[level + 1]);
        }
        let output = builder.format(&TextFormatter, "chain");
        assert_eq!(output.lines().count(), 2 + builder.edges().len());
    }

    #[test]
    fn text_output_marks_cycles() {
        let mut builder = GraphBuilder::new(|id: &&str| id.to_string());
        builder.add_edge(&"root", &"a");
        builder.add_edge(&"a", &"b");
        builder.add_edge(&"b", &"a");
        let output = builder.format(&TextFormatter, "cycle");
        assert_eq!(
            output,
            "cycle\nroot\n`-- a\n    `-- b\n        `-- a (cycle)\n"
        );
    }
}

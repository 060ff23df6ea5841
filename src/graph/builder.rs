use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::graph::reachability::ReachabilityMap;
use crate::graph::{Edge, EdgeRenderer, GraphFormatter, NodeDefinition, NodeRenderer};

/// Node registry, edge set and reachability index for one graph.
pub struct GraphBuilder<T> {
    node_id_renderer: Box<dyn NodeRenderer<T>>,
    node_name_renderer: Option<Box<dyn NodeRenderer<T>>>,
    edge_renderer: Option<Box<dyn EdgeRenderer<T>>>,
    omit_self_references: bool,
    nodes: Vec<(String, T)>,
    node_index: HashMap<String, usize>,
    edges: Vec<Edge>,
    edge_keys: HashSet<(String, String, String)>,
    reachability: ReachabilityMap,
}

impl<T: Clone> GraphBuilder<T> {
    pub fn new(node_id_renderer: impl NodeRenderer<T> + 'static) -> Self {
        Self {
            node_id_renderer: Box::new(node_id_renderer),
            node_name_renderer: None,
            edge_renderer: None,
            omit_self_references: false,
            nodes: Vec::new(),
            node_index: HashMap::new(),
            edges: Vec::new(),
            edge_keys: HashSet::new(),
            reachability: ReachabilityMap::new(),
        }
    }

    /// Renders node labels. Defaults to the node id.
    pub fn with_node_name_renderer(mut self, renderer: impl NodeRenderer<T> + 'static) -> Self {
        self.node_name_renderer = Some(Box::new(renderer));
        self
    }

    /// Renders edge attributes. Defaults to no attributes.
    pub fn with_edge_renderer(mut self, renderer: impl EdgeRenderer<T> + 'static) -> Self {
        self.edge_renderer = Some(Box::new(renderer));
        self
    }

    pub fn omit_self_references(mut self, omit: bool) -> Self {
        self.omit_self_references = omit;
        self
    }

    pub fn node_id(&self, node: &T) -> String {
        self.node_id_renderer.render(node)
    }

    /// Registers `node` unless a node with the same id exists. The existing
    /// node is kept and `node` is dropped.
    pub fn add_node(&mut self, node: T) -> &mut Self {
        let id = self.node_id(&node);
        if !self.node_index.contains_key(&id) {
            self.node_index.insert(id.clone(), self.nodes.len());
            self.nodes.push((id, node));
        }
        self
    }

    /// The registered node sharing `node`'s id, or `node` itself.
    pub fn effective_node<'a>(&'a self, node: &'a T) -> &'a T {
        let id = self.node_id(node);
        match self.node_index.get(&id) {
            Some(&index) => &self.nodes[index].1,
            None => node,
        }
    }

    /// Mutable access to the registered node sharing `node`'s id, to merge
    /// further information into it before drawing edges.
    pub fn effective_node_mut(&mut self, node: &T) -> Option<&mut T> {
        let id = self.node_id(node);
        let index = *self.node_index.get(&id)?;
        Some(&mut self.nodes[index].1)
    }

    pub fn add_edge(&mut self, from: &T, to: &T) -> &mut Self {
        self.insert_edge(from, to, false)
    }

    /// Adds an edge that survives [`GraphBuilder::reduce_edges`].
    pub fn add_permanent_edge(&mut self, from: &T, to: &T) -> &mut Self {
        self.insert_edge(from, to, true)
    }

    fn insert_edge(&mut self, from: &T, to: &T, permanent: bool) -> &mut Self {
        self.add_node(from.clone());
        self.add_node(to.clone());

        let from_id = self.node_id(from);
        let to_id = self.node_id(to);
        if self.omit_self_references && from_id == to_id {
            return self;
        }

        let attributes = self
            .edge_renderer
            .as_ref()
            .map(|renderer| renderer.render(from, to))
            .unwrap_or_default();
        let edge = Edge::new(from_id, to_id, attributes, permanent);
        if self.edge_keys.insert(edge.key()) {
            self.reachability.register_parent(&edge.to, &edge.from);
            self.edges.push(edge);
        }
        self
    }

    pub fn is_reachable(&self, parent: &T, child: &T) -> bool {
        self.reachability
            .is_reachable(&self.node_id(parent), &self.node_id(child))
    }

    /// Drops every non-permanent edge whose target was already reachable from
    /// its source through an older path.
    pub fn reduce_edges(&mut self) -> &mut Self {
        let before = self.edges.len();
        let reachability = &self.reachability;
        self.edges
            .retain(|edge| edge.permanent || !reachability.is_reachable(&edge.from, &edge.to));
        self.edge_keys = self.edges.iter().map(Edge::key).collect();
        debug!(
            removed = before - self.edges.len(),
            remaining = self.edges.len(),
            "reduced transitive edges"
        );
        self
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.nodes.iter().map(|(_, node)| node)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_definitions(&self) -> Vec<NodeDefinition<'_, T>> {
        self.nodes
            .iter()
            .map(|(id, node)| NodeDefinition {
                id: id.clone(),
                name: match self.node_name_renderer.as_ref() {
                    Some(renderer) => renderer.render(node),
                    None => id.clone(),
                },
                node,
            })
            .collect()
    }

    pub fn format<F>(&self, formatter: &F, graph_name: &str) -> String
    where
        F: GraphFormatter<T> + ?Sized,
    {
        formatter.format(graph_name, &self.node_definitions(), &self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Named {
        id: &'static str,
        payload: u32,
    }

    fn named(id: &'static str) -> Named {
        Named { id, payload: 0 }
    }

    fn builder() -> GraphBuilder<Named> {
        GraphBuilder::new(|node: &Named| node.id.to_string())
    }

    fn edge_pairs(builder: &GraphBuilder<Named>) -> Vec<(String, String)> {
        builder
            .edges()
            .iter()
            .map(|edge| (edge.from.clone(), edge.to.clone()))
            .collect()
    }

    fn pair(from: &str, to: &str) -> (String, String) {
        (from.to_string(), to.to_string())
    }

    #[test]
    fn first_registration_wins() {
        let mut builder = builder();
        builder.add_node(Named { id: "a", payload: 1 });
        builder.add_node(Named { id: "a", payload: 2 });
        builder.add_edge(&Named { id: "a", payload: 3 }, &named("b"));

        let probe = Named { id: "a", payload: 4 };
        assert_eq!(builder.effective_node(&probe).payload, 1);
        assert_eq!(builder.node_count(), 2);
    }

    #[test]
    fn effective_node_of_unseen_id_is_the_node_itself() {
        let builder = builder();
        let probe = Named { id: "x", payload: 9 };
        assert_eq!(builder.effective_node(&probe).payload, 9);
    }

    #[test]
    fn effective_node_mut_updates_registered_node() {
        let mut builder = builder();
        builder.add_node(named("a"));
        if let Some(node) = builder.effective_node_mut(&named("a")) {
            node.payload = 7;
        }
        assert_eq!(builder.effective_node(&named("a")).payload, 7);
        assert!(builder.effective_node_mut(&named("z")).is_none());
    }

    #[test]
    fn edges_are_deduplicated_on_endpoints_and_attributes() {
        let mut builder = builder().with_edge_renderer(|_: &Named, to: &Named| {
            format!("p{}", to.payload)
        });
        builder.add_edge(&named("a"), &named("b"));
        builder.add_edge(&named("a"), &named("b"));
        builder.add_edge(&named("a"), &Named { id: "b", payload: 1 });

        let attributes: Vec<_> = builder
            .edges()
            .iter()
            .map(|edge| edge.attributes.as_str())
            .collect();
        assert_eq!(attributes, vec!["p0", "p1"]);
    }

    #[test]
    fn reduce_removes_older_transitive_edge() {
        let mut builder = builder();
        builder.add_edge(&named("a"), &named("b"));
        builder.add_edge(&named("b"), &named("c"));
        builder.add_edge(&named("a"), &named("c"));
        builder.reduce_edges();
        assert_eq!(edge_pairs(&builder), vec![pair("a", "b"), pair("b", "c")]);
    }

    #[test]
    fn reduce_keeps_permanent_edges() {
        let mut builder = builder();
        builder.add_edge(&named("a"), &named("b"));
        builder.add_edge(&named("b"), &named("c"));
        builder.add_permanent_edge(&named("a"), &named("c"));
        builder.reduce_edges();
        assert_eq!(
            edge_pairs(&builder),
            vec![pair("a", "b"), pair("b", "c"), pair("a", "c")]
        );
    }

    #[test]
    fn reduce_tolerates_cycles() {
        let mut builder = builder();
        builder.add_edge(&named("a"), &named("b"));
        builder.add_edge(&named("b"), &named("c"));
        builder.add_edge(&named("a"), &named("c"));
        builder.add_edge(&named("c"), &named("a"));
        builder.reduce_edges();
        assert_eq!(
            edge_pairs(&builder),
            vec![pair("a", "b"), pair("b", "c"), pair("c", "a")]
        );
    }

    #[test]
    fn reduce_keeps_edge_when_alternative_path_is_newer() {
        let mut builder = builder();
        builder.add_edge(&named("a"), &named("c"));
        builder.add_edge(&named("a"), &named("b"));
        builder.add_edge(&named("b"), &named("c"));
        builder.reduce_edges();
        assert_eq!(
            edge_pairs(&builder),
            vec![pair("a", "c"), pair("a", "b"), pair("b", "c")]
        );
    }

    #[test]
    fn self_reference_is_omitted_when_enabled() {
        let mut builder = builder().omit_self_references(true);
        builder.add_edge(&named("x"), &named("x"));
        assert_eq!(builder.node_count(), 1);
        assert!(builder.edges().is_empty());
    }

    #[test]
    fn self_reference_is_kept_when_disabled() {
        let mut builder = builder();
        builder.add_edge(&named("x"), &named("x"));
        assert_eq!(builder.node_count(), 1);
        assert_eq!(edge_pairs(&builder), vec![pair("x", "x")]);
    }

    #[test]
    fn node_definitions_use_name_renderer() {
        let mut builder =
            builder().with_node_name_renderer(|node: &Named| node.id.to_uppercase());
        builder.add_node(named("a"));
        let definitions = builder.node_definitions();
        assert_eq!(definitions[0].id, "a");
        assert_eq!(definitions[0].name, "A");
        assert!(!builder.is_empty());
    }
}

//! Deduplicated dependency graph construction.
//!
//! A [`builder::GraphBuilder`] owns the node registry, the edge set and the
//! reachability index for one graph-generation request. The
//! [`visitor::GraphBuildingVisitor`] maps a resolver tree onto it, and a
//! [`GraphFormatter`] turns the final node and edge collections into output.

use thiserror::Error;

pub mod builder;
pub mod factory;
pub mod filter;
pub mod ops;
pub mod reachability;
pub mod render;
pub mod visitor;
pub mod viz;

pub use builder::GraphBuilder;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("failed to resolve dependencies of {project}: {source}")]
    Resolution {
        project: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("dependency record has no artifact")]
    MissingArtifact,
    #[error("unknown dependency node state {0}")]
    UnknownNodeState(i32),
}

/// Renders a node into a string: its id, or its display name.
pub trait NodeRenderer<T>: Send + Sync {
    fn render(&self, node: &T) -> String;
}

impl<T, F> NodeRenderer<T> for F
where
    F: Fn(&T) -> String + Send + Sync,
{
    fn render(&self, node: &T) -> String {
        self(node)
    }
}

/// Renders the attribute text of the edge between two nodes.
pub trait EdgeRenderer<T>: Send + Sync {
    fn render(&self, from: &T, to: &T) -> String;
}

impl<T, F> EdgeRenderer<T> for F
where
    F: Fn(&T, &T) -> String + Send + Sync,
{
    fn render(&self, from: &T, to: &T) -> String {
        self(from, to)
    }
}

pub trait GraphFormatter<T> {
    fn format(&self, graph_name: &str, nodes: &[NodeDefinition<'_, T>], edges: &[Edge]) -> String;
}

/// A registered node as handed to formatters.
#[derive(Debug)]
pub struct NodeDefinition<'a, T> {
    pub id: String,
    pub name: String,
    pub node: &'a T,
}

/// Directed edge between two rendered node ids.
///
/// Equality covers the endpoints and the rendered attributes, so the same two
/// nodes can be joined by several edges with different attributes.
#[derive(Debug, Clone, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub attributes: String,
    pub permanent: bool,
}

impl Edge {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        attributes: impl Into<String>,
        permanent: bool,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            attributes: attributes.into(),
            permanent,
        }
    }

    fn key(&self) -> (String, String, String) {
        (self.from.clone(), self.to.clone(), self.attributes.clone())
    }
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to && self.attributes == other.attributes
    }
}

impl std::hash::Hash for Edge {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
        self.attributes.hash(state);
    }
}

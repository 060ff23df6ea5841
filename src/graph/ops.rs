use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::graph::Edge;

/// Node ids taking part in a dependency cycle, one group per cycle.
pub fn find_cycles<'a>(node_ids: impl IntoIterator<Item = &'a str>, edges: &[Edge]) -> Vec<Vec<String>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut index: HashMap<&str, NodeIndex> = HashMap::new();
    for id in node_ids {
        index.entry(id).or_insert_with(|| graph.add_node(id));
    }
    for edge in edges {
        let from = *index
            .entry(edge.from.as_str())
            .or_insert_with(|| graph.add_node(edge.from.as_str()));
        let to = *index
            .entry(edge.to.as_str())
            .or_insert_with(|| graph.add_node(edge.to.as_str()));
        if !graph.contains_edge(from, to) {
            graph.add_edge(from, to, ());
        }
    }

    let mut cycles: Vec<Vec<String>> = tarjan_scc(&graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1 || graph.contains_edge(component[0], component[0])
        })
        .map(|component| {
            let mut ids: Vec<String> = component
                .into_iter()
                .map(|idx| graph[idx].to_string())
                .collect();
            ids.sort();
            ids
        })
        .collect();
    cycles.sort();
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(from: &str, to: &str) -> Edge {
        Edge::new(from, to, "", false)
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let edges = vec![edge("a", "b"), edge("b", "c"), edge("a", "c")];
        assert!(find_cycles(["a", "b", "c"], &edges).is_empty());
    }

    #[test]
    fn cycles_are_reported_sorted() {
        let edges = vec![
            edge("a", "b"),
            edge("b", "c"),
            edge("c", "a"),
            edge("d", "d"),
        ];
        assert_eq!(
            find_cycles(["a", "b", "c", "d"], &edges),
            vec![
                vec!["a".to_string(), "b".to_string(), "c".to_string()],
                vec!["d".to_string()],
            ]
        );
    }
}

use std::collections::{HashMap, HashSet};

/// Parents registered so far for every node id, in registration order.
#[derive(Debug, Default, Clone)]
pub struct ReachabilityMap {
    parents: HashMap<String, Vec<String>>,
}

impl ReachabilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_parent(&mut self, node: &str, parent: &str) {
        let parents = self.parents.entry(node.to_string()).or_default();
        if !parents.iter().any(|existing| existing == parent) {
            parents.push(parent.to_string());
        }
    }

    pub fn parents_of(&self, node: &str) -> &[String] {
        self.parents.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `node` can be reached from `parent` through a path that does
    /// not start with the direct `parent -> node` edge.
    ///
    /// Only parents of `node` registered before `parent` are followed on the
    /// first hop. Later hops follow every registered parent.
    pub fn is_reachable(&self, parent: &str, node: &str) -> bool {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(node);

        let mut pending: Vec<&str> = Vec::new();
        for candidate in self.parents_of(node) {
            if candidate == parent {
                break;
            }
            if visited.insert(candidate) {
                pending.push(candidate);
            }
        }

        while let Some(current) = pending.pop() {
            for candidate in self.parents_of(current) {
                if candidate == parent {
                    return true;
                }
                if visited.insert(candidate) {
                    pending.push(candidate);
                }
            }
        }

        false
    }
}

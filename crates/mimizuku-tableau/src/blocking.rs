//! Blocking: stops successor generation below nodes that repeat an ancestor.
//!
//! Blocking is evaluated on demand against the current graph, so it follows
//! label changes caused by merges and restores without extra bookkeeping.

use crate::graph::{CompletionGraph, NodeId};
use mimizuku_core::{Concept, Expressivity, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Requested blocking variant. `Auto` selects one from the expressivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockingPolicy {
    #[default]
    Auto,
    /// `L(x) ⊆ L(y)`.
    Subset,
    /// `L(x) = L(y)`.
    Equality,
    /// Equality of the node labels, of their parents' labels and of the
    /// connecting edge roles.
    Pairwise,
}

impl BlockingPolicy {
    pub fn resolve(self, expressivity: &Expressivity) -> BlockingPolicy {
        match self {
            BlockingPolicy::Auto if expressivity.has_inverse_counting() => BlockingPolicy::Pairwise,
            BlockingPolicy::Auto if expressivity.inverse => BlockingPolicy::Equality,
            BlockingPolicy::Auto => BlockingPolicy::Subset,
            explicit => explicit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blocking {
    policy: BlockingPolicy,
}

impl Blocking {
    pub fn new(policy: BlockingPolicy, expressivity: &Expressivity) -> Self {
        Self {
            policy: policy.resolve(expressivity),
        }
    }

    pub fn policy(&self) -> BlockingPolicy {
        self.policy
    }

    /// `x` or one of its blockable ancestors is directly blocked.
    pub fn is_blocked(&self, graph: &CompletionGraph, x: NodeId) -> bool {
        if !graph.node(x).is_blockable() {
            return false;
        }
        if self.blocker(graph, x).is_some() {
            return true;
        }
        graph
            .ancestors(x)
            .into_iter()
            .filter(|a| graph.node(*a).is_blockable())
            .any(|a| self.blocker(graph, a).is_some())
    }

    /// The nearest blockable ancestor that directly blocks `x`.
    pub fn blocker(&self, graph: &CompletionGraph, x: NodeId) -> Option<NodeId> {
        let node = graph.node(x);
        if !node.is_blockable() || !graph.is_live(x) {
            return None;
        }
        let label = label(graph, x);
        graph
            .ancestors(x)
            .into_iter()
            .take_while(|y| graph.node(*y).is_blockable())
            .find(|y| self.blocks(graph, x, &label, *y))
    }

    fn blocks(&self, graph: &CompletionGraph, x: NodeId, label_x: &BTreeSet<Concept>, y: NodeId) -> bool {
        let label_y = label(graph, y);
        match self.policy {
            BlockingPolicy::Subset | BlockingPolicy::Auto => label_x.is_subset(&label_y),
            BlockingPolicy::Equality => *label_x == label_y,
            BlockingPolicy::Pairwise => {
                if *label_x != label_y {
                    return false;
                }
                let (Some(px), Some(py)) = (graph.node(x).parent(), graph.node(y).parent()) else {
                    return false;
                };
                label(graph, px) == label(graph, py)
                    && parent_roles(graph, px, x) == parent_roles(graph, py, y)
            }
        }
    }
}

fn label(graph: &CompletionGraph, id: NodeId) -> BTreeSet<Concept> {
    graph.node(id).types().map(|(c, _)| c.clone()).collect()
}

fn parent_roles(graph: &CompletionGraph, parent: NodeId, child: NodeId) -> BTreeSet<Role> {
    graph
        .edges_between(parent, child)
        .into_iter()
        .map(|(role, _)| role)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::DependencySet;
    use mimizuku_core::Name;

    fn chain(graph: &mut CompletionGraph, labels: &[&[&str]]) -> Vec<NodeId> {
        let r = Role::new("ex:r");
        let root = graph.add_individual(Name::new("ex:a"), DependencySet::independent());
        let mut ids = vec![root];
        let mut parent = root;
        for names in labels {
            let node = graph.add_fresh(parent, None, DependencySet::independent());
            graph.add_edge(parent, &r, node, DependencySet::independent());
            for name in names.iter() {
                graph.add_type(node, Concept::atom(*name), DependencySet::independent());
            }
            ids.push(node);
            parent = node;
        }
        ids
    }

    #[test]
    fn test_policy_selection() {
        let mut expressivity = Expressivity::default();
        assert_eq!(BlockingPolicy::Auto.resolve(&expressivity), BlockingPolicy::Subset);
        expressivity.inverse = true;
        assert_eq!(BlockingPolicy::Auto.resolve(&expressivity), BlockingPolicy::Equality);
        expressivity.functionality = true;
        assert_eq!(BlockingPolicy::Auto.resolve(&expressivity), BlockingPolicy::Pairwise);
        assert_eq!(BlockingPolicy::Subset.resolve(&expressivity), BlockingPolicy::Subset);
    }

    #[test]
    fn test_subset_blocking() {
        let mut graph = CompletionGraph::new();
        let ids = chain(&mut graph, &[&["ex:A", "ex:B"], &["ex:A"], &["ex:C"]]);
        let blocking = Blocking::new(BlockingPolicy::Subset, &Expressivity::default());
        assert_eq!(blocking.blocker(&graph, ids[2]), Some(ids[1]));
        assert!(blocking.blocker(&graph, ids[1]).is_none());
        // indirectly blocked through its parent
        assert!(blocking.is_blocked(&graph, ids[3]));
        // roots never block
        assert!(!blocking.is_blocked(&graph, ids[0]));
    }

    #[test]
    fn test_equality_requires_identical_labels() {
        let mut graph = CompletionGraph::new();
        let ids = chain(&mut graph, &[&["ex:A", "ex:B"], &["ex:A"], &["ex:A"]]);
        let blocking = Blocking::new(BlockingPolicy::Equality, &Expressivity::default());
        assert!(blocking.blocker(&graph, ids[2]).is_none());
        assert_eq!(blocking.blocker(&graph, ids[3]), Some(ids[2]));
    }

    #[test]
    fn test_pairwise_compares_parents() {
        let mut graph = CompletionGraph::new();
        let ids = chain(&mut graph, &[&["ex:A"], &["ex:A"], &["ex:A"]]);
        let blocking = Blocking::new(BlockingPolicy::Pairwise, &Expressivity::default());
        // n2's parent n1 is blockable with label {A}, the root's label differs
        assert!(blocking.blocker(&graph, ids[2]).is_none());
        assert_eq!(blocking.blocker(&graph, ids[3]), Some(ids[2]));
    }
}

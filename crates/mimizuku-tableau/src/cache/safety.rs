use super::CachedConceptNode;
use crate::graph::{CompletionGraph, NodeId};
use mimizuku_core::{ConceptKind, Expressivity, RBox, Role};
use serde::{Deserialize, Serialize};

/// Requested cache-safety policy. `Auto` selects one from the expressivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheSafetyPolicy {
    #[default]
    Auto,
    AlwaysSafe,
    NeverSafe,
    Dynamic,
}

/// Decides whether a cached model may stand in for the subtree of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSafety {
    AlwaysSafe,
    /// Nominals with inverse roles: a cached model may hide merges with
    /// named individuals.
    NeverSafe,
    /// Inverse roles: safe unless the cached root constrains its predecessor.
    Dynamic,
}

impl CacheSafety {
    pub fn select(policy: CacheSafetyPolicy, expressivity: &Expressivity) -> CacheSafety {
        match policy {
            CacheSafetyPolicy::AlwaysSafe => CacheSafety::AlwaysSafe,
            CacheSafetyPolicy::NeverSafe => CacheSafety::NeverSafe,
            CacheSafetyPolicy::Dynamic => CacheSafety::Dynamic,
            CacheSafetyPolicy::Auto if expressivity.nominals && expressivity.inverse => {
                CacheSafety::NeverSafe
            }
            CacheSafetyPolicy::Auto if expressivity.inverse => CacheSafety::Dynamic,
            CacheSafetyPolicy::Auto => CacheSafety::AlwaysSafe,
        }
    }

    pub fn can_support(&self) -> bool {
        *self != CacheSafety::NeverSafe
    }

    /// `cached` may replace the expansion of `node`.
    pub fn is_safe(&self, graph: &CompletionGraph, node: NodeId, cached: &CachedConceptNode, rbox: &RBox) -> bool {
        match self {
            CacheSafety::AlwaysSafe => true,
            CacheSafety::NeverSafe => false,
            CacheSafety::Dynamic => {
                let Some(parent) = graph.node(node).parent() else {
                    return true;
                };
                graph
                    .edges_between(parent, node)
                    .iter()
                    .all(|(role, _)| !constrains_predecessor(cached, &role.inverse(), rbox))
            }
        }
    }
}

/// Whether the cached root restricts its neighbours over `back`, the role
/// leading from the node to its predecessor.
fn constrains_predecessor(cached: &CachedConceptNode, back: &Role, rbox: &RBox) -> bool {
    let over_back = |role: &Role| rbox.is_sub_role_of(back, role);
    let restricts = cached.types().iter().any(|c| match c.kind() {
        ConceptKind::All(role, _) | ConceptKind::AllState { role, .. } => over_back(role),
        ConceptKind::Not(inner) => match inner.kind() {
            ConceptKind::Min(_, role, _) => over_back(role),
            _ => false,
        },
        _ => false,
    });
    if restricts {
        return true;
    }
    rbox.functional_supers(back)
        .iter()
        .any(|f| cached.edges().iter().any(|e| rbox.is_sub_role_of(e, f)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::DependencySet;
    use mimizuku_core::{Concept, Name};

    #[test]
    fn test_selection() {
        let mut expressivity = Expressivity::default();
        assert_eq!(
            CacheSafety::select(CacheSafetyPolicy::Auto, &expressivity),
            CacheSafety::AlwaysSafe
        );
        expressivity.inverse = true;
        assert_eq!(
            CacheSafety::select(CacheSafetyPolicy::Auto, &expressivity),
            CacheSafety::Dynamic
        );
        expressivity.nominals = true;
        let safety = CacheSafety::select(CacheSafetyPolicy::Auto, &expressivity);
        assert_eq!(safety, CacheSafety::NeverSafe);
        assert!(!safety.can_support());
        assert_eq!(
            CacheSafety::select(CacheSafetyPolicy::AlwaysSafe, &expressivity),
            CacheSafety::AlwaysSafe
        );
    }

    #[test]
    fn test_dynamic_rejects_constraints_on_predecessor() {
        let mut rbox = RBox::new();
        let r = Role::new("ex:r");
        rbox.declare(&r, false);
        rbox.prepare().unwrap();

        let mut graph = CompletionGraph::new();
        let root = graph.add_individual(Name::new("ex:a"), DependencySet::independent());
        let child = graph.add_fresh(root, None, DependencySet::independent());
        graph.add_edge(root, &r, child, DependencySet::independent());

        let a = Concept::atom("ex:A");
        let harmless = CachedConceptNode::new([a.clone()].into_iter().collect(), Vec::new(), true, true);
        let looking_back = CachedConceptNode::new(
            [a, Concept::all(r.inverse(), Concept::atom("ex:B"))].into_iter().collect(),
            Vec::new(),
            true,
            true,
        );
        assert!(CacheSafety::Dynamic.is_safe(&graph, child, &harmless, &rbox));
        assert!(!CacheSafety::Dynamic.is_safe(&graph, child, &looking_back, &rbox));
        assert!(CacheSafety::AlwaysSafe.is_safe(&graph, child, &looking_back, &rbox));
    }
}

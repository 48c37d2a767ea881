//! Choice points of the completion strategy.

use crate::dependency::DependencySet;
use crate::graph::NodeId;
use mimizuku_core::Concept;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchKind {
    /// Add one of `disjuncts` to `node`. Also used by the choose rule, as `C ⊔ ¬C`.
    Disjunction {
        node: NodeId,
        concept: Concept,
        disjuncts: Vec<Concept>,
    },
    /// Merge one pair of neighbours of `node` to satisfy a `≤n` restriction.
    Merge {
        node: NodeId,
        restriction: Concept,
        pairs: Vec<(NodeId, NodeId)>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// 1-based, equal to the stack depth at creation.
    pub index: u32,
    pub kind: BranchKind,
    /// Alternative currently applied.
    pub tried: usize,
    /// Dependency of the fact that triggered the branch.
    pub term_ds: DependencySet,
    /// Clash dependencies of the failed alternatives, without this branch.
    pub prev_ds: DependencySet,
}

impl Branch {
    pub fn new(index: u32, kind: BranchKind, term_ds: DependencySet) -> Self {
        Self {
            index,
            kind,
            tried: 0,
            term_ds,
            prev_ds: DependencySet::independent(),
        }
    }

    pub fn node(&self) -> NodeId {
        match &self.kind {
            BranchKind::Disjunction { node, .. } | BranchKind::Merge { node, .. } => *node,
        }
    }

    pub fn total(&self) -> usize {
        match &self.kind {
            BranchKind::Disjunction { disjuncts, .. } => disjuncts.len(),
            BranchKind::Merge { pairs, .. } => pairs.len(),
        }
    }

    pub fn is_last(&self) -> bool {
        self.tried + 1 >= self.total()
    }

    pub fn has_next(&self) -> bool {
        self.tried + 1 < self.total()
    }

    /// Dependency set of facts added by the current alternative. The last
    /// alternative is forced by the earlier failures, so it depends on
    /// their clashes instead of on this branch.
    pub fn alternative_ds(&self) -> DependencySet {
        if self.is_last() {
            self.term_ds.union(&self.prev_ds)
        } else {
            self.term_ds.with(self.index)
        }
    }

    /// Records a clash of the current alternative.
    pub fn record_failure(&mut self, clash_ds: &DependencySet) {
        self.prev_ds.union_with(&clash_ds.without(self.index));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disjunction(index: u32, n: usize) -> Branch {
        let disjuncts: Vec<Concept> = (0..n).map(|i| Concept::atom(format!("ex:D{}", i))).collect();
        Branch::new(
            index,
            BranchKind::Disjunction {
                node: NodeId(0),
                concept: Concept::or(disjuncts.clone()),
                disjuncts,
            },
            DependencySet::single(1),
        )
    }

    #[test]
    fn test_alternative_ds() {
        let mut branch = disjunction(3, 2);
        assert_eq!(branch.alternative_ds().iter().collect::<Vec<_>>(), vec![1, 3]);
        branch.record_failure(&[2, 3].into_iter().collect());
        branch.tried += 1;
        assert!(branch.is_last());
        assert_eq!(branch.alternative_ds().iter().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_single_alternative_is_last() {
        let branch = disjunction(1, 1);
        assert!(branch.is_last());
        assert!(!branch.has_next());
        assert!(!branch.alternative_ds().contains(1) || branch.term_ds.contains(1));
    }
}

//! Clash witnesses.

use crate::dependency::DependencySet;
use crate::graph::NodeId;
use mimizuku_core::{Concept, Role};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClashKind {
    /// `C` and `¬C` in the same label.
    Contradiction(Concept),
    /// `⊥` in a label.
    Bottom,
    /// More distinct neighbours than a `≤n` restriction allows.
    MaxCardinality { role: Role, bound: u32 },
    /// Merging two nodes declared different.
    Different(NodeId),
    /// Every disjunct of a disjunction is excluded.
    Disjunction(Concept),
    /// No data value satisfies the label of a literal node.
    EmptyDataRange,
    InvalidLiteral(String),
    Irreflexive(Role),
    Asymmetric(Role),
    DisjointRoles(Role, Role),
    /// `¬∃r.Self` with an `r` self-loop.
    SelfRestriction(Role),
    /// Alternatives of a branch were exhausted.
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clash {
    pub node: NodeId,
    pub kind: ClashKind,
    pub ds: DependencySet,
}

impl Clash {
    pub fn new(node: NodeId, kind: ClashKind, ds: DependencySet) -> Self {
        Self { node, kind, ds }
    }

    pub fn is_independent(&self) -> bool {
        self.ds.is_independent()
    }
}

impl fmt::Display for Clash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ClashKind::Contradiction(c) => write!(f, "{} has {} and its negation", self.node, c),
            ClashKind::Bottom => write!(f, "{} has ⊥", self.node),
            ClashKind::MaxCardinality { role, bound } => {
                write!(f, "{} has more than {} {}-neighbours", self.node, bound, role)
            }
            ClashKind::Different(other) => {
                write!(f, "{} and {} are different but must be merged", self.node, other)
            }
            ClashKind::Disjunction(c) => write!(f, "no disjunct of {} fits {}", c, self.node),
            ClashKind::EmptyDataRange => write!(f, "no data value fits {}", self.node),
            ClashKind::InvalidLiteral(lit) => write!(f, "invalid literal {} at {}", lit, self.node),
            ClashKind::Irreflexive(role) => write!(f, "{} has an irreflexive {} loop", self.node, role),
            ClashKind::Asymmetric(role) => write!(f, "{} violates asymmetric {}", self.node, role),
            ClashKind::DisjointRoles(r, s) => {
                write!(f, "{} links with disjoint roles {} and {}", self.node, r, s)
            }
            ClashKind::SelfRestriction(role) => write!(f, "{} has ¬∃{}.Self and a loop", self.node, role),
            ClashKind::Exhausted => write!(f, "all alternatives failed at {}", self.node),
        }?;
        write!(f, " {}", self.ds)
    }
}

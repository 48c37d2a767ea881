use super::Edge;
use crate::dependency::DependencySet;
use crate::queue::{Selector, SELECTOR_COUNT};
use mimizuku_core::{Concept, Literal, Name};
use std::collections::HashMap;
use std::fmt;

/// Stable index of a node in the completion graph arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeName {
    /// A named individual from the ABox.
    Named(Name),
    /// An anonymous node created by a rule.
    Fresh(u32),
    /// A literal node created for an asserted value.
    Value(Literal),
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeName::Named(name) => write!(f, "{}", name.local_name()),
            NodeName::Fresh(n) => write!(f, "_:{}", n),
            NodeName::Value(literal) => write!(f, "{}", literal),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Individual {
        /// Tree parent of a blockable node.
        parent: Option<NodeId>,
        depth: u32,
        blockable: bool,
        /// Existential filler this node was created for.
        origin: Option<Concept>,
    },
    Literal {
        value: Option<Literal>,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) name: NodeName,
    pub(crate) kind: NodeKind,
    /// Creation dependency.
    pub(crate) ds: DependencySet,
    pub(crate) types: HashMap<Concept, DependencySet>,
    /// Concepts grouped by the selector whose rule handles them.
    pub(crate) by_selector: [Vec<Concept>; SELECTOR_COUNT],
    pub(crate) apply_next: [usize; SELECTOR_COUNT],
    pub(crate) out_edges: Vec<Edge>,
    pub(crate) in_edges: Vec<Edge>,
    pub(crate) differents: HashMap<NodeId, DependencySet>,
    pub(crate) merged_into: Option<(NodeId, DependencySet)>,
    pub(crate) pruned: Option<DependencySet>,
    pub(crate) removed: bool,
}

impl Node {
    pub(crate) fn new(id: NodeId, name: NodeName, kind: NodeKind, ds: DependencySet) -> Self {
        Self {
            id,
            name,
            kind,
            ds,
            types: HashMap::new(),
            by_selector: Default::default(),
            apply_next: [0; SELECTOR_COUNT],
            out_edges: Vec::new(),
            in_edges: Vec::new(),
            differents: HashMap::new(),
            merged_into: None,
            pruned: None,
            removed: false,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &NodeName {
        &self.name
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn ds(&self) -> &DependencySet {
        &self.ds
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, NodeKind::Literal { .. })
    }

    pub fn is_individual(&self) -> bool {
        !self.is_literal()
    }

    pub fn is_named(&self) -> bool {
        matches!(self.name, NodeName::Named(_))
    }

    pub fn is_blockable(&self) -> bool {
        matches!(self.kind, NodeKind::Individual { blockable: true, .. })
    }

    /// Named or otherwise non-blockable individual.
    pub fn is_root(&self) -> bool {
        matches!(self.kind, NodeKind::Individual { blockable: false, .. })
    }

    pub fn parent(&self) -> Option<NodeId> {
        match &self.kind {
            NodeKind::Individual { parent, .. } => *parent,
            NodeKind::Literal { .. } => None,
        }
    }

    pub fn depth(&self) -> u32 {
        match &self.kind {
            NodeKind::Individual { depth, .. } => *depth,
            NodeKind::Literal { .. } => 0,
        }
    }

    pub fn origin(&self) -> Option<&Concept> {
        match &self.kind {
            NodeKind::Individual { origin, .. } => origin.as_ref(),
            NodeKind::Literal { .. } => None,
        }
    }

    pub fn value(&self) -> Option<&Literal> {
        match &self.kind {
            NodeKind::Literal { value } => value.as_ref(),
            NodeKind::Individual { .. } => None,
        }
    }

    pub fn has_type(&self, concept: &Concept) -> bool {
        self.types.contains_key(concept)
    }

    pub fn type_ds(&self, concept: &Concept) -> Option<&DependencySet> {
        self.types.get(concept)
    }

    pub fn types(&self) -> impl Iterator<Item = (&Concept, &DependencySet)> {
        self.types.iter()
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn concepts(&self, selector: Selector) -> &[Concept] {
        &self.by_selector[selector.index()]
    }

    pub fn out_edges(&self) -> &[Edge] {
        &self.out_edges
    }

    pub fn in_edges(&self) -> &[Edge] {
        &self.in_edges
    }

    pub fn edge_count(&self) -> usize {
        self.out_edges.len() + self.in_edges.len()
    }

    pub fn is_pruned(&self) -> bool {
        self.pruned.is_some()
    }

    pub fn merged_into(&self) -> Option<NodeId> {
        self.merged_into.as_ref().map(|(target, _)| *target)
    }

    pub fn different_from(&self, other: NodeId) -> Option<&DependencySet> {
        self.differents.get(&other)
    }
}

//! Completion queue: one FIFO worklist of nodes per rule selector.
//!
//! Each node keeps a per-selector pointer into its own concept list, so a
//! dequeued node only sees concepts its rule has not processed yet.

use crate::graph::{CompletionGraph, NodeId};
use mimizuku_core::{Concept, ConceptKind};
use std::collections::{HashSet, VecDeque};

/// Rule categories, in processing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selector {
    Unfolding,
    Conjunction,
    Nominal,
    Universal,
    Literal,
    Max,
    Disjunction,
    Existential,
    Min,
}

pub const SELECTOR_COUNT: usize = 9;

impl Selector {
    pub const ALL: [Selector; SELECTOR_COUNT] = [
        Selector::Unfolding,
        Selector::Conjunction,
        Selector::Nominal,
        Selector::Universal,
        Selector::Literal,
        Selector::Max,
        Selector::Disjunction,
        Selector::Existential,
        Selector::Min,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Rules that create new nodes.
    pub fn is_generating(self) -> bool {
        matches!(self, Selector::Existential | Selector::Min)
    }

    /// The selector whose rule handles `concept`, if any rule does.
    pub fn for_concept(concept: &Concept) -> Option<Selector> {
        match concept.kind() {
            ConceptKind::Top | ConceptKind::Atom(_) => Some(Selector::Unfolding),
            ConceptKind::And(_) => Some(Selector::Conjunction),
            ConceptKind::Nominal(_) => Some(Selector::Nominal),
            ConceptKind::All(..) | ConceptKind::AllState { .. } | ConceptKind::HasSelf(_) => {
                Some(Selector::Universal)
            }
            ConceptKind::Datatype(_) | ConceptKind::Value(_) => Some(Selector::Literal),
            ConceptKind::Min(..) => Some(Selector::Min),
            ConceptKind::Not(inner) => match inner.kind() {
                ConceptKind::Top => None,
                ConceptKind::Atom(_) => Some(Selector::Unfolding),
                ConceptKind::And(_) => Some(Selector::Disjunction),
                ConceptKind::All(..) => Some(Selector::Existential),
                ConceptKind::Min(..) => Some(Selector::Max),
                ConceptKind::Datatype(_) | ConceptKind::Value(_) => Some(Selector::Literal),
                ConceptKind::Nominal(_) | ConceptKind::HasSelf(_) | ConceptKind::AllState { .. } => None,
                ConceptKind::Not(_) => None,
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CompletionQueue {
    lists: [VecDeque<NodeId>; SELECTOR_COUNT],
    queued: [HashSet<NodeId>; SELECTOR_COUNT],
}

impl CompletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, node: NodeId, selector: Selector) {
        let i = selector.index();
        if self.queued[i].insert(node) {
            self.lists[i].push_back(node);
        }
    }

    pub fn enqueue_all(&mut self, node: NodeId) {
        for selector in Selector::ALL {
            self.enqueue(node, selector);
        }
    }

    /// Front of the first non-empty selector.
    pub fn next(&mut self) -> Option<(Selector, NodeId)> {
        for selector in Selector::ALL {
            let i = selector.index();
            if let Some(node) = self.lists[i].pop_front() {
                self.queued[i].remove(&node);
                return Some((selector, node));
            }
        }
        None
    }

    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(|l| l.is_empty())
    }

    pub fn len(&self) -> usize {
        self.lists.iter().map(|l| l.len()).sum()
    }

    pub fn clear(&mut self) {
        for (list, queued) in self.lists.iter_mut().zip(self.queued.iter_mut()) {
            list.clear();
            queued.clear();
        }
    }

    /// Resets rule pointers of nodes invalidated by a restore, and of their
    /// neighbours, and schedules all of them on every selector.
    pub fn flush_for_restore<I>(&mut self, graph: &mut CompletionGraph, touched: I)
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut nodes: Vec<NodeId> = Vec::new();
        for node in touched {
            if !graph.is_live(node) {
                continue;
            }
            nodes.push(node);
            nodes.extend(graph.adjacent(node));
        }
        nodes.sort();
        nodes.dedup();
        for node in nodes {
            if graph.is_live(node) {
                graph.reset_pointers(node);
                self.enqueue_all(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimizuku_core::Role;

    #[test]
    fn test_selector_order_and_dedup() {
        let mut queue = CompletionQueue::new();
        let (a, b) = (NodeId(0), NodeId(1));
        queue.enqueue(a, Selector::Disjunction);
        queue.enqueue(b, Selector::Unfolding);
        queue.enqueue(b, Selector::Unfolding);
        queue.enqueue(a, Selector::Unfolding);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.next(), Some((Selector::Unfolding, b)));
        assert_eq!(queue.next(), Some((Selector::Unfolding, a)));
        assert_eq!(queue.next(), Some((Selector::Disjunction, a)));
        assert!(queue.next().is_none());
    }

    #[test]
    fn test_concept_categories() {
        let a = Concept::atom("ex:A");
        let r = Role::new("ex:r");
        assert_eq!(Selector::for_concept(&a), Some(Selector::Unfolding));
        assert_eq!(Selector::for_concept(&a.negate()), Some(Selector::Unfolding));
        assert_eq!(
            Selector::for_concept(&Concept::some(r.clone(), a.clone())),
            Some(Selector::Existential)
        );
        assert_eq!(
            Selector::for_concept(&Concept::max(1, r.clone(), a.clone())),
            Some(Selector::Max)
        );
        assert_eq!(
            Selector::for_concept(&Concept::or([a.clone(), Concept::atom("ex:B")])),
            Some(Selector::Disjunction)
        );
        assert_eq!(Selector::for_concept(&Concept::bottom()), None);
        assert!(Selector::Min.is_generating());
    }
}

//! Completion rules, one module per rule family.
//!
//! Each rule walks the concepts of its selector on a node, starting at the
//! node's rule pointer. Rules stop as soon as a clash is recorded; the main
//! loop then backtracks.

mod cardinality;
mod disjunction;
mod existential;
mod literal;
mod nominal;
mod unfolding;
mod universal;

use crate::dependency::DependencySet;
use crate::graph::NodeId;
use crate::queue::Selector;
use crate::strategy::CompletionStrategy;
use mimizuku_core::{Concept, Result};

impl CompletionStrategy {
    pub(crate) fn apply_rule(&mut self, selector: Selector, node: NodeId) -> Result<()> {
        match selector {
            Selector::Unfolding => self.apply_unfolding(node),
            Selector::Conjunction => self.apply_conjunction(node),
            Selector::Nominal => self.apply_nominal(node),
            Selector::Universal => self.apply_universal(node),
            Selector::Literal => self.apply_literal(node),
            Selector::Max => self.apply_max(node),
            Selector::Disjunction => self.apply_disjunction(node),
            Selector::Existential => self.apply_existential(node),
            Selector::Min => self.apply_min(node),
        }
    }

    /// Next unprocessed concept of `selector` on `node`, advancing the pointer.
    pub(crate) fn next_concept(&mut self, node: NodeId, selector: Selector) -> Option<(Concept, DependencySet)> {
        if self.clash.is_some() || !self.graph.is_live(node) {
            return None;
        }
        loop {
            let index = self.graph.pointer(node, selector);
            let concept = self.graph.concept_at(node, selector, index)?;
            self.graph.set_pointer(node, selector, index + 1);
            if let Some(ds) = self.graph.type_ds(node, &concept) {
                return Some((concept, ds.clone()));
            }
        }
    }

    /// Rolls the pointer back by one so the last concept is seen again.
    pub(crate) fn revisit_last(&mut self, node: NodeId, selector: Selector) {
        let index = self.graph.pointer(node, selector);
        self.graph.set_pointer(node, selector, index.saturating_sub(1));
    }
}

use crate::branch::BranchKind;
use crate::clash::{Clash, ClashKind};
use crate::graph::NodeId;
use crate::queue::Selector;
use crate::strategy::CompletionStrategy;
use mimizuku_core::{Concept, Result};
use tracing::trace;

impl CompletionStrategy {
    /// `C₁ ⊔ … ⊔ Cₙ`. Disjuncts whose negation is already in the label are
    /// dropped up front; a single survivor is added without branching.
    pub(crate) fn apply_disjunction(&mut self, node: NodeId) -> Result<()> {
        while let Some((concept, ds)) = self.next_concept(node, Selector::Disjunction) {
            let Some(disjuncts) = concept.as_or() else {
                continue;
            };
            if disjuncts.iter().any(|d| self.graph.has_type(node, d)) {
                continue;
            }

            let mut term_ds = ds.clone();
            let mut open: Vec<Concept> = Vec::with_capacity(disjuncts.len());
            for disjunct in disjuncts {
                match self.graph.type_ds(node, &disjunct.negate()) {
                    Some(excluded) => term_ds.union_with(excluded),
                    None => open.push(disjunct),
                }
            }

            match open.len() {
                0 => {
                    self.set_clash(Clash::new(node, ClashKind::Disjunction(concept), term_ds));
                    return Ok(());
                }
                1 => {
                    let only = open.remove(0);
                    trace!(node = %node, disjunction = %concept, chosen = %only, "deterministic disjunct");
                    self.add_type(node, only, term_ds);
                }
                _ => {
                    self.push_branch(
                        BranchKind::Disjunction {
                            node,
                            concept,
                            disjuncts: open,
                        },
                        term_ds,
                    );
                    // deterministic rules first, then the rest of this label
                    self.queue.enqueue(node, Selector::Disjunction);
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

use crate::graph::NodeId;
use crate::queue::Selector;
use crate::strategy::CompletionStrategy;
use mimizuku_core::Result;
use tracing::trace;

impl CompletionStrategy {
    /// Lazy unfolding of atoms, negated atoms and `⊤`.
    pub(crate) fn apply_unfolding(&mut self, node: NodeId) -> Result<()> {
        let tbox = self.ctx.tbox.clone();
        while let Some((concept, ds)) = self.next_concept(node, Selector::Unfolding) {
            for unfolding in tbox.unfold(&concept) {
                trace!(node = %node, from = %concept, to = %unfolding.concept, "unfold");
                self.add_type(node, unfolding.concept.clone(), ds.clone());
            }
        }
        Ok(())
    }

    pub(crate) fn apply_conjunction(&mut self, node: NodeId) -> Result<()> {
        while let Some((concept, ds)) = self.next_concept(node, Selector::Conjunction) {
            if let Some(operands) = concept.as_and() {
                for operand in operands {
                    self.add_type(node, operand.clone(), ds.clone());
                }
            }
        }
        Ok(())
    }
}

use crate::graph::NodeId;
use crate::queue::Selector;
use crate::strategy::CompletionStrategy;
use mimizuku_core::{ReasonerError, Result};
use tracing::trace;

impl CompletionStrategy {
    /// `{a}` in the label of `x`: `x` and the node of `a` are the same element.
    pub(crate) fn apply_nominal(&mut self, node: NodeId) -> Result<()> {
        let tbox = self.ctx.tbox.clone();
        while let Some((concept, ds)) = self.next_concept(node, Selector::Nominal) {
            let name = concept
                .as_nominal()
                .cloned()
                .ok_or_else(|| ReasonerError::internal(format!("{} is not a nominal", concept)))?;
            for unfolding in tbox.unfold(&concept) {
                self.add_type(node, unfolding.concept.clone(), ds.clone());
            }

            let target = self.add_individual(name);
            let (target, target_ds) = self.graph.representative(target);
            let (current, _) = self.graph.representative(node);
            if target == current {
                continue;
            }
            trace!(node = %current, nominal = %concept, target = %target, "nominal merge");
            self.merge_nodes(current, target, ds.union(&target_ds));
            if !self.graph.is_live(node) {
                break;
            }
        }
        Ok(())
    }
}

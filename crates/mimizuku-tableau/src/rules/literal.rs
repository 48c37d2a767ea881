use crate::clash::{Clash, ClashKind};
use crate::context::InvalidLiteralPolicy;
use crate::graph::NodeId;
use crate::queue::Selector;
use crate::strategy::CompletionStrategy;
use mimizuku_core::{Concept, ConceptKind, ReasonerError, Result};
use tracing::warn;

impl CompletionStrategy {
    /// Asks the datatype oracle whether some value fits the data ranges in
    /// the label of a literal node.
    pub(crate) fn apply_literal(&mut self, node: NodeId) -> Result<()> {
        if self.clash.is_some() || !self.graph.is_live(node) {
            return Ok(());
        }
        let count = self.graph.node(node).concepts(Selector::Literal).len();
        if self.graph.pointer(node, Selector::Literal) >= count {
            return Ok(());
        }
        self.graph.set_pointer(node, Selector::Literal, count);
        if !self.graph.node(node).is_literal() {
            return Ok(());
        }

        let n = self.graph.node(node);
        let mut positive: Vec<Concept> = Vec::new();
        let mut negative: Vec<Concept> = Vec::new();
        let mut ds = n.ds().clone();
        for concept in n.concepts(Selector::Literal) {
            let Some(d) = n.type_ds(concept) else {
                continue;
            };
            ds.union_with(d);
            match concept.kind() {
                ConceptKind::Not(inner) => negative.push(inner.clone()),
                _ => positive.push(concept.clone()),
            }
        }
        let value = n.value().cloned();

        match self.ctx.datatypes.is_satisfiable(&positive, &negative, value.as_ref()) {
            Ok(true) => {}
            Ok(false) => self.set_clash(Clash::new(node, ClashKind::EmptyDataRange, ds)),
            Err(ReasonerError::InvalidLiteral(literal)) => match self.ctx.config.invalid_literal_policy {
                InvalidLiteralPolicy::Inconsistent => self.set_clash(Clash::new(
                    node,
                    ClashKind::InvalidLiteral(literal),
                    ds,
                )),
                InvalidLiteralPolicy::Ignore => {
                    warn!(node = %node, literal = %literal, "ignoring invalid literal");
                }
            },
            Err(other) => return Err(other),
        }
        Ok(())
    }
}

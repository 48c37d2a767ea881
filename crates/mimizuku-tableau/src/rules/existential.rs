use crate::clash::{Clash, ClashKind};
use crate::graph::NodeId;
use crate::queue::Selector;
use crate::strategy::CompletionStrategy;
use mimizuku_core::{Concept, Result};
use tracing::trace;

impl CompletionStrategy {
    /// `∃r.C`: reuses a witness when one exists, otherwise creates one.
    pub(crate) fn apply_existential(&mut self, node: NodeId) -> Result<()> {
        if self.clash.is_some() || !self.graph.is_live(node) {
            return Ok(());
        }
        if self.is_blocked(node) {
            self.pending.insert(node);
            return Ok(());
        }
        let rbox = self.ctx.rbox.clone();
        while let Some((concept, ds)) = self.next_concept(node, Selector::Existential) {
            let Some((role, filler)) = concept.as_some() else {
                continue;
            };
            let role = role.clone();

            let neighbours = self.graph.neighbours(node, &role, &rbox);
            let satisfied = if filler.is_top() {
                !neighbours.is_empty()
            } else {
                neighbours.iter().any(|nb| self.graph.has_type(nb.node, &filler))
            };
            if satisfied {
                continue;
            }

            if self.ctx.config.use_cache && self.ctx.cache.is_satisfiable(&filler) == Some(false) {
                self.set_clash(Clash::new(node, ClashKind::Bottom, ds));
                return Ok(());
            }

            if let Some(individual) = filler.as_nominal() {
                let target = self.add_individual(individual.clone());
                self.add_edge(node, &role, target, ds);
                continue;
            }

            let functional = rbox.functional_supers(&role).iter().find_map(|f| {
                self.graph
                    .distinct_neighbours(node, f, &rbox)
                    .into_iter()
                    .next()
            });
            if let Some(existing) = functional {
                trace!(node = %node, role = %role, target = %existing.node, "functional witness");
                let ds = ds.union(&existing.ds);
                self.add_edge(node, &role, existing.node, ds.clone());
                self.add_type(existing.node, filler, ds);
                continue;
            }

            let child = if rbox.is_data(&role) {
                self.graph.add_literal(None, ds.clone())
            } else {
                let child = self.graph.add_fresh(node, Some(filler.clone()), ds.clone());
                self.add_type(child, Concept::top(), ds.clone());
                child
            };
            self.stats.nodes_created += 1;
            trace!(node = %node, role = %role, child = %child, filler = %filler, "new successor");
            self.add_edge(node, &role, child, ds.clone());
            self.add_type(child, filler, ds);
        }
        Ok(())
    }
}

//! Number restrictions: `≥n` generates, `≤n` chooses and merges.

use crate::branch::BranchKind;
use crate::clash::{Clash, ClashKind};
use crate::dependency::DependencySet;
use crate::graph::{Neighbour, NodeId};
use crate::queue::Selector;
use crate::strategy::CompletionStrategy;
use mimizuku_core::{Concept, Result, Role};
use std::collections::BTreeSet;
use tracing::trace;

impl CompletionStrategy {
    /// Functional roles first, then every `≤n r.C` in the label. The rule
    /// keeps no pointer: any new neighbour or neighbour label can violate
    /// an old restriction, so each call rescans. After one change the node
    /// is re-queued and the scan stops.
    pub(crate) fn apply_max(&mut self, node: NodeId) -> Result<()> {
        if self.clash.is_some() || !self.graph.is_live(node) || self.graph.node(node).is_literal() {
            return Ok(());
        }
        if self.apply_functionality(node) {
            return Ok(());
        }

        let n = self.graph.node(node);
        let restrictions: Vec<(Concept, DependencySet)> = n
            .concepts(Selector::Max)
            .iter()
            .filter_map(|c| n.type_ds(c).map(|ds| (c.clone(), ds.clone())))
            .collect();
        for (concept, ds) in restrictions {
            let Some((bound, role, filler)) = concept.as_max() else {
                continue;
            };
            let (role, filler) = (role.clone(), filler.clone());
            if self.apply_max_restriction(node, &concept, bound, &role, &filler, &ds) {
                self.queue.enqueue(node, Selector::Max);
                return Ok(());
            }
        }
        Ok(())
    }

    /// Two distinct neighbours over a functional role are merged.
    fn apply_functionality(&mut self, node: NodeId) -> bool {
        let rbox = self.ctx.rbox.clone();
        let n = self.graph.node(node);
        let roles: BTreeSet<Role> = n
            .out_edges()
            .iter()
            .map(|e| e.role.clone())
            .chain(n.in_edges().iter().map(|e| e.role.inverse()))
            .collect();
        let functional: BTreeSet<Role> = roles
            .iter()
            .flat_map(|r| rbox.functional_supers(r).iter().cloned())
            .collect();

        for f in functional {
            let neighbours = self.graph.distinct_neighbours(node, &f, &rbox);
            if neighbours.len() < 2 {
                continue;
            }
            let (a, b) = (&neighbours[0], &neighbours[1]);
            trace!(node = %node, role = %f, a = %a.node, b = %b.node, "functional merge");
            self.merge_nodes(a.node, b.node, a.ds.union(&b.ds));
            self.queue.enqueue(node, Selector::Max);
            return true;
        }
        false
    }

    /// Returns `true` when it changed the graph or recorded a clash.
    fn apply_max_restriction(
        &mut self,
        node: NodeId,
        concept: &Concept,
        bound: u32,
        role: &Role,
        filler: &Concept,
        ds: &DependencySet,
    ) -> bool {
        let rbox = self.ctx.rbox.clone();
        let neighbours = self.graph.distinct_neighbours(node, role, &rbox);
        if neighbours.len() as u32 <= bound {
            return false;
        }

        // choose: every neighbour must be decided on the filler
        if !filler.is_top() {
            let negation = filler.negate();
            let undecided = neighbours
                .iter()
                .find(|nb| !self.graph.has_type(nb.node, filler) && !self.graph.has_type(nb.node, &negation));
            if let Some(nb) = undecided {
                trace!(node = %node, neighbour = %nb.node, filler = %filler, "choose");
                self.push_branch(
                    BranchKind::Disjunction {
                        node: nb.node,
                        concept: Concept::or([filler.clone(), negation.clone()]),
                        disjuncts: vec![filler.clone(), negation],
                    },
                    ds.union(&nb.ds),
                );
                return true;
            }
        }

        let candidates: Vec<Neighbour> = neighbours
            .into_iter()
            .filter_map(|nb| {
                if filler.is_top() {
                    return Some(nb);
                }
                let type_ds = self.graph.type_ds(nb.node, filler)?;
                Some(Neighbour { node: nb.node, ds: nb.ds.union(type_ds) })
            })
            .collect();
        if candidates.len() as u32 <= bound {
            return false;
        }

        if bound == 0 {
            let Some(witness) = candidates.iter().min_by_key(|c| c.ds.max()) else {
                return false;
            };
            self.set_clash(Clash::new(
                node,
                ClashKind::MaxCardinality { role: role.clone(), bound },
                ds.union(&witness.ds),
            ));
            return true;
        }

        let mut pairs = Vec::new();
        let mut difference_ds = DependencySet::independent();
        let mut any_different = false;
        for (i, a) in candidates.iter().enumerate() {
            for b in &candidates[i + 1..] {
                match self.graph.is_different(a.node, b.node) {
                    Some(d) => {
                        any_different = true;
                        difference_ds.union_with(d);
                    }
                    None => pairs.push((a.node, b.node)),
                }
            }
        }
        let mut candidate_ds = ds.clone();
        for c in &candidates {
            candidate_ds.union_with(&c.ds);
        }

        // with a bound of one every candidate collapses into a single node
        if pairs.is_empty() || (bound == 1 && any_different) {
            self.set_clash(Clash::new(
                node,
                ClashKind::MaxCardinality { role: role.clone(), bound },
                candidate_ds.union(&difference_ds),
            ));
            return true;
        }
        if pairs.len() == 1 {
            let (a, b) = pairs[0];
            self.merge_nodes(a, b, candidate_ds.union(&difference_ds));
            return true;
        }
        if bound == 1 {
            let (a, b) = pairs[0];
            let merge_ds = candidates
                .iter()
                .filter(|c| c.node == a || c.node == b)
                .fold(ds.clone(), |acc, c| acc.union(&c.ds));
            self.merge_nodes(a, b, merge_ds);
            return true;
        }

        self.push_branch(
            BranchKind::Merge {
                node,
                restriction: concept.clone(),
                pairs,
            },
            candidate_ds,
        );
        true
    }

    /// `≥n r.C`: creates `n` pairwise different `r`-successors with `C`,
    /// unless enough of them exist already.
    pub(crate) fn apply_min(&mut self, node: NodeId) -> Result<()> {
        if self.clash.is_some() || !self.graph.is_live(node) {
            return Ok(());
        }
        if self.is_blocked(node) {
            self.pending.insert(node);
            return Ok(());
        }
        let rbox = self.ctx.rbox.clone();
        while let Some((concept, ds)) = self.next_concept(node, Selector::Min) {
            let Some((n, role, filler)) = concept.as_min() else {
                continue;
            };
            if n == 0 || self.has_different_successors(node, n, role, filler) {
                continue;
            }

            let data = rbox.is_data(role);
            let mut created = Vec::with_capacity(n as usize);
            for _ in 0..n {
                let child = if data {
                    self.graph.add_literal(None, ds.clone())
                } else {
                    self.graph.add_fresh(node, Some(filler.clone()), ds.clone())
                };
                self.stats.nodes_created += 1;
                self.add_edge(node, role, child, ds.clone());
                if !data {
                    self.add_type(child, Concept::top(), ds.clone());
                }
                self.add_type(child, filler.clone(), ds.clone());
                created.push(child);
            }
            for (i, a) in created.iter().enumerate() {
                for b in &created[i + 1..] {
                    self.graph.add_different(*a, *b, ds.clone());
                }
            }
            trace!(node = %node, restriction = %concept, created = created.len(), "min");
        }
        Ok(())
    }

    /// At least `n` pairwise different `role`-neighbours with `filler`, found greedily.
    fn has_different_successors(&self, node: NodeId, n: u32, role: &Role, filler: &Concept) -> bool {
        let mut picked: Vec<NodeId> = Vec::new();
        for nb in self.graph.distinct_neighbours(node, role, &self.ctx.rbox) {
            if !self.graph.has_type(nb.node, filler) && !filler.is_top() {
                continue;
            }
            if picked.iter().all(|p| self.graph.is_different(*p, nb.node).is_some()) {
                picked.push(nb.node);
                if picked.len() as u32 >= n {
                    return true;
                }
            }
        }
        false
    }
}

//! `∀`, automaton states and `Self`.
//!
//! `∀S.C` over a simple role adds `C` to every `S`-neighbour. Over a
//! complex role it becomes `∀[S@q0].C`, which then walks the role automaton
//! of `S` one edge at a time.

use crate::dependency::DependencySet;
use crate::graph::NodeId;
use crate::queue::Selector;
use crate::strategy::CompletionStrategy;
use mimizuku_core::{Concept, ConceptKind, ReasonerError, Result, Role};

impl CompletionStrategy {
    pub(crate) fn apply_universal(&mut self, node: NodeId) -> Result<()> {
        while let Some((concept, ds)) = self.next_concept(node, Selector::Universal) {
            match concept.kind() {
                ConceptKind::All(role, filler) => self.apply_all(node, role, filler, &ds),
                ConceptKind::AllState { role, state, filler } => {
                    self.apply_all_state(node, role, *state, filler, &ds)?
                }
                ConceptKind::HasSelf(role) => {
                    self.add_edge(node, role, node, ds);
                }
                _ => {
                    return Err(ReasonerError::internal(format!(
                        "{} reached the universal rule",
                        concept
                    )))
                }
            }
        }
        Ok(())
    }

    fn apply_all(&mut self, node: NodeId, role: &Role, filler: &Concept, ds: &DependencySet) {
        if let Some(automaton) = self.ctx.rbox.automaton(role) {
            let start = Concept::all_state(role.clone(), automaton.initial(), filler.clone());
            self.add_type(node, start, ds.clone());
            return;
        }
        for neighbour in self.graph.neighbours(node, role, &self.ctx.rbox) {
            self.add_type(neighbour.node, filler.clone(), ds.union(&neighbour.ds));
        }
    }

    fn apply_all_state(
        &mut self,
        node: NodeId,
        role: &Role,
        state: u32,
        filler: &Concept,
        ds: &DependencySet,
    ) -> Result<()> {
        let rbox = self.ctx.rbox.clone();
        let automaton = rbox
            .automaton(role)
            .ok_or_else(|| ReasonerError::internal(format!("no automaton for {}", role)))?;
        if automaton.is_accepting(state) {
            self.add_type(node, filler.clone(), ds.clone());
        }
        for transition in automaton.transitions(state) {
            let next = Concept::all_state(role.clone(), transition.target, filler.clone());
            match &transition.label {
                None => self.add_type(node, next, ds.clone()),
                Some(label) => {
                    for neighbour in self.graph.neighbours(node, label, &rbox) {
                        self.add_type(neighbour.node, next.clone(), ds.union(&neighbour.ds));
                    }
                }
            }
        }
        Ok(())
    }

    /// Applies the universal restrictions of `from` over a new edge
    /// `from -role-> to`.
    pub(crate) fn propagate_universals(&mut self, from: NodeId, to: NodeId, role: &Role, edge_ds: &DependencySet) {
        let rbox = self.ctx.rbox.clone();
        let node = self.graph.node(from);
        let restrictions: Vec<(Concept, DependencySet)> = node
            .concepts(Selector::Universal)
            .iter()
            .filter_map(|c| node.type_ds(c).map(|ds| (c.clone(), ds.clone())))
            .collect();
        for (concept, ds) in restrictions {
            let ds = ds.union(edge_ds);
            match concept.kind() {
                ConceptKind::All(s, filler) => {
                    if rbox.automaton(s).is_none() && rbox.is_sub_role_of(role, s) {
                        self.add_type(to, filler.clone(), ds);
                    }
                }
                ConceptKind::AllState { role: s, state, filler } => {
                    let Some(automaton) = rbox.automaton(s) else {
                        continue;
                    };
                    for transition in automaton.transitions(*state) {
                        if let Some(label) = &transition.label {
                            if rbox.is_sub_role_of(role, label) {
                                let next = Concept::all_state(s.clone(), transition.target, filler.clone());
                                self.add_type(to, next, ds.clone());
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
}

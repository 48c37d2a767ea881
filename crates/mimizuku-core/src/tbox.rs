//! Terminology: unfolding rules produced by absorption.
//!
//! Every class axiom ends up as a set of lazy unfolding rules `K → D`
//! keyed by an atom, a negated atom (for acyclic definitions), a nominal
//! or ⊤. Inclusions of the form `∃r.⊤ ⊑ D` become role domains.

use crate::model::{Axiom, AxiomId, AxiomKind, Ontology};
use crate::name::Name;
use crate::rbox::RBox;
use crate::term::{Concept, ConceptKind};
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::debug;

/// A concept to add whenever the key concept appears in a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unfolding {
    pub concept: Concept,
    pub explanation: Vec<AxiomId>,
}

/// A normalized inclusion `sub ⊑ sup` as asserted, before absorption.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inclusion {
    pub sub: Concept,
    pub sup: Concept,
    pub explanation: Vec<AxiomId>,
}

#[derive(Debug, Clone, Default)]
pub struct TBox {
    unfoldings: HashMap<Concept, Vec<Unfolding>>,
    inclusions: Vec<Inclusion>,
    defined: HashSet<Name>,
    told_subsumers: HashMap<Name, BTreeSet<Name>>,
    told_disjoints: HashMap<Name, BTreeSet<Name>>,
    classes: BTreeSet<Name>,
}

impl TBox {
    /// Absorbs the class axioms of `ontology`. Domain axioms discovered
    /// during absorption are registered in `rbox`.
    pub fn build(ontology: &Ontology, rbox: &mut RBox) -> TBox {
        let mut tbox = TBox {
            classes: ontology.classes.clone(),
            ..TBox::default()
        };

        let mut equivalences: Vec<(Concept, Concept, Vec<AxiomId>)> = Vec::new();
        for (id, axiom) in ontology.axioms_of(AxiomKind::TBox) {
            tbox.collect(id, axiom, &mut equivalences);
        }

        // A ≡ C is kept as a definition when A has no other left-hand axiom
        // and C does not depend on A.
        let mut lhs_count: HashMap<Name, usize> = HashMap::new();
        for inclusion in &tbox.inclusions {
            if let Some(name) = inclusion.sub.as_atom() {
                *lhs_count.entry(name.clone()).or_default() += 1;
            }
        }
        let mut candidates: Vec<(Name, Concept, Vec<AxiomId>)> = Vec::new();
        let mut general: Vec<Inclusion> = Vec::new();
        for (left, right, explanation) in equivalences {
            let (name, definition) = match (left.as_atom(), right.as_atom()) {
                (Some(name), _) => (name.clone(), right.clone()),
                (None, Some(name)) => (name.clone(), left.clone()),
                (None, None) => {
                    general.push(Inclusion {
                        sub: left.clone(),
                        sup: right.clone(),
                        explanation: explanation.clone(),
                    });
                    general.push(Inclusion {
                        sub: right,
                        sup: left,
                        explanation,
                    });
                    continue;
                }
            };
            *lhs_count.entry(name.clone()).or_default() += 1;
            candidates.push((name, definition, explanation));
        }

        let mut uses: HashMap<Name, BTreeSet<Name>> = HashMap::new();
        for inclusion in &tbox.inclusions {
            if let Some(name) = inclusion.sub.as_atom() {
                uses.entry(name.clone()).or_default().extend(inclusion.sup.atoms());
            }
        }
        for (name, definition, _) in &candidates {
            uses.entry(name.clone()).or_default().extend(definition.atoms());
        }

        let mut primitive: Vec<Inclusion> = std::mem::take(&mut tbox.inclusions);
        let mut definitions = Vec::new();
        for (name, definition, explanation) in candidates {
            let single = lhs_count.get(&name).copied().unwrap_or(0) == 1;
            if single && !depends_on(&uses, &definition, &name) {
                tbox.defined.insert(name.clone());
                definitions.push((name, definition, explanation));
            } else {
                let atom = Concept::atom(name);
                primitive.push(Inclusion {
                    sub: atom.clone(),
                    sup: definition.clone(),
                    explanation: explanation.clone(),
                });
                general.push(Inclusion {
                    sub: definition,
                    sup: atom,
                    explanation,
                });
            }
        }

        for (name, definition, explanation) in &definitions {
            let atom = Concept::atom(name.clone());
            tbox.add_unfolding(atom.clone(), definition.clone(), explanation.clone());
            tbox.add_unfolding(atom.negate(), definition.negate(), explanation.clone());
            tbox.record_told(&atom, definition);
            tbox.record_told(definition, &atom);
            tbox.inclusions.push(Inclusion {
                sub: atom.clone(),
                sup: definition.clone(),
                explanation: explanation.clone(),
            });
            tbox.inclusions.push(Inclusion {
                sub: definition.clone(),
                sup: atom,
                explanation: explanation.clone(),
            });
        }

        for inclusion in primitive.into_iter().chain(general) {
            tbox.record_told(&inclusion.sub, &inclusion.sup);
            tbox.absorb(&inclusion.sub, &inclusion.sup, &inclusion.explanation, rbox);
            tbox.inclusions.push(inclusion);
        }

        for role in rbox.reflexive_roles() {
            tbox.add_unfolding(Concept::top(), Concept::has_self(role), Vec::new());
        }

        debug!(
            keys = tbox.unfoldings.len(),
            definitions = tbox.defined.len(),
            general = tbox.unfold(&Concept::top()).len(),
            "absorbed terminology"
        );
        tbox
    }

    fn collect(
        &mut self,
        id: AxiomId,
        axiom: &Axiom,
        equivalences: &mut Vec<(Concept, Concept, Vec<AxiomId>)>,
    ) {
        match axiom {
            Axiom::SubClassOf(sub, sup) => self.inclusions.push(Inclusion {
                sub: sub.to_concept(),
                sup: sup.to_concept(),
                explanation: vec![id],
            }),
            Axiom::EquivalentClasses(classes) => {
                let concepts: Vec<Concept> = classes.iter().map(|c| c.to_concept()).collect();
                for other in concepts.iter().skip(1) {
                    equivalences.push((concepts[0].clone(), other.clone(), vec![id]));
                }
            }
            Axiom::DisjointClasses(classes) => {
                let concepts: Vec<Concept> = classes.iter().map(|c| c.to_concept()).collect();
                self.collect_disjoint(&concepts, id);
            }
            Axiom::DisjointUnion(name, classes) => {
                let concepts: Vec<Concept> = classes.iter().map(|c| c.to_concept()).collect();
                equivalences.push((
                    Concept::atom(name.clone()),
                    Concept::or(concepts.iter().cloned()),
                    vec![id],
                ));
                self.collect_disjoint(&concepts, id);
            }
            _ => {}
        }
    }

    fn collect_disjoint(&mut self, concepts: &[Concept], id: AxiomId) {
        for (i, left) in concepts.iter().enumerate() {
            for right in &concepts[i + 1..] {
                self.inclusions.push(Inclusion {
                    sub: left.clone(),
                    sup: right.negate(),
                    explanation: vec![id],
                });
            }
        }
    }

    fn record_told(&mut self, sub: &Concept, sup: &Concept) {
        if let Some(disjuncts) = sub.as_or() {
            for disjunct in &disjuncts {
                self.record_told(disjunct, sup);
            }
            return;
        }
        let Some(name) = sub.as_atom() else {
            return;
        };
        let conjuncts: Vec<Concept> = match sup.as_and() {
            Some(operands) => operands.to_vec(),
            None => vec![sup.clone()],
        };
        for conjunct in conjuncts {
            if let Some(sup_name) = conjunct.as_atom() {
                if sup_name != name {
                    self.told_subsumers
                        .entry(name.clone())
                        .or_default()
                        .insert(sup_name.clone());
                }
            } else if let Some(other) = conjunct.as_negated_atom() {
                self.told_disjoints
                    .entry(name.clone())
                    .or_default()
                    .insert(other.clone());
                self.told_disjoints
                    .entry(other.clone())
                    .or_default()
                    .insert(name.clone());
            }
        }
    }

    fn absorbable(&self, concept: &Concept) -> bool {
        match concept.kind() {
            ConceptKind::Atom(name) => !self.defined.contains(name),
            ConceptKind::Nominal(_) => true,
            _ => false,
        }
    }

    fn absorb(&mut self, sub: &Concept, sup: &Concept, explanation: &[AxiomId], rbox: &mut RBox) {
        if sup.is_top() || sub.is_bottom() {
            return;
        }
        if let Some(disjuncts) = sub.as_or() {
            for disjunct in disjuncts {
                self.absorb(&disjunct, sup, explanation, rbox);
            }
            return;
        }
        if sub.is_top() {
            self.add_unfolding(Concept::top(), sup.clone(), explanation.to_vec());
            return;
        }
        if self.absorbable(sub) {
            self.add_unfolding(sub.clone(), sup.clone(), explanation.to_vec());
            return;
        }
        if let Some(operands) = sub.as_and() {
            if let Some(pos) = operands.iter().position(|c| self.absorbable(c)) {
                let rest = Concept::and(
                    operands
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != pos)
                        .map(|(_, c)| c.clone()),
                );
                let key = operands[pos].clone();
                self.add_unfolding(key, Concept::or([rest.negate(), sup.clone()]), explanation.to_vec());
                return;
            }
        }
        if let Some((role, filler)) = sub.as_some() {
            if filler.is_top() {
                rbox.add_domain(role, sup.clone(), explanation.to_vec());
                return;
            }
        }
        self.add_unfolding(
            Concept::top(),
            Concept::or([sub.negate(), sup.clone()]),
            explanation.to_vec(),
        );
    }

    fn add_unfolding(&mut self, key: Concept, concept: Concept, explanation: Vec<AxiomId>) {
        if concept.is_top() {
            return;
        }
        let entries = self.unfoldings.entry(key).or_default();
        if !entries.iter().any(|u| u.concept == concept) {
            entries.push(Unfolding { concept, explanation });
        }
    }

    /// Unfolding rules triggered by `concept` in a label.
    pub fn unfold(&self, concept: &Concept) -> &[Unfolding] {
        self.unfoldings.get(concept).map(|u| u.as_slice()).unwrap_or(&[])
    }

    /// True when ⊤ carries no general inclusion.
    pub fn is_unfoldable(&self) -> bool {
        self.unfold(&Concept::top()).is_empty()
    }

    pub fn is_defined(&self, name: &Name) -> bool {
        self.defined.contains(name)
    }

    pub fn inclusions(&self) -> &[Inclusion] {
        &self.inclusions
    }

    pub fn classes(&self) -> &BTreeSet<Name> {
        &self.classes
    }

    /// Named classes asserted directly above `name`.
    pub fn told_subsumers(&self, name: &Name) -> impl Iterator<Item = &Name> {
        self.told_subsumers.get(name).into_iter().flatten()
    }

    pub fn told_disjoints(&self, name: &Name) -> impl Iterator<Item = &Name> {
        self.told_disjoints.get(name).into_iter().flatten()
    }

    pub fn are_told_disjoint(&self, a: &Name, b: &Name) -> bool {
        self.told_disjoints
            .get(a)
            .map(|d| d.contains(b))
            .unwrap_or(false)
    }

    /// Whether some left-hand side mentions a nominal.
    pub fn has_nominal_keys(&self) -> bool {
        self.unfoldings.keys().any(|k| k.as_nominal().is_some())
    }
}

fn depends_on(uses: &HashMap<Name, BTreeSet<Name>>, definition: &Concept, target: &Name) -> bool {
    let mut seen: HashSet<Name> = HashSet::new();
    let mut stack: Vec<Name> = definition.atoms().into_iter().collect();
    while let Some(name) = stack.pop() {
        if &name == target {
            return true;
        }
        if seen.insert(name.clone()) {
            if let Some(next) = uses.get(&name) {
                stack.extend(next.iter().cloned());
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassExpression as CE, PropertyExpression};
    use crate::term::Role;

    fn named(s: &str) -> CE {
        CE::named(s)
    }

    fn build(axioms: Vec<Axiom>) -> (TBox, RBox) {
        let mut ontology = Ontology::new();
        ontology.add_axioms(axioms);
        let mut rbox = RBox::from_axioms(ontology.axioms_of(AxiomKind::RBox)).unwrap();
        let tbox = TBox::build(&ontology, &mut rbox);
        (tbox, rbox)
    }

    #[test]
    fn test_primitive_inclusion_unfolds_atom() {
        let (tbox, _) = build(vec![Axiom::SubClassOf(named("ex:A"), named("ex:B"))]);
        let unfolded = tbox.unfold(&Concept::atom("ex:A"));
        assert_eq!(unfolded.len(), 1);
        assert_eq!(unfolded[0].concept, Concept::atom("ex:B"));
        assert_eq!(unfolded[0].explanation, vec![0]);
        assert!(tbox.is_unfoldable());
        assert!(tbox.told_subsumers(&Name::new("ex:A")).any(|n| n.as_str() == "ex:B"));
    }

    #[test]
    fn test_acyclic_definition_unfolds_both_ways() {
        let def = CE::IntersectionOf(vec![named("ex:B"), named("ex:C")]);
        let (tbox, _) = build(vec![Axiom::EquivalentClasses(vec![named("ex:A"), def.clone()])]);
        assert!(tbox.is_defined(&Name::new("ex:A")));
        assert_eq!(tbox.unfold(&Concept::atom("ex:A"))[0].concept, def.to_concept());
        assert_eq!(
            tbox.unfold(&Concept::atom("ex:A").negate())[0].concept,
            def.to_concept().negate()
        );
    }

    #[test]
    fn test_cyclic_definition_becomes_gci() {
        let r = PropertyExpression::object("ex:r");
        let (tbox, _) = build(vec![Axiom::EquivalentClasses(vec![
            named("ex:A"),
            CE::some(r, named("ex:A")),
        ])]);
        assert!(!tbox.is_defined(&Name::new("ex:A")));
        assert!(tbox.unfold(&Concept::atom("ex:A").negate()).is_empty());
        assert!(!tbox.is_unfoldable());
    }

    #[test]
    fn test_definition_with_extra_axiom_is_not_full() {
        let (tbox, _) = build(vec![
            Axiom::EquivalentClasses(vec![named("ex:A"), named("ex:B")]),
            Axiom::SubClassOf(named("ex:A"), named("ex:C")),
        ]);
        assert!(!tbox.is_defined(&Name::new("ex:A")));
        assert_eq!(tbox.unfold(&Concept::atom("ex:A")).len(), 2);
    }

    #[test]
    fn test_conjunctive_lhs_absorbed_into_atom() {
        let (tbox, _) = build(vec![Axiom::SubClassOf(
            CE::IntersectionOf(vec![named("ex:A"), named("ex:X")]),
            named("ex:D"),
        )]);
        let key = {
            let a = Concept::atom("ex:A");
            let x = Concept::atom("ex:X");
            if a < x { a } else { x }
        };
        assert_eq!(tbox.unfold(&key).len(), 1);
        assert!(tbox.is_unfoldable());
    }

    #[test]
    fn test_existential_top_becomes_domain() {
        let r = PropertyExpression::object("ex:r");
        let (tbox, rbox) = build(vec![Axiom::SubClassOf(CE::some(r, CE::Thing), named("ex:D"))]);
        assert!(tbox.is_unfoldable());
        assert_eq!(rbox.domains(&Role::new("ex:r"))[0].concept, Concept::atom("ex:D"));
    }

    #[test]
    fn test_general_inclusion_goes_to_top() {
        let r = PropertyExpression::object("ex:r");
        let (tbox, _) = build(vec![Axiom::SubClassOf(CE::some(r, named("ex:A")), named("ex:B"))]);
        assert_eq!(tbox.unfold(&Concept::top()).len(), 1);
    }

    #[test]
    fn test_disjoint_classes_told() {
        let (tbox, _) = build(vec![Axiom::DisjointClasses(vec![named("ex:A"), named("ex:B")])]);
        assert!(tbox.are_told_disjoint(&Name::new("ex:A"), &Name::new("ex:B")));
        assert!(tbox.are_told_disjoint(&Name::new("ex:B"), &Name::new("ex:A")));
    }

    #[test]
    fn test_union_lhs_split() {
        let (tbox, _) = build(vec![Axiom::SubClassOf(
            CE::UnionOf(vec![named("ex:A"), named("ex:B")]),
            named("ex:C"),
        )]);
        assert_eq!(tbox.unfold(&Concept::atom("ex:A")).len(), 1);
        assert_eq!(tbox.unfold(&Concept::atom("ex:B")).len(), 1);
        assert!(tbox.told_subsumers(&Name::new("ex:A")).any(|n| n.as_str() == "ex:C"));
        assert!(tbox.told_subsumers(&Name::new("ex:B")).any(|n| n.as_str() == "ex:C"));
    }

    #[test]
    fn test_union_lhs_with_own_conclusion_is_told() {
        let (tbox, _) = build(vec![Axiom::SubClassOf(
            CE::UnionOf(vec![named("ex:C"), named("ex:A")]),
            named("ex:A"),
        )]);
        let told: Vec<&Name> = tbox.told_subsumers(&Name::new("ex:C")).collect();
        assert_eq!(told, vec![&Name::new("ex:A")]);
        assert_eq!(tbox.told_subsumers(&Name::new("ex:A")).count(), 0);
    }

    #[test]
    fn test_reflexive_role_adds_self() {
        let (tbox, _) = build(vec![Axiom::ReflexiveProperty(PropertyExpression::object("ex:r"))]);
        assert_eq!(
            tbox.unfold(&Concept::top())[0].concept,
            Concept::has_self(Role::new("ex:r"))
        );
    }
}

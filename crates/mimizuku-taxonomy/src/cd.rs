//! Classification by top and bottom search over the partial taxonomy.
//!
//! Classes are inserted in definition order, told supers first. When the
//! terminology is unfoldable and free of nominals two shortcuts apply:
//! completely defined classes, whose descriptions only use atoms, negated
//! atoms, conjunctions and value restrictions, take their supers straight
//! from the told hierarchy; primitive classes skip the bottom search,
//! since nothing classified after them can fall below them without saying
//! so. Defined classes run in a second phase with both searches.

use crate::builder::{empty_taxonomy, TaxonomyBuilder};
use crate::oracle::{concept_of, SubsumptionOracle};
use crate::taxonomy::{NodeIndex, Taxonomy};
use mimizuku_core::{Concept, ConceptKind, Expressivity, Name, RBox, Result, TBox};
use mimizuku_tableau::ReasoningContext;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConceptFlag {
    /// Supers follow from the told hierarchy alone.
    CompletelyDefined,
    /// Only told subsumption can place anything below it.
    Primitive,
    /// Has a definition, takes part in a told cycle or has told equivalents.
    NonPrimitive,
    /// Primitive, but below a non-primitive class.
    NonPrimitiveTa,
    /// Needs both searches: role domains and general inclusions.
    Other,
}

impl ConceptFlag {
    fn in_first_phase(self) -> bool {
        matches!(self, Self::CompletelyDefined | Self::Primitive | Self::Other)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatistics {
    pub classes: usize,
    pub unsatisfiable: usize,
    pub top_searches: usize,
    pub bottom_searches: usize,
    pub told_placements: usize,
    pub equivalence_shortcuts: usize,
    pub subsumption_checks: usize,
}

#[derive(Debug, Clone, Copy)]
enum Propagate {
    Up,
    Down,
    None,
}

#[derive(Debug)]
pub struct CdOptimizedTaxonomyBuilder {
    tbox: Arc<TBox>,
    use_cd: bool,
    order: Vec<Name>,
    flags: HashMap<Name, ConceptFlag>,
    told_subs: HashMap<Name, BTreeSet<Name>>,
    told: Taxonomy<Name>,
    taxonomy: Taxonomy<Name>,
    marks: HashMap<NodeIndex, bool>,
    stats: BuildStatistics,
}

impl CdOptimizedTaxonomyBuilder {
    pub fn new(tbox: Arc<TBox>, rbox: &RBox, expressivity: &Expressivity) -> Self {
        let use_cd = tbox.is_unfoldable() && !expressivity.nominals && !tbox.has_nominal_keys();
        let (order, cyclic) = definition_order(&tbox);

        let mut told_subs: HashMap<Name, BTreeSet<Name>> = HashMap::new();
        for class in &order {
            for sup in tbox.told_subsumers(class) {
                told_subs.entry(sup.clone()).or_default().insert(class.clone());
            }
        }

        let told = told_taxonomy(&tbox, &order);
        let flags = if use_cd {
            concept_flags(&tbox, rbox, &order, &cyclic)
        } else {
            HashMap::new()
        };
        debug!(classes = order.len(), cyclic = cyclic.len(), use_cd, "definition order computed");

        Self {
            tbox,
            use_cd,
            order,
            flags,
            told_subs,
            told,
            taxonomy: empty_taxonomy(),
            marks: HashMap::new(),
            stats: BuildStatistics::default(),
        }
    }

    pub fn from_context(ctx: &ReasoningContext) -> Self {
        Self::new(ctx.tbox.clone(), &ctx.rbox, &ctx.expressivity)
    }

    pub fn uses_cd(&self) -> bool {
        self.use_cd
    }

    pub fn flag(&self, class: &Name) -> Option<ConceptFlag> {
        self.flags.get(class).copied()
    }

    /// Hierarchy of the asserted atomic subsumptions only.
    pub fn told_taxonomy(&self) -> &Taxonomy<Name> {
        &self.told
    }

    /// Told supers before told subs.
    pub fn definition_order(&self) -> &[Name] {
        &self.order
    }

    pub fn statistics(&self) -> BuildStatistics {
        self.stats
    }

    fn classify_class(&mut self, class: &Name, require_top_search: bool, oracle: &mut dyn SubsumptionOracle) -> Result<()> {
        if self.taxonomy.contains(class) {
            return Ok(());
        }
        oracle.checkpoint()?;
        self.stats.classes += 1;

        let concept = Concept::atom(class.clone());
        if !oracle.is_satisfiable(&concept)? {
            debug!(class = %class, "unsatisfiable");
            self.stats.unsatisfiable += 1;
            let bottom = self.taxonomy.bottom();
            self.taxonomy.add_equivalent(class.clone(), bottom);
            return Ok(());
        }
        if !oracle.is_satisfiable(&concept.negate())? {
            debug!(class = %class, "equivalent to owl:Thing");
            let top = self.taxonomy.top();
            self.taxonomy.add_equivalent(class.clone(), top);
            return Ok(());
        }

        let flag = self.flags.get(class).copied().unwrap_or(ConceptFlag::Other);
        let skip_top = self.use_cd && !require_top_search && flag == ConceptFlag::CompletelyDefined;
        let (supers, skip_bottom) = if skip_top {
            self.stats.told_placements += 1;
            (self.told_supers(class), true)
        } else {
            let skip_bottom = self.use_cd && matches!(flag, ConceptFlag::Primitive | ConceptFlag::CompletelyDefined);
            (self.top_search(class, oracle)?, skip_bottom)
        };

        let subs = if skip_bottom {
            vec![self.taxonomy.bottom()]
        } else {
            if let &[sup] = supers.as_slice() {
                if sup != self.taxonomy.top() {
                    let sup_name = concept_of(self.taxonomy.node(sup).name());
                    self.stats.subsumption_checks += 1;
                    if oracle.is_subsumed_by(&sup_name, &concept)? {
                        debug!(class = %class, equivalent = %self.taxonomy.node(sup).name(), "equivalent to its only super");
                        self.stats.equivalence_shortcuts += 1;
                        self.taxonomy.add_equivalent(class.clone(), sup);
                        return Ok(());
                    }
                }
            }
            self.bottom_search(class, &supers, oracle)?
        };

        self.taxonomy.add_node(class.clone(), &supers, &subs);
        debug!(class = %class, supers = supers.len(), subs = subs.len(), ?flag, "classified");
        Ok(())
    }

    /// Direct supers read off the told taxonomy.
    fn told_supers(&self, class: &Name) -> Vec<NodeIndex> {
        let told: BTreeSet<NodeIndex> = self
            .told
            .supers(class, true)
            .iter()
            .filter_map(|sup| self.taxonomy.node_of(sup))
            .collect();
        let supers = self.taxonomy.most_specific_nodes(&told);
        if supers.is_empty() {
            vec![self.taxonomy.top()]
        } else {
            supers
        }
    }

    fn top_search(&mut self, class: &Name, oracle: &mut dyn SubsumptionOracle) -> Result<Vec<NodeIndex>> {
        self.stats.top_searches += 1;
        self.marks.clear();
        let (top, bottom) = (self.taxonomy.top(), self.taxonomy.bottom());
        self.mark(top, true, Propagate::None);
        self.mark(bottom, false, Propagate::None);
        let told: Vec<Name> = self.tbox.told_subsumers(class).cloned().collect();
        for sup in told {
            if let Some(node) = self.taxonomy.node_of(&sup) {
                self.mark(node, true, Propagate::Up);
            }
        }
        let disjoints: Vec<Name> = self.tbox.told_disjoints(class).cloned().collect();
        for disjoint in disjoints {
            if let Some(node) = self.taxonomy.node_of(&disjoint) {
                self.mark(node, false, Propagate::Down);
            }
        }

        let mut result = Vec::new();
        let mut visited = HashSet::new();
        self.search(true, class, top, &mut visited, &mut result, oracle)?;
        Ok(result)
    }

    fn bottom_search(&mut self, class: &Name, supers: &[NodeIndex], oracle: &mut dyn SubsumptionOracle) -> Result<Vec<NodeIndex>> {
        let bottom = self.taxonomy.bottom();
        let mut leaves = BTreeSet::new();
        for &sup in supers {
            self.collect_leaves(sup, &mut leaves);
        }
        if leaves.is_empty() {
            return Ok(vec![bottom]);
        }
        self.stats.bottom_searches += 1;

        self.marks.clear();
        let top = self.taxonomy.top();
        self.mark(top, false, Propagate::None);
        self.mark(bottom, true, Propagate::None);
        let told: Vec<Name> = self.told_subs.get(class).into_iter().flatten().cloned().collect();
        for sub in told {
            if let Some(node) = self.taxonomy.node_of(&sub) {
                self.mark(node, true, Propagate::Down);
            }
        }
        for &sup in supers {
            self.mark(sup, false, Propagate::None);
        }

        let mut result = Vec::new();
        let mut visited = HashSet::new();
        for leaf in leaves {
            if self.check(leaf, class, false, oracle)? {
                self.search(false, class, leaf, &mut visited, &mut result, oracle)?;
            }
        }
        if result.is_empty() {
            result.push(bottom);
        }
        Ok(result)
    }

    fn collect_leaves(&self, node: NodeIndex, leaves: &mut BTreeSet<NodeIndex>) {
        let mut stack: Vec<NodeIndex> = self.taxonomy.node(node).subs().iter().copied().collect();
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let n = self.taxonomy.node(current);
            if n.is_leaf() {
                leaves.insert(current);
            } else {
                stack.extend(n.subs().iter().copied());
            }
        }
    }

    /// Top-down: the most specific nodes subsuming `class`. Bottom-up: the
    /// most general nodes `class` subsumes.
    fn search(
        &mut self,
        top_down: bool,
        class: &Name,
        node: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        result: &mut Vec<NodeIndex>,
        oracle: &mut dyn SubsumptionOracle,
    ) -> Result<()> {
        visited.insert(node);
        let next: Vec<NodeIndex> = if top_down {
            self.taxonomy.node(node).subs().iter().copied().collect()
        } else {
            self.taxonomy.node(node).supers().iter().copied().collect()
        };
        let mut positive = Vec::new();
        for candidate in next {
            if self.check(candidate, class, top_down, oracle)? {
                positive.push(candidate);
            }
        }
        if positive.is_empty() {
            if !result.contains(&node) {
                result.push(node);
            }
            return Ok(());
        }
        for candidate in positive {
            if !visited.contains(&candidate) {
                self.search(top_down, class, candidate, visited, result, oracle)?;
            }
        }
        Ok(())
    }

    /// Top-down: `class ⊑ node`. Bottom-up: `node ⊑ class`. A node with
    /// several parents on the search path needs all of them to pass first.
    fn check(&mut self, node: NodeIndex, class: &Name, top_down: bool, oracle: &mut dyn SubsumptionOracle) -> Result<bool> {
        if let Some(&known) = self.marks.get(&node) {
            return Ok(known);
        }
        let parents: Vec<NodeIndex> = if top_down {
            self.taxonomy.node(node).supers().iter().copied().collect()
        } else {
            self.taxonomy.node(node).subs().iter().copied().collect()
        };
        if parents.len() > 1 {
            for parent in parents {
                if !self.check(parent, class, top_down, oracle)? {
                    self.mark(node, false, Propagate::None);
                    return Ok(false);
                }
            }
        }

        let other = concept_of(self.taxonomy.node(node).name());
        let concept = Concept::atom(class.clone());
        self.stats.subsumption_checks += 1;
        let result = if top_down {
            oracle.is_subsumed_by(&concept, &other)?
        } else {
            oracle.is_subsumed_by(&other, &concept)?
        };
        self.mark(node, result, Propagate::None);
        Ok(result)
    }

    fn mark(&mut self, node: NodeIndex, value: bool, propagate: Propagate) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            match self.marks.get(&current) {
                Some(&existing) if existing != value => {
                    warn!(node = current, "conflicting classification marks, keeping the first");
                    continue;
                }
                Some(_) if current != node => continue,
                _ => {}
            }
            self.marks.insert(current, value);
            let n = self.taxonomy.node(current);
            match propagate {
                Propagate::Up => stack.extend(n.supers().iter().copied()),
                Propagate::Down => stack.extend(n.subs().iter().copied()),
                Propagate::None => {}
            }
        }
    }
}

impl TaxonomyBuilder for CdOptimizedTaxonomyBuilder {
    fn name(&self) -> &'static str {
        "cd-optimized"
    }

    fn classify(&mut self, oracle: &mut dyn SubsumptionOracle) -> Result<Taxonomy<Name>> {
        self.taxonomy = empty_taxonomy();
        self.stats = BuildStatistics::default();
        let order = self.order.clone();

        if self.use_cd {
            let (first, second): (Vec<&Name>, Vec<&Name>) = order.iter().partition(|c| {
                self.flags
                    .get(*c)
                    .copied()
                    .unwrap_or(ConceptFlag::Other)
                    .in_first_phase()
            });
            info!(phase = 1, classes = first.len(), "classification phase started");
            for class in first {
                self.classify_class(class, false, oracle)?;
            }
            info!(phase = 2, classes = second.len(), "classification phase started");
            for class in second {
                self.classify_class(class, true, oracle)?;
            }
        } else {
            info!(classes = order.len(), "classification started without told shortcuts");
            for class in &order {
                self.classify_class(class, true, oracle)?;
            }
        }

        let stats = self.stats;
        info!(
            classes = stats.classes,
            unsatisfiable = stats.unsatisfiable,
            told = stats.told_placements,
            checks = stats.subsumption_checks,
            "classification finished"
        );
        Ok(self.taxonomy.clone())
    }
}

/// Post-order over the classes each class mentions (told subsumers and
/// the atoms of its unfoldings), plus the classes on cycles.
fn definition_order(tbox: &TBox) -> (Vec<Name>, HashSet<Name>) {
    #[derive(PartialEq)]
    enum State {
        Open,
        Done,
    }

    let mut order = Vec::with_capacity(tbox.classes().len());
    let mut cyclic = HashSet::new();
    let mut state: HashMap<Name, State> = HashMap::new();
    let children = |name: &Name| -> Vec<Name> {
        let atom = Concept::atom(name.clone());
        let mut used: BTreeSet<Name> = tbox.told_subsumers(name).cloned().collect();
        for unfolding in tbox.unfold(&atom).iter().chain(tbox.unfold(&atom.negate())) {
            used.extend(unfolding.concept.atoms());
        }
        used.remove(name);
        used.into_iter().rev().collect()
    };

    for root in tbox.classes() {
        if *root == Name::thing() || *root == Name::nothing() || state.contains_key(root) {
            continue;
        }
        state.insert(root.clone(), State::Open);
        let mut stack: Vec<(Name, Vec<Name>)> = vec![(root.clone(), children(root))];
        loop {
            let Some((_, pending)) = stack.last_mut() else {
                break;
            };
            match pending.pop() {
                Some(child) => {
                    if child == Name::thing() || child == Name::nothing() {
                        continue;
                    }
                    match state.get(&child) {
                        None => {
                            state.insert(child.clone(), State::Open);
                            let next = children(&child);
                            stack.push((child, next));
                        }
                        Some(State::Open) => {
                            if let Some(pos) = stack.iter().position(|(n, _)| *n == child) {
                                cyclic.extend(stack[pos..].iter().map(|(n, _)| n.clone()));
                            }
                        }
                        Some(State::Done) => {}
                    }
                }
                None => {
                    if let Some((done, _)) = stack.pop() {
                        state.insert(done.clone(), State::Done);
                        order.push(done);
                    }
                }
            }
        }
    }
    (order, cyclic)
}

fn told_taxonomy(tbox: &TBox, order: &[Name]) -> Taxonomy<Name> {
    let mut told = empty_taxonomy();
    for class in order {
        let direct: Vec<&Name> = tbox.told_subsumers(class).collect();
        let equivalent = direct
            .iter()
            .find(|sup| told.contains(**sup) && tbox.told_subsumers(sup).any(|back| back == class))
            .and_then(|sup| told.node_of(*sup));
        if let Some(node) = equivalent {
            told.add_equivalent(class.clone(), node);
            continue;
        }
        let nodes: BTreeSet<NodeIndex> = direct.iter().filter_map(|sup| told.node_of(*sup)).collect();
        let mut supers = told.most_specific_nodes(&nodes);
        if supers.is_empty() {
            supers.push(told.top());
        }
        let bottom = told.bottom();
        told.add_node(class.clone(), &supers, &[bottom]);
    }
    told
}

fn concept_flags(tbox: &TBox, rbox: &RBox, order: &[Name], cyclic: &HashSet<Name>) -> HashMap<Name, ConceptFlag> {
    let mut flags: HashMap<Name, ConceptFlag> = HashMap::new();

    for role in rbox.roles() {
        for restriction in rbox.domains(&role).iter().chain(rbox.ranges(&role)) {
            for name in restriction.concept.atoms() {
                flags.insert(name, ConceptFlag::Other);
            }
        }
    }
    // a general inclusion is absorbed into one of its left-hand atoms, so
    // every class it mentions may gain untold supers or subs
    for inclusion in tbox.inclusions() {
        if inclusion.sub.as_atom().is_none() && !is_definition_of(tbox, &inclusion.sub, &inclusion.sup) {
            for name in inclusion.sub.atoms().into_iter().chain(inclusion.sup.atoms()) {
                flags.insert(name, ConceptFlag::Other);
            }
        }
    }

    for class in order {
        let atom = Concept::atom(class.clone());
        let equivalent = tbox
            .told_subsumers(class)
            .any(|sup| tbox.told_subsumers(sup).any(|back| back == class));
        if tbox.is_defined(class) || cyclic.contains(class) || equivalent {
            flags.insert(class.clone(), ConceptFlag::NonPrimitive);
            for unfolding in tbox.unfold(&atom) {
                for name in unfolding.concept.atoms() {
                    match flags.get(&name) {
                        None | Some(ConceptFlag::CompletelyDefined) => {
                            flags.insert(name, ConceptFlag::Primitive);
                        }
                        _ => {}
                    }
                }
            }
            continue;
        }

        let below_non_primitive = tbox.told_subsumers(class).any(|sup| {
            matches!(
                flags.get(sup),
                Some(ConceptFlag::NonPrimitive | ConceptFlag::NonPrimitiveTa)
            )
        });
        if below_non_primitive {
            flags.insert(class.clone(), ConceptFlag::NonPrimitiveTa);
            continue;
        }
        if flags.contains_key(class) {
            continue;
        }

        // an absorbed inclusion on a told super can combine with other
        // supers, so the told shortcut needs a completely defined ancestry
        let completely_defined = tbox.unfold(&atom).iter().all(|u| is_cd_description(tbox, &u.concept))
            && tbox
                .told_subsumers(class)
                .all(|sup| flags.get(sup) == Some(&ConceptFlag::CompletelyDefined));
        let flag = if completely_defined {
            ConceptFlag::CompletelyDefined
        } else {
            ConceptFlag::Primitive
        };
        flags.insert(class.clone(), flag);
    }
    flags
}

/// `definition ⊑ A` for a defined class `A ≡ definition`.
fn is_definition_of(tbox: &TBox, definition: &Concept, class: &Concept) -> bool {
    class.as_atom().is_some_and(|name| {
        tbox.is_defined(name) && tbox.unfold(class).iter().any(|u| &u.concept == definition)
    })
}

fn is_cd_description(tbox: &TBox, concept: &Concept) -> bool {
    match concept.kind() {
        ConceptKind::Top | ConceptKind::Atom(_) | ConceptKind::All(..) => true,
        ConceptKind::And(operands) => operands.iter().all(|c| is_cd_description(tbox, c)),
        // ¬A of a defined A unfolds into the negated definition
        ConceptKind::Not(inner) => inner.as_atom().is_some_and(|name| !tbox.is_defined(name)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::TableauOracle;
    use mimizuku_core::{Axiom, ClassExpression as CE, Ontology, PropertyExpression, ReasoningBudget};
    use mimizuku_tableau::{TableauConfig, TableauReasoner};

    fn n(s: &str) -> Name {
        Name::new(format!("ex:{s}"))
    }

    fn c(s: &str) -> CE {
        CE::named(n(s))
    }

    fn sub(a: CE, b: CE) -> Axiom {
        Axiom::SubClassOf(a, b)
    }

    fn classify(axioms: Vec<Axiom>) -> (Taxonomy<Name>, CdOptimizedTaxonomyBuilder) {
        let mut ontology = Ontology::new();
        ontology.add_axioms(axioms);
        let mut reasoner = TableauReasoner::from_ontology(&ontology, TableauConfig::default()).unwrap();
        let mut builder = CdOptimizedTaxonomyBuilder::from_context(reasoner.context());
        let budget = ReasoningBudget::unlimited();
        let mut oracle = TableauOracle::new(&mut reasoner, &budget);
        let taxonomy = builder.classify(&mut oracle).unwrap();
        (taxonomy, builder)
    }

    #[test]
    fn primitive_chain() {
        let (t, builder) = classify(vec![sub(c("A"), c("B")), sub(c("B"), c("C"))]);
        assert!(builder.uses_cd());
        assert_eq!(t.supers(&n("A"), true), BTreeSet::from([n("B")]));
        assert_eq!(t.supers(&n("B"), true), BTreeSet::from([n("C")]));
        assert_eq!(t.supers(&n("C"), true), BTreeSet::from([Name::thing()]));
        assert_eq!(builder.flag(&n("A")), Some(ConceptFlag::CompletelyDefined));
        assert_eq!(builder.told_taxonomy(), &t);
        let order = builder.definition_order();
        let pos = |x: &str| order.iter().position(|o| *o == n(x)).unwrap();
        assert!(pos("C") < pos("B") && pos("B") < pos("A"));
    }

    #[test]
    fn defined_class_collects_primitive_subs() {
        let has_child = PropertyExpression::object(n("hasChild"));
        let (t, builder) = classify(vec![
            Axiom::EquivalentClasses(vec![
                c("Parent"),
                CE::IntersectionOf(vec![c("Person"), CE::some(has_child.clone(), c("Person"))]),
            ]),
            sub(c("Father"), CE::IntersectionOf(vec![c("Man"), CE::some(has_child, c("Person"))])),
            sub(c("Man"), c("Person")),
        ]);
        assert_eq!(builder.flag(&n("Parent")), Some(ConceptFlag::NonPrimitive));
        assert_eq!(t.is_subsumed_by(&n("Father"), &n("Parent")), Some(true));
        assert_eq!(t.supers(&n("Father"), true), BTreeSet::from([n("Man"), n("Parent")]));
        assert_eq!(t.is_subsumed_by(&n("Man"), &n("Parent")), Some(false));
    }

    #[test]
    fn unsatisfiable_and_equivalent_classes() {
        let (t, _) = classify(vec![
            sub(c("A"), c("B")),
            Axiom::DisjointClasses(vec![c("A"), c("B")]),
            Axiom::EquivalentClasses(vec![c("X"), c("Y")]),
            sub(c("Z"), c("X")),
        ]);
        assert_eq!(t.is_equivalent(&n("A"), &Name::nothing()), Some(true));
        assert_eq!(t.is_equivalent(&n("X"), &n("Y")), Some(true));
        assert_eq!(t.supers(&n("Z"), true), BTreeSet::from([n("X"), n("Y")]));
    }

    #[test]
    fn absorbed_conjunction_reaches_untold_super() {
        let (t, builder) = classify(vec![
            sub(c("X"), c("A")),
            sub(c("X"), c("B")),
            sub(CE::IntersectionOf(vec![c("A"), c("B")]), c("C")),
        ]);
        assert_eq!(builder.flag(&n("C")), Some(ConceptFlag::Other));
        assert_eq!(t.is_subsumed_by(&n("X"), &n("C")), Some(true));
        assert_eq!(t.is_subsumed_by(&n("A"), &n("C")), Some(false));
    }

    #[test]
    fn domains_disable_shortcuts_for_their_class() {
        let r = PropertyExpression::object(n("r"));
        let (t, builder) = classify(vec![
            Axiom::PropertyDomain(r.clone(), c("D")),
            sub(c("A"), CE::some(r, c("B"))),
        ]);
        assert_eq!(builder.flag(&n("D")), Some(ConceptFlag::Other));
        assert_eq!(t.is_subsumed_by(&n("A"), &n("D")), Some(true));
    }

    #[test]
    fn union_lhs_places_disjunct_under_conclusion() {
        let (t, builder) = classify(vec![sub(CE::UnionOf(vec![c("C"), c("A")]), c("A"))]);
        assert_eq!(builder.flag(&n("C")), Some(ConceptFlag::Other));
        assert_eq!(t.is_subsumed_by(&n("C"), &n("A")), Some(true));
        assert_eq!(t.supers(&n("C"), true), BTreeSet::from([n("A")]));
    }

    #[test]
    fn negated_lhs_conjunct_gains_untold_sub() {
        // A ⊓ ¬B ⊑ C ⊓ ¬A entails A ⊑ B
        let (t, builder) = classify(vec![sub(
            CE::IntersectionOf(vec![c("A"), CE::not(c("B"))]),
            CE::IntersectionOf(vec![c("C"), CE::not(c("A"))]),
        )]);
        assert_eq!(builder.flag(&n("B")), Some(ConceptFlag::Other));
        assert_eq!(t.is_subsumed_by(&n("A"), &n("B")), Some(true));
        assert_eq!(t.is_subsumed_by(&n("B"), &n("A")), Some(false));
        assert_eq!(t.is_subsumed_by(&n("A"), &n("C")), Some(false));
    }

    #[test]
    fn range_disables_shortcuts_for_its_class() {
        let r = PropertyExpression::object(n("r"));
        let (t, builder) = classify(vec![
            Axiom::PropertyRange(r.clone(), c("R")),
            sub(c("A"), CE::some(PropertyExpression::inverse_of(r), CE::Thing)),
        ]);
        assert_eq!(builder.flag(&n("R")), Some(ConceptFlag::Other));
        assert_eq!(t.is_subsumed_by(&n("A"), &n("R")), Some(true));
    }

    #[test]
    fn mentioned_classes_come_first() {
        let r = PropertyExpression::object(n("r"));
        let (t, builder) = classify(vec![
            sub(c("A"), CE::UnionOf(vec![c("Z"), c("U")])),
            sub(c("U"), CE::Nothing),
            sub(c("B"), CE::some(r, c("A"))),
        ]);
        let order = builder.definition_order();
        let pos = |x: &str| order.iter().position(|o| *o == n(x)).unwrap();
        assert!(pos("Z") < pos("A") && pos("A") < pos("B"));
        assert_eq!(t.is_subsumed_by(&n("A"), &n("Z")), Some(true));
    }

    #[test]
    fn classification_is_repeatable() {
        let axioms = vec![
            sub(c("A"), c("B")),
            sub(c("C"), CE::IntersectionOf(vec![c("A"), c("D")])),
            Axiom::EquivalentClasses(vec![c("E"), CE::IntersectionOf(vec![c("B"), c("D")])]),
        ];
        let mut ontology = Ontology::new();
        ontology.add_axioms(axioms);
        let mut reasoner = TableauReasoner::from_ontology(&ontology, TableauConfig::default()).unwrap();
        let mut builder = CdOptimizedTaxonomyBuilder::from_context(reasoner.context());
        let budget = ReasoningBudget::unlimited();
        let mut oracle = TableauOracle::new(&mut reasoner, &budget);
        let first = builder.classify(&mut oracle).unwrap();
        let second = builder.classify(&mut oracle).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.is_subsumed_by(&n("C"), &n("E")), Some(true));
    }

    #[test]
    fn expired_budget_interrupts() {
        let mut ontology = Ontology::new();
        ontology.add_axiom(sub(c("A"), c("B")));
        let mut reasoner = TableauReasoner::from_ontology(&ontology, TableauConfig::default()).unwrap();
        let mut builder = CdOptimizedTaxonomyBuilder::from_context(reasoner.context());
        let budget = ReasoningBudget::unlimited();
        budget.flag().cancel();
        let mut oracle = TableauOracle::new(&mut reasoner, &budget);
        let err = builder.classify(&mut oracle).unwrap_err();
        assert!(err.is_interrupt());
    }
}

//! Classification of EL terminologies by saturation.
//!
//! Inclusions are first normalized into four shapes over basic concepts
//! (named classes, `⊤`, `⊥` and fresh names):
//!
//! ```text
//! A ⊑ B      A₁ ⊓ … ⊓ Aₙ ⊑ B      A ⊑ ∃r.B      ∃r.A ⊑ B
//! ```
//!
//! Every class gets a context whose subsumer set is closed under the
//! completion rules; existential conclusions link contexts together, and
//! role inclusions, transitivity and binary chains act on those links.
//! The taxonomy is then read off the subsumer sets without any tableau
//! test.

use crate::builder::{empty_taxonomy, TaxonomyBuilder};
use crate::oracle::SubsumptionOracle;
use crate::taxonomy::{NodeIndex, Taxonomy};
use mimizuku_core::{Concept, Name, RBox, ReasonerError, Result, Role, TBox};
use mimizuku_tableau::ReasoningContext;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

const FRESH_PREFIX: &str = "urn:mimizuku:el#";
const CHECKPOINT_INTERVAL: usize = 1024;

fn is_basic(concept: &Concept) -> bool {
    concept.is_top() || concept.is_bottom() || concept.as_atom().is_some()
}

fn is_fresh(name: &Name) -> bool {
    name.as_str().starts_with(FRESH_PREFIX)
}

fn unsupported(concept: &Concept) -> ReasonerError {
    ReasonerError::Unsupported(format!("{concept} is outside EL"))
}

#[derive(Debug, Default)]
struct Normalizer {
    told: HashMap<Concept, Vec<Concept>>,
    /// Indexed by each conjunct.
    conjunctions: HashMap<Concept, Vec<(Vec<Concept>, Concept)>>,
    /// `A ⊑ ∃r.B`, indexed by `A`.
    existentials: HashMap<Concept, Vec<(Role, Concept)>>,
    /// `∃r.A ⊑ B`, indexed by `A`.
    restrictions: HashMap<Concept, Vec<(Role, Concept)>>,
    lhs_names: HashMap<Concept, Concept>,
    rhs_names: HashMap<Concept, Concept>,
    fresh: usize,
}

impl Normalizer {
    fn fresh(&mut self) -> Concept {
        self.fresh += 1;
        Concept::atom(format!("{FRESH_PREFIX}{}", self.fresh))
    }

    fn inclusion(&mut self, sub: &Concept, sup: &Concept) -> Result<()> {
        if sup.is_top() || sub.is_bottom() {
            return Ok(());
        }
        if let Some(operands) = sup.as_and() {
            for operand in operands {
                self.inclusion(sub, operand)?;
            }
            return Ok(());
        }
        // C ⊑ ¬B is C ⊓ B ⊑ ⊥
        if let Some(name) = sup.as_negated_atom() {
            let conjunction = Concept::and([sub.clone(), Concept::atom(name.clone())]);
            return self.inclusion(&conjunction, &Concept::bottom());
        }
        if let Some((role, filler)) = sup.as_some() {
            let role = role.clone();
            let filler = self.rhs_name(&filler)?;
            let sub = self.lhs_name(sub)?;
            self.existentials.entry(sub).or_default().push((role, filler));
            return Ok(());
        }
        if !is_basic(sup) {
            return Err(unsupported(sup));
        }

        if is_basic(sub) {
            self.told.entry(sub.clone()).or_default().push(sup.clone());
            return Ok(());
        }
        if let Some(operands) = sub.as_and() {
            let mut names = operands
                .iter()
                .map(|operand| self.lhs_name(operand))
                .collect::<Result<Vec<_>>>()?;
            names.sort();
            names.dedup();
            for name in &names {
                self.conjunctions
                    .entry(name.clone())
                    .or_default()
                    .push((names.clone(), sup.clone()));
            }
            return Ok(());
        }
        if let Some((role, filler)) = sub.as_some() {
            let role = role.clone();
            let filler = self.lhs_name(&filler)?;
            self.restrictions.entry(filler).or_default().push((role, sup.clone()));
            return Ok(());
        }
        Err(unsupported(sub))
    }

    /// A basic concept implied by `concept`.
    fn lhs_name(&mut self, concept: &Concept) -> Result<Concept> {
        if is_basic(concept) {
            return Ok(concept.clone());
        }
        if let Some(name) = self.lhs_names.get(concept) {
            return Ok(name.clone());
        }
        let name = self.fresh();
        self.lhs_names.insert(concept.clone(), name.clone());
        self.inclusion(concept, &name)?;
        Ok(name)
    }

    /// A basic concept implying `concept`.
    fn rhs_name(&mut self, concept: &Concept) -> Result<Concept> {
        if is_basic(concept) {
            return Ok(concept.clone());
        }
        if let Some(name) = self.rhs_names.get(concept) {
            return Ok(name.clone());
        }
        let name = self.fresh();
        self.rhs_names.insert(concept.clone(), name.clone());
        self.inclusion(&name, concept)?;
        Ok(name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElStatistics {
    pub contexts: usize,
    pub subsumers: usize,
    pub links: usize,
    pub fresh_names: usize,
}

#[derive(Debug, Default)]
struct Context {
    subsumers: HashSet<Concept>,
    successors: HashSet<(Role, usize)>,
    predecessors: HashSet<(Role, usize)>,
}

enum Work {
    Subsumer(usize, Concept),
    Link(usize, Role, usize),
}

struct Saturation<'a> {
    rules: &'a Normalizer,
    rbox: &'a RBox,
    ranges: HashMap<Role, Vec<Concept>>,
    /// `r ∘ t ⊑ u` as `r → (t, u)`.
    by_first: HashMap<Role, Vec<(Role, Role)>>,
    /// `q ∘ r ⊑ u` as `r → (q, u)`.
    by_second: HashMap<Role, Vec<(Role, Role)>>,
    contexts: Vec<Context>,
    index: HashMap<Concept, usize>,
    queue: VecDeque<Work>,
    links: usize,
}

impl<'a> Saturation<'a> {
    fn new(rules: &'a Normalizer, rbox: &'a RBox, ranges: HashMap<Role, Vec<Concept>>) -> Self {
        let mut by_first: HashMap<Role, Vec<(Role, Role)>> = HashMap::new();
        let mut by_second: HashMap<Role, Vec<(Role, Role)>> = HashMap::new();
        let mut compositions: BTreeSet<(Role, Role, Role)> = BTreeSet::new();
        for role in rbox.roles() {
            if rbox.is_transitive(&role) {
                compositions.insert((role.clone(), role.clone(), role.clone()));
            }
            for chain in rbox.chains(&role) {
                if let [first, second] = chain.as_slice() {
                    compositions.insert((first.clone(), second.clone(), role.clone()));
                }
            }
        }
        for (first, second, sup) in compositions {
            by_first.entry(first.clone()).or_default().push((second.clone(), sup.clone()));
            by_second.entry(second).or_default().push((first, sup));
        }

        Self {
            rules,
            rbox,
            ranges,
            by_first,
            by_second,
            contexts: Vec::new(),
            index: HashMap::new(),
            queue: VecDeque::new(),
            links: 0,
        }
    }

    fn context(&mut self, key: Concept) -> usize {
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = self.contexts.len();
        self.contexts.push(Context::default());
        self.index.insert(key.clone(), id);
        match key.as_and() {
            Some(operands) => {
                for operand in operands {
                    self.queue.push_back(Work::Subsumer(id, operand.clone()));
                }
            }
            None => self.queue.push_back(Work::Subsumer(id, key.clone())),
        }
        self.queue.push_back(Work::Subsumer(id, Concept::top()));
        id
    }

    /// The filler of `∃role.filler` together with the ranges of `role`.
    fn target(&self, role: &Role, filler: &Concept) -> Concept {
        let mut conjuncts = vec![filler.clone()];
        for sup in self.rbox.super_roles(role) {
            if let Some(ranges) = self.ranges.get(sup) {
                conjuncts.extend(ranges.iter().cloned());
            }
        }
        Concept::and(conjuncts)
    }

    fn run(&mut self, oracle: &dyn SubsumptionOracle) -> Result<()> {
        let mut steps = 0usize;
        while let Some(work) = self.queue.pop_front() {
            steps += 1;
            if steps % CHECKPOINT_INTERVAL == 0 {
                oracle.checkpoint()?;
            }
            match work {
                Work::Subsumer(x, concept) => self.add_subsumer(x, concept),
                Work::Link(x, role, y) => self.add_link(x, &role, y),
            }
        }
        Ok(())
    }

    fn add_subsumer(&mut self, x: usize, concept: Concept) {
        if !self.contexts[x].subsumers.insert(concept.clone()) {
            return;
        }
        if concept.is_bottom() {
            for (_, p) in &self.contexts[x].predecessors {
                self.queue.push_back(Work::Subsumer(*p, Concept::bottom()));
            }
            return;
        }

        let rules = self.rules;
        for sup in rules.told.get(&concept).into_iter().flatten() {
            self.queue.push_back(Work::Subsumer(x, sup.clone()));
        }
        for (operands, sup) in rules.conjunctions.get(&concept).into_iter().flatten() {
            let subsumers = &self.contexts[x].subsumers;
            if operands.iter().all(|o| subsumers.contains(o)) {
                self.queue.push_back(Work::Subsumer(x, sup.clone()));
            }
        }
        for (role, filler) in rules.existentials.get(&concept).into_iter().flatten() {
            let key = self.target(role, filler);
            let y = self.context(key);
            self.queue.push_back(Work::Link(x, role.clone(), y));
        }
        for (role, sup) in rules.restrictions.get(&concept).into_iter().flatten() {
            for (r, p) in &self.contexts[x].predecessors {
                if r == role {
                    self.queue.push_back(Work::Subsumer(*p, sup.clone()));
                }
            }
        }
    }

    fn add_link(&mut self, x: usize, role: &Role, y: usize) {
        let rbox = self.rbox;
        let rules = self.rules;
        for sup in rbox.super_roles(role) {
            if !self.contexts[x].successors.insert((sup.clone(), y)) {
                continue;
            }
            self.contexts[y].predecessors.insert((sup.clone(), x));
            self.links += 1;

            if self.contexts[y].subsumers.contains(&Concept::bottom()) {
                self.queue.push_back(Work::Subsumer(x, Concept::bottom()));
            }
            for concept in &self.contexts[y].subsumers {
                for (r, conclusion) in rules.restrictions.get(concept).into_iter().flatten() {
                    if r == sup {
                        self.queue.push_back(Work::Subsumer(x, conclusion.clone()));
                    }
                }
            }
            for (second, composed) in self.by_first.get(sup).into_iter().flatten() {
                for (r, z) in &self.contexts[y].successors {
                    if r == second {
                        self.queue.push_back(Work::Link(x, composed.clone(), *z));
                    }
                }
            }
            for (first, composed) in self.by_second.get(sup).into_iter().flatten() {
                for (r, w) in &self.contexts[x].predecessors {
                    if r == first {
                        self.queue.push_back(Work::Link(*w, composed.clone(), y));
                    }
                }
            }
        }
    }

    fn subsumers(&self, concept: &Concept) -> Option<&HashSet<Concept>> {
        self.index.get(concept).map(|&id| &self.contexts[id].subsumers)
    }
}

#[derive(Debug)]
pub struct ElClassifier {
    tbox: Arc<TBox>,
    rbox: Arc<RBox>,
    stats: ElStatistics,
}

impl ElClassifier {
    pub fn new(tbox: Arc<TBox>, rbox: Arc<RBox>) -> Self {
        Self {
            tbox,
            rbox,
            stats: ElStatistics::default(),
        }
    }

    pub fn from_context(ctx: &ReasoningContext) -> Self {
        Self::new(ctx.tbox.clone(), ctx.rbox.clone())
    }

    pub fn statistics(&self) -> ElStatistics {
        self.stats
    }

    fn normalize(&self) -> Result<(Normalizer, HashMap<Role, Vec<Concept>>)> {
        let mut normalizer = Normalizer::default();
        for inclusion in self.tbox.inclusions() {
            normalizer.inclusion(&inclusion.sub, &inclusion.sup)?;
        }
        let mut ranges: HashMap<Role, Vec<Concept>> = HashMap::new();
        for role in self.rbox.roles() {
            for domain in self.rbox.domains(&role) {
                normalizer.inclusion(&Concept::some(role.clone(), Concept::top()), &domain.concept)?;
            }
            for range in self.rbox.ranges(&role) {
                let name = normalizer.rhs_name(&range.concept)?;
                if !name.is_top() {
                    ranges.entry(role.clone()).or_default().push(name);
                }
            }
        }
        Ok((normalizer, ranges))
    }
}

impl TaxonomyBuilder for ElClassifier {
    fn name(&self) -> &'static str {
        "el"
    }

    fn classify(&mut self, oracle: &mut dyn SubsumptionOracle) -> Result<Taxonomy<Name>> {
        let (rules, ranges) = self.normalize()?;
        let classes: Vec<Name> = self
            .tbox
            .classes()
            .iter()
            .filter(|c| **c != Name::thing() && **c != Name::nothing())
            .cloned()
            .collect();
        info!(classes = classes.len(), fresh = rules.fresh, "EL saturation started");

        let mut saturation = Saturation::new(&rules, &self.rbox, ranges);
        saturation.context(Concept::top());
        for class in &classes {
            saturation.context(Concept::atom(class.clone()));
        }
        saturation.run(oracle)?;

        self.stats = ElStatistics {
            contexts: saturation.contexts.len(),
            subsumers: saturation.contexts.iter().map(|c| c.subsumers.len()).sum(),
            links: saturation.links,
            fresh_names: rules.fresh,
        };
        debug!(stats = ?self.stats, "EL saturation finished");

        let taxonomy = read_taxonomy(&saturation, &classes);
        info!(nodes = taxonomy.node_count(), "EL classification finished");
        Ok(taxonomy)
    }
}

fn read_taxonomy(saturation: &Saturation<'_>, classes: &[Name]) -> Taxonomy<Name> {
    let mut taxonomy = empty_taxonomy();
    let empty = HashSet::new();
    let top_subsumers = saturation.subsumers(&Concept::top()).unwrap_or(&empty);
    let everything_unsatisfiable = top_subsumers.contains(&Concept::bottom());

    let mut supers: HashMap<Name, BTreeSet<Name>> = HashMap::new();
    for class in classes {
        let subsumers = saturation.subsumers(&Concept::atom(class.clone())).unwrap_or(&empty);
        if everything_unsatisfiable || subsumers.contains(&Concept::bottom()) {
            taxonomy.add_equivalent(class.clone(), taxonomy.bottom());
        } else if top_subsumers.contains(&Concept::atom(class.clone())) {
            taxonomy.add_equivalent(class.clone(), taxonomy.top());
        } else {
            let named = subsumers
                .iter()
                .filter_map(|s| s.as_atom())
                .filter(|n| !is_fresh(n) && *n != class && !top_subsumers.contains(&Concept::atom((*n).clone())))
                .cloned()
                .collect();
            supers.insert(class.clone(), named);
        }
    }

    // strict supers have strictly fewer subsumers, so they go in first
    let mut pending: Vec<&Name> = supers.keys().collect();
    pending.sort_by_key(|c| (supers[*c].len(), (*c).clone()));
    for class in pending {
        if taxonomy.contains(class) {
            continue;
        }
        let all = &supers[class];
        let is_equivalent = |other: &Name| supers.get(other).map(|s| s.contains(class)).unwrap_or(false);
        let strict: Vec<&Name> = all.iter().filter(|s| !is_equivalent(s)).collect();
        let mut direct: BTreeSet<NodeIndex> = BTreeSet::new();
        for candidate in &strict {
            let redundant = strict.iter().any(|other| {
                other != candidate
                    && supers.get(*other).map(|s| s.contains(*candidate)).unwrap_or(false)
                    && !is_equivalent_pair(&supers, other, candidate)
            });
            if !redundant {
                if let Some(node) = taxonomy.node_of(candidate) {
                    direct.insert(node);
                }
            }
        }
        if direct.is_empty() {
            direct.insert(taxonomy.top());
        }
        let direct: Vec<NodeIndex> = direct.into_iter().collect();
        let node = taxonomy.add_node(class.clone(), &direct, &[taxonomy.bottom()]);
        for equivalent in all.iter().filter(|s| is_equivalent(s)) {
            taxonomy.add_equivalent(equivalent.clone(), node);
        }
    }
    taxonomy
}

fn is_equivalent_pair(supers: &HashMap<Name, BTreeSet<Name>>, a: &Name, b: &Name) -> bool {
    let holds = |x: &Name, y: &Name| supers.get(x).map(|s| s.contains(y)).unwrap_or(false);
    holds(a, b) && holds(b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cd::CdOptimizedTaxonomyBuilder;
    use crate::oracle::TableauOracle;
    use mimizuku_core::{Axiom, ClassExpression as CE, Ontology, PropertyExpression, ReasoningBudget};
    use mimizuku_tableau::{TableauConfig, TableauReasoner};

    fn n(s: &str) -> Name {
        Name::new(format!("ex:{s}"))
    }

    fn c(s: &str) -> CE {
        CE::named(n(s))
    }

    fn p(s: &str) -> PropertyExpression {
        PropertyExpression::object(n(s))
    }

    fn sub(a: CE, b: CE) -> Axiom {
        Axiom::SubClassOf(a, b)
    }

    fn reasoner(axioms: Vec<Axiom>) -> TableauReasoner {
        let mut ontology = Ontology::new();
        ontology.add_axioms(axioms);
        TableauReasoner::from_ontology(&ontology, TableauConfig::default()).unwrap()
    }

    fn classify_el(axioms: Vec<Axiom>) -> Result<Taxonomy<Name>> {
        let mut reasoner = reasoner(axioms);
        let mut classifier = ElClassifier::from_context(reasoner.context());
        let budget = ReasoningBudget::unlimited();
        let mut oracle = TableauOracle::new(&mut reasoner, &budget);
        classifier.classify(&mut oracle)
    }

    #[test]
    fn existential_restriction_on_the_left() {
        let t = classify_el(vec![
            sub(c("A"), CE::some(p("r"), c("B"))),
            sub(c("B"), c("C")),
            sub(CE::some(p("r"), c("C")), c("D")),
        ])
        .unwrap();
        assert_eq!(t.is_subsumed_by(&n("A"), &n("D")), Some(true));
        assert_eq!(t.is_subsumed_by(&n("B"), &n("D")), Some(false));
    }

    #[test]
    fn conjunctions_and_equivalences() {
        let t = classify_el(vec![
            sub(c("A"), c("B")),
            sub(c("A"), c("C")),
            sub(CE::IntersectionOf(vec![c("B"), c("C")]), c("D")),
            Axiom::EquivalentClasses(vec![c("D"), c("E")]),
        ])
        .unwrap();
        assert_eq!(t.supers(&n("A"), true), BTreeSet::from([n("B"), n("C"), n("D"), n("E")]));
        assert_eq!(t.is_equivalent(&n("D"), &n("E")), Some(true));
        assert_eq!(t.is_subsumed_by(&n("A"), &n("D")), Some(true));
        assert_eq!(t.supers(&n("D"), true), BTreeSet::from([Name::thing()]));
    }

    #[test]
    fn transitive_roles_compose_links() {
        let t = classify_el(vec![
            Axiom::TransitiveProperty(p("partOf")),
            sub(c("Finger"), CE::some(p("partOf"), c("Hand"))),
            sub(c("Hand"), CE::some(p("partOf"), c("Arm"))),
            sub(CE::some(p("partOf"), c("Arm")), c("ArmPart")),
        ])
        .unwrap();
        assert_eq!(t.is_subsumed_by(&n("Finger"), &n("ArmPart")), Some(true));
        assert_eq!(t.is_subsumed_by(&n("Hand"), &n("ArmPart")), Some(true));
    }

    #[test]
    fn role_hierarchy_domains_and_ranges() {
        let t = classify_el(vec![
            Axiom::SubPropertyOf(p("s"), p("r")),
            Axiom::PropertyDomain(p("r"), c("D")),
            Axiom::PropertyRange(p("r"), c("R")),
            sub(c("A"), CE::some(p("s"), c("B"))),
            sub(CE::some(p("r"), CE::IntersectionOf(vec![c("B"), c("R")])), c("E")),
        ])
        .unwrap();
        assert_eq!(t.is_subsumed_by(&n("A"), &n("D")), Some(true));
        assert_eq!(t.is_subsumed_by(&n("A"), &n("E")), Some(true));
        assert_eq!(t.is_subsumed_by(&n("B"), &n("R")), Some(false));
    }

    #[test]
    fn bottom_flows_to_predecessors() {
        let t = classify_el(vec![
            sub(c("B"), CE::Nothing),
            sub(c("A"), CE::some(p("r"), c("B"))),
            sub(c("C"), c("D")),
        ])
        .unwrap();
        assert_eq!(t.is_equivalent(&n("A"), &Name::nothing()), Some(true));
        assert_eq!(t.is_equivalent(&n("B"), &Name::nothing()), Some(true));
        assert_eq!(t.is_equivalent(&n("C"), &Name::nothing()), Some(false));
    }

    #[test]
    fn universal_restrictions_are_rejected() {
        let err = classify_el(vec![sub(c("A"), CE::all(p("r"), c("B")))]).unwrap_err();
        assert!(matches!(err, ReasonerError::Unsupported(_)));
    }

    #[test]
    fn agrees_with_top_and_bottom_search() {
        let axioms = vec![
            sub(c("Dog"), c("Animal")),
            sub(c("Puppy"), CE::IntersectionOf(vec![c("Dog"), CE::some(p("age"), c("Young"))])),
            Axiom::EquivalentClasses(vec![
                c("YoungAnimal"),
                CE::IntersectionOf(vec![c("Animal"), CE::some(p("age"), c("Young"))]),
            ]),
            Axiom::PropertyDomain(p("owns"), c("Owner")),
            sub(c("Breeder"), CE::some(p("owns"), c("Dog"))),
        ];
        let el = classify_el(axioms.clone()).unwrap();

        let mut reasoner = reasoner(axioms);
        let mut builder = CdOptimizedTaxonomyBuilder::from_context(reasoner.context());
        let budget = ReasoningBudget::unlimited();
        let mut oracle = TableauOracle::new(&mut reasoner, &budget);
        let cd = builder.classify(&mut oracle).unwrap();

        assert_eq!(el, cd);
        assert_eq!(el.is_subsumed_by(&n("Puppy"), &n("YoungAnimal")), Some(true));
        assert_eq!(el.is_subsumed_by(&n("Breeder"), &n("Owner")), Some(true));
    }
}

//! Realization: the most specific classes of every named individual.

use crate::oracle::{concept_of, SubsumptionOracle};
use crate::taxonomy::{NodeIndex, Taxonomy};
use mimizuku_core::{Concept, Name, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceMap {
    most_specific: BTreeMap<Name, BTreeSet<Name>>,
    types: BTreeMap<Name, BTreeSet<Name>>,
}

impl InstanceMap {
    pub fn individuals(&self) -> impl Iterator<Item = &Name> {
        self.types.keys()
    }

    /// Classes of `individual` with no realized sub class.
    pub fn most_specific(&self, individual: &Name) -> Option<&BTreeSet<Name>> {
        self.most_specific.get(individual)
    }

    /// Every named class of `individual`, `owl:Thing` excluded.
    pub fn types(&self, individual: &Name) -> Option<&BTreeSet<Name>> {
        self.types.get(individual)
    }

    pub fn instances(&self, class: &Name) -> BTreeSet<Name> {
        self.types
            .iter()
            .filter(|(_, types)| types.contains(class))
            .map(|(individual, _)| individual.clone())
            .collect()
    }

    pub fn direct_instances(&self, class: &Name) -> BTreeSet<Name> {
        self.most_specific
            .iter()
            .filter(|(_, classes)| classes.contains(class))
            .map(|(individual, _)| individual.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Walks the taxonomy top-down for each individual. Obvious types and
/// their ancestors start marked as members, obvious non-types and their
/// descendants as non-members; everything else costs an instance check.
pub fn realize(taxonomy: &Taxonomy<Name>, oracle: &mut dyn SubsumptionOracle) -> Result<InstanceMap> {
    let individuals = oracle.individuals();
    info!(individuals = individuals.len(), "realization started");

    let mut map = InstanceMap::default();
    if !individuals.is_empty() && !oracle.is_satisfiable(&Concept::top())? {
        // Inconsistent: every individual is an instance of every class.
        let bottom: BTreeSet<Name> = taxonomy.node(taxonomy.bottom()).equivalents().iter().cloned().collect();
        let mut all: BTreeSet<Name> = taxonomy.elements().cloned().collect();
        all.remove(&Name::thing());
        for individual in individuals {
            map.most_specific.insert(individual.clone(), bottom.clone());
            map.types.insert(individual, all.clone());
        }
        info!(individuals = map.len(), "realization of an inconsistent ontology");
        return Ok(map);
    }
    for individual in individuals {
        oracle.checkpoint()?;
        let mut walk = Walk {
            taxonomy,
            individual: &individual,
            marks: HashMap::new(),
            expanded: HashSet::new(),
            most_specific: BTreeSet::new(),
            checks: 0,
        };
        walk.seed(oracle);
        walk.visit(taxonomy.top(), oracle)?;

        let mut types = BTreeSet::new();
        let mut most_specific = BTreeSet::new();
        for &node in &walk.most_specific {
            most_specific.extend(taxonomy.node(node).equivalents().iter().cloned());
            types.extend(taxonomy.node(node).equivalents().iter().cloned());
            for sup in taxonomy.super_nodes(node, false) {
                types.extend(taxonomy.node(sup).equivalents().iter().cloned());
            }
        }
        types.remove(&Name::thing());
        debug!(individual = %individual, checks = walk.checks, types = types.len(), "realized");

        map.most_specific.insert(individual.clone(), most_specific);
        map.types.insert(individual, types);
    }
    info!(individuals = map.len(), "realization finished");
    Ok(map)
}

struct Walk<'a> {
    taxonomy: &'a Taxonomy<Name>,
    individual: &'a Name,
    marks: HashMap<NodeIndex, bool>,
    expanded: HashSet<NodeIndex>,
    most_specific: BTreeSet<NodeIndex>,
    checks: usize,
}

impl Walk<'_> {
    fn seed(&mut self, oracle: &mut dyn SubsumptionOracle) {
        let taxonomy = self.taxonomy;
        self.marks.insert(taxonomy.top(), true);
        self.marks.insert(taxonomy.bottom(), false);
        for class in oracle.obvious_types(self.individual) {
            let Some(node) = taxonomy.node_of(&class) else {
                continue;
            };
            self.marks.insert(node, true);
            for sup in taxonomy.super_nodes(node, false) {
                self.marks.insert(sup, true);
            }
        }
        for class in oracle.obvious_non_types(self.individual) {
            let Some(node) = taxonomy.node_of(&class) else {
                continue;
            };
            self.marks.entry(node).or_insert(false);
            for sub in taxonomy.sub_nodes(node, false) {
                self.marks.entry(sub).or_insert(false);
            }
        }
    }

    /// Whether the individual belongs to `node`; records `node` as most
    /// specific when no sub class holds it.
    fn visit(&mut self, node: NodeIndex, oracle: &mut dyn SubsumptionOracle) -> Result<bool> {
        let member = match self.marks.get(&node) {
            Some(&known) => known,
            None => {
                self.checks += 1;
                let class = concept_of(self.taxonomy.node(node).name());
                let member = oracle.is_instance_of(self.individual, &class)?;
                self.marks.insert(node, member);
                if !member {
                    for sub in self.taxonomy.sub_nodes(node, false) {
                        self.marks.entry(sub).or_insert(false);
                    }
                }
                member
            }
        };
        if !member || !self.expanded.insert(node) {
            return Ok(member);
        }

        let mut found = false;
        let subs: Vec<NodeIndex> = self.taxonomy.node(node).subs().iter().copied().collect();
        for sub in subs {
            if self.visit(sub, oracle)? {
                found = true;
            }
        }
        if !found {
            self.most_specific.insert(node);
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TaxonomyBuilder;
    use crate::cd::CdOptimizedTaxonomyBuilder;
    use crate::oracle::TableauOracle;
    use mimizuku_core::{Axiom, ClassExpression as CE, Ontology, PropertyExpression, ReasoningBudget};
    use mimizuku_tableau::{TableauConfig, TableauReasoner};

    fn n(s: &str) -> Name {
        Name::new(format!("ex:{s}"))
    }

    fn realized(axioms: Vec<Axiom>) -> InstanceMap {
        let mut ontology = Ontology::new();
        ontology.add_axioms(axioms);
        let mut reasoner = TableauReasoner::from_ontology(&ontology, TableauConfig::default()).unwrap();
        let budget = ReasoningBudget::unlimited();
        assert!(reasoner.is_consistent(&budget).unwrap());
        let mut builder = CdOptimizedTaxonomyBuilder::from_context(reasoner.context());
        let mut oracle = TableauOracle::new(&mut reasoner, &budget);
        let taxonomy = builder.classify(&mut oracle).unwrap();
        builder.realize(&taxonomy, &mut oracle).unwrap()
    }

    #[test]
    fn most_specific_types() {
        let r = PropertyExpression::object(n("r"));
        let map = realized(vec![
            Axiom::SubClassOf(CE::named(n("A")), CE::named(n("B"))),
            Axiom::EquivalentClasses(vec![CE::named(n("C")), CE::some(r.clone(), CE::named(n("B")))]),
            Axiom::ClassAssertion(CE::named(n("A")), n("i")),
            Axiom::ClassAssertion(CE::named(n("B")), n("j")),
            Axiom::ObjectPropertyAssertion(r, n("k"), n("i")),
        ]);

        assert_eq!(map.most_specific(&n("i")), Some(&BTreeSet::from([n("A")])));
        assert_eq!(map.types(&n("i")), Some(&BTreeSet::from([n("A"), n("B")])));
        assert_eq!(map.most_specific(&n("j")), Some(&BTreeSet::from([n("B")])));
        assert_eq!(map.types(&n("k")), Some(&BTreeSet::from([n("C")])));
        assert_eq!(map.instances(&n("B")), BTreeSet::from([n("i"), n("j")]));
        assert_eq!(map.direct_instances(&n("B")), BTreeSet::from([n("j")]));
    }

    #[test]
    fn inconsistent_ontology_types_everything() {
        let mut ontology = Ontology::new();
        ontology.add_axioms(vec![
            Axiom::SubClassOf(CE::named(n("A")), CE::named(n("B"))),
            Axiom::DisjointClasses(vec![CE::named(n("A")), CE::named(n("C"))]),
            Axiom::ClassAssertion(CE::named(n("A")), n("x")),
            Axiom::ClassAssertion(CE::named(n("C")), n("x")),
        ]);
        let mut reasoner = TableauReasoner::from_ontology(&ontology, TableauConfig::default()).unwrap();
        let budget = ReasoningBudget::unlimited();
        assert!(!reasoner.is_consistent(&budget).unwrap());
        let mut builder = CdOptimizedTaxonomyBuilder::from_context(reasoner.context());
        let mut oracle = TableauOracle::new(&mut reasoner, &budget);
        let taxonomy = builder.classify(&mut oracle).unwrap();
        let map = builder.realize(&taxonomy, &mut oracle).unwrap();

        assert!(map.most_specific(&n("x")).is_some_and(|m| m.contains(&Name::nothing())));
        assert!(map.types(&n("x")).is_some_and(|t| t.contains(&n("B")) && t.contains(&n("C"))));
    }

    #[test]
    fn untyped_individual_sits_at_top() {
        let map = realized(vec![
            Axiom::SubClassOf(CE::named(n("A")), CE::named(n("B"))),
            Axiom::ClassAssertion(CE::Thing, n("x")),
        ]);
        assert_eq!(map.most_specific(&n("x")), Some(&BTreeSet::from([Name::thing()])));
        assert!(map.types(&n("x")).is_some_and(|t| t.is_empty()));
    }
}

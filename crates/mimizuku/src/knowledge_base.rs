//! 知識ベース
//!
//! [`KnowledgeBase`] owns an ontology together with the derived reasoning
//! state: the retained ABox completion, the class taxonomy and the
//! realization. Mutations invalidate exactly the state they can affect.

use crate::config::ReasonerConfig;
use mimizuku_core::{
    Axiom, AxiomKind, CancellationFlag, ClassExpression, Expressivity, Name, Ontology, ReasonerError,
    ReasoningBudget, Result,
};
use mimizuku_tableau::{ReasoningContext, SatisfiabilityCheck, Statistics, TableauReasoner};
use mimizuku_taxonomy::{
    realize, BuildStatistics, CdOptimizedTaxonomyBuilder, ElClassifier, ElStatistics, InstanceMap, TableauOracle,
    Taxonomy, TaxonomyBuilder,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Outcome of a satisfiability test, with the final clash when the
/// concept is unsatisfiable.
pub type SatisfiabilityResult = SatisfiabilityCheck;

/// Counters accumulated over the lifetime of a knowledge base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReasoningStatistics {
    /// Tableau counters, including those of discarded completions.
    pub tableau: Statistics,
    pub cache_entries: usize,
    pub cache_hits: usize,
    pub cache_misses: usize,
    /// Completions built from the ontology.
    pub rebuilds: u64,
    /// ABox additions applied to a retained completion.
    pub incremental_updates: u64,
    pub classifications: u64,
    /// Last top/bottom-search classification.
    pub classification: Option<BuildStatistics>,
    /// Last EL saturation.
    pub el_classification: Option<ElStatistics>,
}

struct Classification {
    taxonomy: Taxonomy<Name>,
    /// Consistency verdict the taxonomy was computed under.
    consistent: bool,
    /// False after an ABox change until the verdict is checked again.
    verified: bool,
}

/// An ontology plus the reasoning state derived from it.
///
/// Every reasoning call runs under a fresh budget built from
/// [`ReasonerConfig::timeout_ms`] and the shared [`CancellationFlag`].
/// An interrupted call returns [`ReasonerError::Timeout`] or
/// [`ReasonerError::Cancelled`] and keeps the partial state, so a later
/// call resumes the same completion.
pub struct KnowledgeBase {
    config: ReasonerConfig,
    ontology: Ontology,
    reasoner: Option<TableauReasoner>,
    /// Terminology of the last discarded reasoner, still valid for the
    /// current TBox and RBox.
    context: Option<ReasoningContext>,
    classification: Option<Classification>,
    instances: Option<InstanceMap>,
    flag: CancellationFlag,
    retired: Statistics,
    stats: ReasoningStatistics,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new(ReasonerConfig::default())
    }
}

impl KnowledgeBase {
    pub fn new(config: ReasonerConfig) -> Self {
        Self::from_ontology(Ontology::new(), config)
    }

    pub fn from_ontology(ontology: Ontology, config: ReasonerConfig) -> Self {
        Self {
            config,
            ontology,
            reasoner: None,
            context: None,
            classification: None,
            instances: None,
            flag: CancellationFlag::new(),
            retired: Statistics::default(),
            stats: ReasoningStatistics::default(),
        }
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    pub fn ontology(&self) -> &Ontology {
        &self.ontology
    }

    /// Features used by the ontology. Builds the terminology if needed,
    /// which fails on a non-regular role hierarchy.
    pub fn expressivity(&mut self) -> Result<Expressivity> {
        Ok(self.reasoner()?.context().expressivity)
    }

    /// Flag polled by every reasoning call. A raised flag stays raised
    /// until [`CancellationFlag::reset`].
    pub fn cancellation(&self) -> CancellationFlag {
        self.flag.clone()
    }

    pub fn add_axiom(&mut self, axiom: Axiom) {
        let kind = axiom.kind();
        let signature = self.signature_len();
        self.ontology.add_axiom(axiom.clone());
        if kind != AxiomKind::ABox || self.signature_len() != signature {
            self.invalidate();
            return;
        }
        self.assertion_added(&axiom);
    }

    pub fn add_axioms<I: IntoIterator<Item = Axiom>>(&mut self, axioms: I) {
        for axiom in axioms {
            self.add_axiom(axiom);
        }
    }

    /// Removes one occurrence of `axiom`; returns whether it was present.
    /// Retracting an assertion rebuilds the completion on the next call.
    pub fn remove_axiom(&mut self, axiom: &Axiom) -> bool {
        if !self.ontology.remove_axiom(axiom) {
            return false;
        }
        if axiom.kind() != AxiomKind::ABox {
            self.invalidate();
            return true;
        }
        self.instances = None;
        if let Some(reasoner) = self.reasoner.as_mut() {
            reasoner.remove_assertion(axiom);
        }
        self.abox_changed();
        true
    }

    pub fn is_consistent(&mut self) -> Result<bool> {
        let budget = self.budget();
        self.reasoner()?.is_consistent(&budget)
    }

    pub fn is_satisfiable(&mut self, class: &ClassExpression) -> Result<bool> {
        Ok(self.satisfiability(class)?.satisfiable)
    }

    pub fn satisfiability(&mut self, class: &ClassExpression) -> Result<SatisfiabilityResult> {
        let budget = self.budget();
        let concept = class.to_concept();
        let check = self.reasoner()?.satisfiability(&concept, &budget)?;
        debug!(concept = %concept, satisfiable = check.satisfiable, cached = check.cached, "satisfiability");
        Ok(check)
    }

    /// `sub ⊑ sup`. Named classes are answered from the taxonomy once one
    /// exists.
    pub fn is_subclass_of(&mut self, sub: &ClassExpression, sup: &ClassExpression) -> Result<bool> {
        if let Some(known) = self.classified_answer(sub, sup, Taxonomy::is_subsumed_by) {
            return Ok(known);
        }
        let budget = self.budget();
        self.reasoner()?.is_subsumed_by(&sub.to_concept(), &sup.to_concept(), &budget)
    }

    pub fn is_equivalent(&mut self, a: &ClassExpression, b: &ClassExpression) -> Result<bool> {
        if let Some(known) = self.classified_answer(a, b, Taxonomy::is_equivalent) {
            return Ok(known);
        }
        Ok(self.is_subclass_of(a, b)? && self.is_subclass_of(b, a)?)
    }

    /// The class hierarchy of every named class. Recomputed only after a
    /// change that can affect it.
    pub fn classify(&mut self) -> Result<&Taxonomy<Name>> {
        let budget = self.budget();
        let use_el = self.config.use_el_classifier;
        let consistent = self.reasoner()?.is_consistent(&budget)?;
        let stale = match &mut self.classification {
            Some(classification) if classification.consistent == consistent => {
                classification.verified = true;
                false
            }
            _ => true,
        };

        if stale {
            self.classification = None;
            self.instances = None;
            let reasoner = self.reasoner()?;
            let expressivity = reasoner.context().expressivity;
            info!(
                classes = reasoner.context().tbox.classes().len(),
                expressivity = %expressivity,
                consistent,
                "classification started"
            );

            let built = if consistent && use_el && expressivity.is_el() {
                classify_el(reasoner, &budget)?
            } else {
                None
            };
            let (taxonomy, cd_stats, el_stats) = match built {
                Some((taxonomy, el_stats)) => (taxonomy, None, Some(el_stats)),
                None => {
                    let (taxonomy, cd_stats) = classify_cd(reasoner, &budget)?;
                    (taxonomy, Some(cd_stats), None)
                }
            };
            info!(nodes = taxonomy.node_count(), "classification finished");

            self.stats.classifications += 1;
            self.stats.classification = cd_stats;
            self.stats.el_classification = el_stats;
            self.classification = Some(Classification { taxonomy, consistent, verified: true });
        }
        match &self.classification {
            Some(classification) => Ok(&classification.taxonomy),
            None => Err(ReasonerError::internal("classification missing after build")),
        }
    }

    /// Most specific classes and all types of every named individual.
    /// Classifies first when the taxonomy is missing or stale.
    pub fn realize(&mut self) -> Result<&InstanceMap> {
        self.classify()?;
        if self.instances.is_none() {
            let budget = self.budget();
            let (Some(reasoner), Some(classification)) = (self.reasoner.as_mut(), self.classification.as_ref()) else {
                return Err(ReasonerError::internal("realization without a classified knowledge base"));
            };
            let mut oracle = TableauOracle::new(reasoner, &budget);
            self.instances = Some(realize(&classification.taxonomy, &mut oracle)?);
        }
        match &self.instances {
            Some(instances) => Ok(instances),
            None => Err(ReasonerError::internal("realization missing after build")),
        }
    }

    /// Whether `individual` is an instance of `class`. Named classes are
    /// answered from the realization once one exists.
    pub fn is_instance_of(&mut self, individual: &Name, class: &ClassExpression) -> Result<bool> {
        if let (Some(instances), ClassExpression::Named(name)) = (&self.instances, class) {
            if let Some(types) = instances.types(individual) {
                return Ok(types.contains(name));
            }
        }
        let budget = self.budget();
        self.reasoner()?.is_instance_of(individual, &class.to_concept(), &budget)
    }

    pub fn statistics(&self) -> ReasoningStatistics {
        let mut stats = self.stats;
        stats.tableau = self.retired;
        if let Some(reasoner) = &self.reasoner {
            stats.tableau += reasoner.statistics();
            let cache = &reasoner.context().cache;
            stats.cache_entries = cache.len();
            stats.cache_hits = cache.hits();
            stats.cache_misses = cache.misses();
        }
        stats
    }

    /// Size of the ontology and run counters as JSON.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "version": crate::VERSION,
            "axioms": self.ontology.axioms.len(),
            "classes": self.ontology.classes.len(),
            "individuals": self.ontology.individuals.len(),
            "classified": self.classification.is_some(),
            "realized": self.instances.is_some(),
            "statistics": self.statistics(),
        })
    }

    fn budget(&self) -> ReasoningBudget {
        self.config.budget(&self.flag)
    }

    fn signature_len(&self) -> usize {
        self.ontology.classes.len() + self.ontology.object_properties.len() + self.ontology.data_properties.len()
    }

    fn expressivity_built(&self) -> Option<Expressivity> {
        self.reasoner
            .as_ref()
            .map(|reasoner| reasoner.context().expressivity)
            .or_else(|| self.context.as_ref().map(|ctx| ctx.expressivity))
    }

    /// An assertion over known vocabulary was added.
    fn assertion_added(&mut self, axiom: &Axiom) {
        self.instances = None;
        let Some(expressivity) = self.expressivity_built() else {
            return;
        };
        if !expressivity.covers(&Expressivity::of_axiom(axiom)) {
            debug!(?axiom, "assertion raises expressivity, rebuilding");
            self.invalidate();
            return;
        }
        if self.config.use_incremental_consistency {
            if let Some(reasoner) = self.reasoner.as_mut().filter(|r| !r.needs_rebuild()) {
                match reasoner.add_assertion(axiom) {
                    Ok(()) => {
                        self.stats.incremental_updates += 1;
                        self.abox_changed();
                        return;
                    }
                    Err(err) => warn!(error = %err, "incremental update failed, rebuilding"),
                }
            }
        }
        self.retire_reasoner();
        self.abox_changed();
    }

    /// Clears what an ABox change can invalidate beyond the completion.
    /// With nominals, concept satisfiability depends on the ABox.
    fn abox_changed(&mut self) {
        if let Some(classification) = &mut self.classification {
            classification.verified = false;
        }
        let nominals = self.expressivity_built().is_some_and(|e| e.nominals);
        if !nominals {
            return;
        }
        self.classification = None;
        if let Some(reasoner) = &self.reasoner {
            reasoner.context().cache.clear();
        }
        if let Some(ctx) = &self.context {
            ctx.cache.clear();
        }
    }

    /// Drops the completion but keeps its terminology for the next build.
    fn retire_reasoner(&mut self) {
        if let Some(reasoner) = self.reasoner.take() {
            self.retired += reasoner.statistics();
            self.context = Some(reasoner.context().clone());
        }
    }

    /// Drops all derived state after a TBox or RBox change.
    fn invalidate(&mut self) {
        if let Some(reasoner) = self.reasoner.take() {
            self.retired += reasoner.statistics();
        }
        self.context = None;
        self.classification = None;
        self.instances = None;
    }

    fn reasoner(&mut self) -> Result<&mut TableauReasoner> {
        if self.reasoner.as_ref().is_some_and(TableauReasoner::needs_rebuild) {
            self.retire_reasoner();
        }
        let reasoner = match self.reasoner.take() {
            Some(reasoner) => reasoner,
            None => {
                let ctx = match self.context.take() {
                    Some(ctx) => ctx,
                    None => ReasoningContext::from_ontology(&self.ontology, self.config.tableau())?,
                };
                self.stats.rebuilds += 1;
                debug!(axioms = self.ontology.axioms.len(), rebuilds = self.stats.rebuilds, "building completion");
                TableauReasoner::new(ctx, &self.ontology)?
            }
        };
        Ok(self.reasoner.insert(reasoner))
    }

    fn classified_answer(
        &self,
        a: &ClassExpression,
        b: &ClassExpression,
        query: fn(&Taxonomy<Name>, &Name, &Name) -> Option<bool>,
    ) -> Option<bool> {
        let classification = self.classification.as_ref().filter(|c| c.verified)?;
        let (a, b) = (named(a)?, named(b)?);
        query(&classification.taxonomy, &a, &b)
    }
}

fn named(class: &ClassExpression) -> Option<Name> {
    match class {
        ClassExpression::Named(name) => Some(name.clone()),
        ClassExpression::Thing => Some(Name::thing()),
        ClassExpression::Nothing => Some(Name::nothing()),
        _ => None,
    }
}

fn classify_el(
    reasoner: &mut TableauReasoner,
    budget: &ReasoningBudget,
) -> Result<Option<(Taxonomy<Name>, ElStatistics)>> {
    let mut builder = ElClassifier::from_context(reasoner.context());
    let mut oracle = TableauOracle::new(reasoner, budget);
    match builder.classify(&mut oracle) {
        Ok(taxonomy) => Ok(Some((taxonomy, builder.statistics()))),
        Err(ReasonerError::Unsupported(what)) => {
            warn!(%what, "EL saturation declined, falling back to tableau classification");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

fn classify_cd(reasoner: &mut TableauReasoner, budget: &ReasoningBudget) -> Result<(Taxonomy<Name>, BuildStatistics)> {
    let mut builder = CdOptimizedTaxonomyBuilder::from_context(reasoner.context());
    let mut oracle = TableauOracle::new(reasoner, budget);
    let taxonomy = builder.classify(&mut oracle)?;
    Ok((taxonomy, builder.statistics()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimizuku_core::PropertyExpression;
    use std::collections::BTreeSet;

    fn n(s: &str) -> Name {
        Name::new(format!("ex:{s}"))
    }

    fn c(s: &str) -> ClassExpression {
        ClassExpression::named(n(s))
    }

    fn kb(axioms: Vec<Axiom>) -> KnowledgeBase {
        let mut kb = KnowledgeBase::default();
        kb.add_axioms(axioms);
        kb
    }

    #[test]
    fn test_subclass_and_realization() {
        let mut kb = kb(vec![
            Axiom::SubClassOf(c("A"), c("B")),
            Axiom::ClassAssertion(c("A"), n("i")),
        ]);
        assert!(kb.is_consistent().unwrap());
        assert!(kb.is_satisfiable(&c("A")).unwrap());
        assert!(kb.is_subclass_of(&c("A"), &c("B")).unwrap());
        assert!(!kb.is_subclass_of(&c("B"), &c("A")).unwrap());

        let taxonomy = kb.classify().unwrap();
        assert_eq!(taxonomy.supers(&n("A"), true), BTreeSet::from([n("B")]));

        let instances = kb.realize().unwrap();
        assert_eq!(instances.types(&n("i")), Some(&BTreeSet::from([n("A"), n("B")])));
        assert!(kb.is_instance_of(&n("i"), &c("B")).unwrap());
    }

    #[test]
    fn test_el_routing_and_fallback() {
        let r = PropertyExpression::object(n("r"));
        let mut el = kb(vec![Axiom::SubClassOf(c("A"), ClassExpression::some(r.clone(), c("B")))]);
        el.classify().unwrap();
        assert!(el.statistics().el_classification.is_some());

        let mut dl = kb(vec![Axiom::SubClassOf(c("A"), ClassExpression::all(r, c("B")))]);
        dl.classify().unwrap();
        let stats = dl.statistics();
        assert!(stats.el_classification.is_none());
        assert!(stats.classification.is_some());
    }

    #[test]
    fn test_satisfiability_witness() {
        let mut kb = kb(vec![Axiom::SubClassOf(c("A"), ClassExpression::not(c("A")))]);
        let result = kb.satisfiability(&c("A")).unwrap();
        assert!(!result.satisfiable);
        assert!(result.cached || result.witness.is_some());
        assert!(kb.is_satisfiable(&c("B")).unwrap());
    }

    #[test]
    fn test_incremental_assertions_reuse_completion() {
        let mut kb = kb(vec![
            Axiom::DisjointClasses(vec![c("C"), c("D")]),
            Axiom::ClassAssertion(c("C"), n("x")),
        ]);
        assert!(kb.is_consistent().unwrap());
        kb.add_axiom(Axiom::ClassAssertion(c("C"), n("y")));
        assert!(kb.is_consistent().unwrap());
        kb.add_axiom(Axiom::ClassAssertion(c("D"), n("x")));
        assert!(!kb.is_consistent().unwrap());

        let stats = kb.statistics();
        assert_eq!(stats.rebuilds, 1);
        assert_eq!(stats.incremental_updates, 2);

        assert!(kb.remove_axiom(&Axiom::ClassAssertion(c("D"), n("x"))));
        assert!(kb.is_consistent().unwrap());
        assert_eq!(kb.statistics().rebuilds, 2);
        assert!(!kb.remove_axiom(&Axiom::ClassAssertion(c("D"), n("x"))));
    }

    #[test]
    fn test_new_vocabulary_rebuilds_terminology() {
        let mut kb = kb(vec![Axiom::ClassAssertion(c("A"), n("x"))]);
        assert!(kb.is_consistent().unwrap());
        kb.add_axiom(Axiom::ClassAssertion(c("Z"), n("x")));
        assert!(kb.classify().unwrap().contains(&n("Z")));
    }

    #[test]
    fn test_tbox_change_reclassifies() {
        let mut kb = kb(vec![Axiom::SubClassOf(c("A"), c("B")), Axiom::SubClassOf(c("C"), c("B"))]);
        assert_eq!(kb.classify().unwrap().supers(&n("C"), true), BTreeSet::from([n("B")]));
        kb.add_axiom(Axiom::SubClassOf(c("C"), c("A")));
        assert_eq!(kb.classify().unwrap().supers(&n("C"), true), BTreeSet::from([n("A")]));
        assert_eq!(kb.statistics().classifications, 2);

        kb.classify().unwrap();
        assert_eq!(kb.statistics().classifications, 2);
    }

    #[test]
    fn test_inconsistency_collapses_taxonomy() {
        let mut kb = kb(vec![
            Axiom::SubClassOf(c("A"), c("B")),
            Axiom::DisjointClasses(vec![c("A"), c("C")]),
            Axiom::ClassAssertion(c("A"), n("x")),
        ]);
        assert!(!kb.classify().unwrap().is_equivalent(&n("A"), &Name::nothing()).unwrap());
        kb.add_axiom(Axiom::ClassAssertion(c("C"), n("x")));
        assert!(kb.classify().unwrap().is_equivalent(&n("B"), &Name::nothing()).unwrap());
    }

    #[test]
    fn test_cancellation_interrupts_and_resumes() {
        let mut kb = kb(vec![
            Axiom::SubClassOf(c("A"), c("B")),
            Axiom::ClassAssertion(c("A"), n("i")),
        ]);
        let flag = kb.cancellation();
        flag.cancel();
        assert!(kb.is_consistent().unwrap_err().is_interrupt());
        flag.reset();
        assert!(kb.is_consistent().unwrap());
    }

    #[test]
    fn test_summary() {
        let mut kb = kb(vec![Axiom::SubClassOf(c("A"), c("B"))]);
        kb.classify().unwrap();
        let summary = kb.summary();
        assert_eq!(summary["version"], crate::VERSION);
        assert_eq!(summary["axioms"], 1);
        assert_eq!(summary["classified"], true);
        assert_eq!(summary["statistics"]["classifications"], 1);
    }

    #[test]
    fn test_unknown_individual() {
        let mut kb = kb(vec![Axiom::ClassAssertion(c("A"), n("i"))]);
        assert!(matches!(
            kb.is_instance_of(&n("nobody"), &c("A")),
            Err(ReasonerError::UnknownIndividual(_))
        ));
    }
}

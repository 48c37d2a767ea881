//! Reasoning services on top of the completion strategy.
//!
//! The reasoner keeps one ABox strategy alive across calls. Concept tests
//! run on a fresh single-root graph, or on a copy of the completed ABox
//! graph when the ontology uses nominals.

use crate::cache::Bool3;
use crate::clash::Clash;
use crate::context::{ReasoningContext, TableauConfig};
use crate::strategy::{CompletionOutcome, CompletionStrategy, Statistics};
use mimizuku_core::{Axiom, Concept, Name, Ontology, RBox, ReasonerError, ReasoningBudget, Result, Role};
use std::sync::Arc;
use tracing::{debug, info};

/// Answer of a satisfiability test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SatisfiabilityCheck {
    pub satisfiable: bool,
    /// Final clash of a failed run. Absent for cached answers.
    pub witness: Option<Clash>,
    pub cached: bool,
}

impl SatisfiabilityCheck {
    fn from_outcome(outcome: CompletionOutcome) -> Self {
        match outcome {
            CompletionOutcome::Complete => Self { satisfiable: true, witness: None, cached: false },
            CompletionOutcome::Clashed(clash) => Self {
                satisfiable: false,
                witness: Some(clash),
                cached: false,
            },
        }
    }

    fn cached(satisfiable: bool) -> Self {
        Self { satisfiable, witness: None, cached: true }
    }
}

#[derive(Debug, Clone)]
pub struct TableauReasoner {
    ctx: ReasoningContext,
    abox: CompletionStrategy,
    consistent: Option<bool>,
    /// Statistics of concept tests and instance checks.
    stats: Statistics,
}

impl TableauReasoner {
    pub fn new(ctx: ReasoningContext, ontology: &Ontology) -> Result<Self> {
        let abox = CompletionStrategy::for_abox(ctx.clone(), ontology)?;
        Ok(Self {
            ctx,
            abox,
            consistent: None,
            stats: Statistics::default(),
        })
    }

    pub fn from_ontology(ontology: &Ontology, config: TableauConfig) -> Result<Self> {
        Self::new(ReasoningContext::from_ontology(ontology, config)?, ontology)
    }

    pub fn context(&self) -> &ReasoningContext {
        &self.ctx
    }

    pub fn abox(&self) -> &CompletionStrategy {
        &self.abox
    }

    pub fn statistics(&self) -> Statistics {
        let mut stats = self.stats;
        stats += self.abox.statistics();
        stats
    }

    /// Applies an ABox assertion to the retained state. The next
    /// consistency check resumes from there.
    pub fn add_assertion(&mut self, axiom: &Axiom) -> Result<()> {
        self.abox.apply_axiom(axiom)?;
        self.consistent = None;
        Ok(())
    }

    pub fn remove_assertion(&mut self, axiom: &Axiom) {
        self.abox.record_deletion(axiom);
        self.consistent = None;
    }

    /// A retraction is pending; the owner must rebuild from the ontology.
    pub fn needs_rebuild(&self) -> bool {
        self.abox.tracker().has_deletions()
    }

    pub fn is_consistent(&mut self, budget: &ReasoningBudget) -> Result<bool> {
        if let Some(consistent) = self.consistent {
            return Ok(consistent);
        }
        if self.needs_rebuild() {
            return Err(ReasonerError::internal(
                "consistency requested with a pending retraction",
            ));
        }
        info!(state = ?self.abox.state(), "consistency check started");
        let outcome = self.abox.run(budget)?;
        let consistent = outcome.is_complete();
        info!(
            consistent,
            nodes = self.abox.graph().live_count(),
            branches = self.abox.statistics().branches,
            "consistency check finished"
        );
        self.consistent = Some(consistent);
        Ok(consistent)
    }

    /// Final clash of an inconsistent ABox.
    pub fn inconsistency_witness(&self) -> Option<&Clash> {
        self.abox.witness()
    }

    /// Satisfiability of `concept` with the clash that refuted it. An
    /// interrupted test leaves no partial state behind.
    pub fn satisfiability(&mut self, concept: &Concept, budget: &ReasoningBudget) -> Result<SatisfiabilityCheck> {
        if !self.is_consistent(budget)? {
            return Ok(SatisfiabilityCheck {
                satisfiable: false,
                witness: self.abox.witness().cloned(),
                cached: false,
            });
        }
        if self.ctx.config.use_cache {
            if let Some(satisfiable) = self.ctx.cache.is_satisfiable(concept) {
                debug!(concept = %concept, satisfiable, "cache hit");
                return Ok(SatisfiabilityCheck::cached(satisfiable));
            }
        }

        let ctx = self.context_for(concept)?;
        let mut strategy = if self.ctx.expressivity.nominals {
            let mut strategy = CompletionStrategy::for_concept_on(&self.abox, concept);
            strategy.ctx = ctx;
            strategy
        } else {
            CompletionStrategy::for_concept(ctx, concept)
        };
        let outcome = strategy.run(budget);
        self.stats += strategy.statistics();
        let check = SatisfiabilityCheck::from_outcome(outcome?);
        if self.ctx.expressivity.nominals && self.ctx.config.use_cache {
            self.ctx.cache.put_sat(concept, check.satisfiable, None)?;
        }
        Ok(check)
    }

    /// The context for a test on `concept`. Roles the ontology never
    /// mentions but `concept` restricts to a data filler are declared as
    /// data roles, so their successors are literals.
    fn context_for(&self, concept: &Concept) -> Result<ReasoningContext> {
        let undeclared: Vec<Role> = concept
            .data_roles()
            .into_iter()
            .filter(|role| self.ctx.rbox.info(role).is_none())
            .collect();
        if undeclared.is_empty() {
            return Ok(self.ctx.clone());
        }
        let mut rbox = RBox::clone(&self.ctx.rbox);
        for role in &undeclared {
            debug!(role = %role, "declaring data role from query");
            rbox.declare(role, true);
        }
        rbox.prepare()?;
        let mut ctx = self.ctx.clone();
        ctx.rbox = Arc::new(rbox);
        Ok(ctx)
    }

    pub fn is_satisfiable(&mut self, concept: &Concept, budget: &ReasoningBudget) -> Result<bool> {
        Ok(self.satisfiability(concept, budget)?.satisfiable)
    }

    /// `sub ⊑ sup`: told and cached shortcuts, then model merging, then
    /// unsatisfiability of `sub ⊓ ¬sup`.
    pub fn is_subsumed_by(&mut self, sub: &Concept, sup: &Concept, budget: &ReasoningBudget) -> Result<bool> {
        if sub == sup || sup.is_top() || sub.is_bottom() {
            return Ok(true);
        }
        if let (Some(a), Some(b)) = (sub.as_atom(), sup.as_atom()) {
            if self.ctx.tbox.told_subsumers(a).any(|n| n == b) {
                return Ok(true);
            }
        }
        if !self.is_consistent(budget)? {
            return Ok(true);
        }
        if self.ctx.config.use_cache && self.ctx.cache.is_satisfiable(sub) == Some(false) {
            return Ok(true);
        }
        if self.ctx.config.use_model_merging && self.ctx.config.use_cache && !self.ctx.expressivity.nominals {
            let negated = sup.negate();
            if self.ctx.cache.is_mergable(&self.ctx.rbox, sub, &negated) == Bool3::True {
                debug!(sub = %sub, sup = %sup, "models merge, not subsumed");
                return Ok(false);
            }
        }
        let test = Concept::and([sub.clone(), sup.negate()]);
        Ok(!self.is_satisfiable(&test, budget)?)
    }

    /// Whether `individual` is an instance of `concept`: obvious types
    /// first, then a copy of the ABox with `¬concept` asserted.
    pub fn is_instance_of(&mut self, individual: &Name, concept: &Concept, budget: &ReasoningBudget) -> Result<bool> {
        if !self.is_consistent(budget)? {
            return Ok(true);
        }
        if self.abox.individual_node(individual).is_none() {
            return Err(ReasonerError::UnknownIndividual(individual.to_string()));
        }
        if concept.is_top() || self.abox.obvious_types(individual).contains(concept) {
            return Ok(true);
        }
        let mut copy = self.abox.clone();
        copy.ctx = self.context_for(concept)?;
        copy.stats = Statistics::default();
        copy.add_concept_assertion(individual, concept.negate());
        let outcome = copy.run(budget);
        self.stats += copy.statistics();
        Ok(!outcome?.is_complete())
    }

    /// Named classes in independent labels of `individual`.
    pub fn obvious_types(&self, individual: &Name) -> Vec<Name> {
        self.abox
            .obvious_types(individual)
            .iter()
            .filter_map(|c| c.as_atom().cloned())
            .collect()
    }

    /// Named classes `individual` certainly lacks, read off independent
    /// negated atoms.
    pub fn obvious_non_types(&self, individual: &Name) -> Vec<Name> {
        self.abox
            .obvious_types(individual)
            .iter()
            .filter_map(|c| c.as_negated_atom().cloned())
            .collect()
    }

    /// Named individuals known to the ABox, sorted.
    pub fn individuals(&self) -> Vec<Name> {
        let mut names: Vec<Name> = self.abox.graph().individuals().map(|(n, _)| n.clone()).collect();
        names.sort();
        names
    }
}

//! Reasoning services the builders consult.

use mimizuku_core::{Concept, Name, ReasoningBudget, Result};
use mimizuku_tableau::TableauReasoner;

/// Satisfiability, subsumption and instance tests over one ontology.
pub trait SubsumptionOracle {
    /// Fails once the caller's time budget or cancellation flag runs out.
    fn checkpoint(&self) -> Result<()>;

    fn is_satisfiable(&mut self, concept: &Concept) -> Result<bool>;

    fn is_subsumed_by(&mut self, sub: &Concept, sup: &Concept) -> Result<bool>;

    fn individuals(&self) -> Vec<Name>;

    /// Named classes an individual belongs to without further search.
    fn obvious_types(&self, individual: &Name) -> Vec<Name>;

    /// Named classes an individual is known not to belong to.
    fn obvious_non_types(&self, individual: &Name) -> Vec<Name>;

    fn is_instance_of(&mut self, individual: &Name, concept: &Concept) -> Result<bool>;
}

/// Answers through a [`TableauReasoner`] under one budget.
pub struct TableauOracle<'a> {
    reasoner: &'a mut TableauReasoner,
    budget: &'a ReasoningBudget,
}

impl<'a> TableauOracle<'a> {
    pub fn new(reasoner: &'a mut TableauReasoner, budget: &'a ReasoningBudget) -> Self {
        Self { reasoner, budget }
    }
}

impl SubsumptionOracle for TableauOracle<'_> {
    fn checkpoint(&self) -> Result<()> {
        self.budget.check()
    }

    fn is_satisfiable(&mut self, concept: &Concept) -> Result<bool> {
        self.reasoner.is_satisfiable(concept, self.budget)
    }

    fn is_subsumed_by(&mut self, sub: &Concept, sup: &Concept) -> Result<bool> {
        self.reasoner.is_subsumed_by(sub, sup, self.budget)
    }

    fn individuals(&self) -> Vec<Name> {
        self.reasoner.individuals()
    }

    fn obvious_types(&self, individual: &Name) -> Vec<Name> {
        self.reasoner.obvious_types(individual)
    }

    fn obvious_non_types(&self, individual: &Name) -> Vec<Name> {
        self.reasoner.obvious_non_types(individual)
    }

    fn is_instance_of(&mut self, individual: &Name, concept: &Concept) -> Result<bool> {
        self.reasoner.is_instance_of(individual, concept, self.budget)
    }
}

/// `owl:Thing` and `owl:Nothing` map to `⊤` and `⊥`.
pub(crate) fn concept_of(name: &Name) -> Concept {
    if *name == Name::thing() {
        Concept::top()
    } else if *name == Name::nothing() {
        Concept::bottom()
    } else {
        Concept::atom(name.clone())
    }
}

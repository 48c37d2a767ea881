//! 表現力 (expressivity) の検出
//!
//! Flags for the DL features an ontology actually uses. The tableau picks
//! its blocking and cache-safety policies from these, and the facade uses
//! [`Expressivity::is_el`] to route classification.

use crate::model::{Axiom, ClassExpression, Ontology, PropertyExpression};
use crate::rbox::RBox;
use crate::tbox::TBox;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expressivity {
    pub negation: bool,
    pub disjunction: bool,
    pub universal: bool,
    pub existential: bool,
    pub inverse: bool,
    pub nominals: bool,
    pub cardinality: bool,
    pub functionality: bool,
    pub transitivity: bool,
    pub complex_role_inclusions: bool,
    pub role_hierarchy: bool,
    pub reflexivity: bool,
    pub datatypes: bool,
    pub gci: bool,
    pub abox: bool,
    /// A chain longer than two roles.
    pub long_chains: bool,
}

impl Expressivity {
    pub fn from_ontology(ontology: &Ontology, rbox: &RBox, tbox: &TBox) -> Expressivity {
        let mut expressivity = Expressivity::default();
        for axiom in &ontology.axioms {
            expressivity.visit_axiom(axiom);
        }
        expressivity.gci = !tbox.is_unfoldable();
        expressivity.long_chains = rbox.max_chain_length() > 2;
        expressivity
    }

    /// Flags raised by `axiom` alone.
    pub fn of_axiom(axiom: &Axiom) -> Expressivity {
        let mut expressivity = Expressivity::default();
        expressivity.visit_axiom(axiom);
        expressivity
    }

    /// Whether every feature used by `other` is already used here.
    pub fn covers(&self, other: &Expressivity) -> bool {
        let pairs = [
            (self.negation, other.negation),
            (self.disjunction, other.disjunction),
            (self.universal, other.universal),
            (self.existential, other.existential),
            (self.inverse, other.inverse),
            (self.nominals, other.nominals),
            (self.cardinality, other.cardinality),
            (self.functionality, other.functionality),
            (self.transitivity, other.transitivity),
            (self.complex_role_inclusions, other.complex_role_inclusions),
            (self.role_hierarchy, other.role_hierarchy),
            (self.reflexivity, other.reflexivity),
            (self.datatypes, other.datatypes),
            (self.gci, other.gci),
            (self.abox, other.abox),
            (self.long_chains, other.long_chains),
        ];
        pairs.iter().all(|&(ours, theirs)| ours || !theirs)
    }

    fn visit_property(&mut self, property: &PropertyExpression) {
        match property {
            PropertyExpression::InverseOf(_) => self.inverse = true,
            PropertyExpression::DataProperty(_) => self.datatypes = true,
            PropertyExpression::ObjectProperty(_) => {}
        }
    }

    fn visit_class(&mut self, class: &ClassExpression) {
        match class {
            ClassExpression::Named(_) | ClassExpression::Thing | ClassExpression::Nothing => {}
            ClassExpression::IntersectionOf(classes) => {
                classes.iter().for_each(|c| self.visit_class(c));
            }
            ClassExpression::UnionOf(classes) => {
                self.disjunction = true;
                classes.iter().for_each(|c| self.visit_class(c));
            }
            ClassExpression::ComplementOf(inner) => {
                self.negation = true;
                self.visit_class(inner);
            }
            ClassExpression::OneOf(individuals) => {
                self.nominals = true;
                if individuals.len() > 1 {
                    self.disjunction = true;
                }
            }
            ClassExpression::SomeValuesFrom { property, class } => {
                self.existential = true;
                self.visit_property(property);
                self.visit_class(class);
            }
            ClassExpression::AllValuesFrom { property, class } => {
                self.universal = true;
                self.visit_property(property);
                self.visit_class(class);
            }
            ClassExpression::HasValue { property, .. } => {
                self.existential = true;
                self.nominals = true;
                self.visit_property(property);
            }
            ClassExpression::HasSelf(property) => {
                self.reflexivity = true;
                self.visit_property(property);
            }
            ClassExpression::MinCardinality { property, class, .. }
            | ClassExpression::MaxCardinality { property, class, .. }
            | ClassExpression::ExactCardinality { property, class, .. } => {
                self.cardinality = true;
                self.visit_property(property);
                if let Some(class) = class {
                    self.visit_class(class);
                }
            }
            ClassExpression::DataSomeValuesFrom { .. }
            | ClassExpression::DataAllValuesFrom { .. }
            | ClassExpression::DataHasValue { .. } => self.datatypes = true,
        }
    }

    fn visit_axiom(&mut self, axiom: &Axiom) {
        for class in axiom.class_expressions() {
            self.visit_class(class);
        }
        for property in axiom.properties() {
            self.visit_property(property);
        }
        match axiom {
            Axiom::DisjointUnion(..) => self.disjunction = true,
            Axiom::SubPropertyOf(..) | Axiom::EquivalentProperties(_) => self.role_hierarchy = true,
            Axiom::SubPropertyChainOf(..) => {
                self.role_hierarchy = true;
                self.complex_role_inclusions = true;
            }
            Axiom::InverseProperties(..) | Axiom::SymmetricProperty(_) => self.inverse = true,
            Axiom::FunctionalProperty(_) => self.functionality = true,
            Axiom::InverseFunctionalProperty(_) => {
                self.functionality = true;
                self.inverse = true;
            }
            Axiom::TransitiveProperty(_) => self.transitivity = true,
            Axiom::ReflexiveProperty(_) => self.reflexivity = true,
            Axiom::IrreflexiveProperty(_) | Axiom::AsymmetricProperty(_) | Axiom::DisjointProperties(_) => {
                self.reflexivity = true;
                self.negation = true;
            }
            Axiom::DataPropertyRange(..) => self.datatypes = true,
            Axiom::ClassAssertion(..) | Axiom::ObjectPropertyAssertion(..) => self.abox = true,
            Axiom::SameIndividual(_) | Axiom::DifferentIndividuals(_) => {
                self.abox = true;
                self.nominals = true;
            }
            Axiom::NegativeObjectPropertyAssertion(..) => {
                self.abox = true;
                self.negation = true;
            }
            Axiom::DataPropertyAssertion(..) | Axiom::NegativeDataPropertyAssertion(..) => {
                self.abox = true;
                self.datatypes = true;
            }
            _ => {}
        }
    }

    /// EL profile with role hierarchy, transitivity and binary chains.
    pub fn is_el(&self) -> bool {
        !(self.negation
            || self.disjunction
            || self.universal
            || self.inverse
            || self.nominals
            || self.cardinality
            || self.functionality
            || self.reflexivity
            || self.datatypes
            || self.long_chains)
    }

    /// Number restrictions or functionality together with inverse roles.
    pub fn has_inverse_counting(&self) -> bool {
        self.inverse && (self.cardinality || self.functionality)
    }
}

impl fmt::Display for Expressivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_el() {
            let plus = self.role_hierarchy || self.transitivity || self.complex_role_inclusions;
            return write!(f, "EL{}", if plus { "++" } else { "" });
        }
        let mut name = String::from(if self.transitivity { "S" } else { "ALC" });
        if self.complex_role_inclusions {
            name.push('R');
        } else if self.role_hierarchy {
            name.push('H');
        }
        if self.nominals {
            name.push('O');
        }
        if self.inverse {
            name.push('I');
        }
        if self.cardinality {
            name.push('Q');
        } else if self.functionality {
            name.push('F');
        }
        if self.datatypes {
            name.push_str("(D)");
        }
        f.write_str(&name)
    }
}

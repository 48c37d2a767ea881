//! OWL 2 DL データモデル
//!
//! Authoring-side class/property expressions, axioms and ontologies. These
//! are plain serde trees; [`ClassExpression::to_concept`] turns them into
//! interned [`Concept`]s for the reasoner.

use crate::literal::Literal;
use crate::name::Name;
use crate::term::{Concept, Role};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// OWL property expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyExpression {
    /// Object property
    ObjectProperty(Name),

    /// Data property
    DataProperty(Name),

    /// Inverse property: R⁻
    InverseOf(Box<PropertyExpression>),
}

impl PropertyExpression {
    pub fn object(name: impl Into<Name>) -> Self {
        PropertyExpression::ObjectProperty(name.into())
    }

    pub fn data(name: impl Into<Name>) -> Self {
        PropertyExpression::DataProperty(name.into())
    }

    pub fn inverse_of(property: PropertyExpression) -> Self {
        PropertyExpression::InverseOf(Box::new(property))
    }

    pub fn name(&self) -> &Name {
        match self {
            PropertyExpression::ObjectProperty(name) | PropertyExpression::DataProperty(name) => name,
            PropertyExpression::InverseOf(inner) => inner.name(),
        }
    }

    pub fn is_data(&self) -> bool {
        match self {
            PropertyExpression::DataProperty(_) => true,
            PropertyExpression::ObjectProperty(_) => false,
            PropertyExpression::InverseOf(inner) => inner.is_data(),
        }
    }

    pub fn to_role(&self) -> Role {
        match self {
            PropertyExpression::ObjectProperty(name) | PropertyExpression::DataProperty(name) => {
                Role::new(name.clone())
            }
            PropertyExpression::InverseOf(inner) => inner.to_role().inverse(),
        }
    }
}

/// Data range over literal values
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataRange {
    Datatype(Name),
    OneOf(Vec<Literal>),
    ComplementOf(Box<DataRange>),
    IntersectionOf(Vec<DataRange>),
    UnionOf(Vec<DataRange>),
}

impl DataRange {
    pub fn to_concept(&self) -> Concept {
        match self {
            DataRange::Datatype(name) => Concept::datatype(name.clone()),
            DataRange::OneOf(values) => Concept::or(values.iter().cloned().map(Concept::value)),
            DataRange::ComplementOf(inner) => inner.to_concept().negate(),
            DataRange::IntersectionOf(ranges) => Concept::and(ranges.iter().map(|r| r.to_concept())),
            DataRange::UnionOf(ranges) => Concept::or(ranges.iter().map(|r| r.to_concept())),
        }
    }
}

/// OWL class expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassExpression {
    /// Named class
    Named(Name),

    /// owl:Thing (⊤)
    Thing,

    /// owl:Nothing (⊥)
    Nothing,

    /// C1 ⊓ C2 ⊓ ... ⊓ Cn
    IntersectionOf(Vec<ClassExpression>),

    /// C1 ⊔ C2 ⊔ ... ⊔ Cn
    UnionOf(Vec<ClassExpression>),

    /// ¬C
    ComplementOf(Box<ClassExpression>),

    /// {i1, i2, ..., in}
    OneOf(Vec<Name>),

    /// ∃R.C
    SomeValuesFrom {
        property: PropertyExpression,
        class: Box<ClassExpression>,
    },

    /// ∀R.C
    AllValuesFrom {
        property: PropertyExpression,
        class: Box<ClassExpression>,
    },

    /// ∃R.{i}
    HasValue {
        property: PropertyExpression,
        individual: Name,
    },

    /// ∃R.Self
    HasSelf(PropertyExpression),

    /// ≥n R.C
    MinCardinality {
        cardinality: u32,
        property: PropertyExpression,
        class: Option<Box<ClassExpression>>, // None means owl:Thing
    },

    /// ≤n R.C
    MaxCardinality {
        cardinality: u32,
        property: PropertyExpression,
        class: Option<Box<ClassExpression>>,
    },

    /// =n R.C
    ExactCardinality {
        cardinality: u32,
        property: PropertyExpression,
        class: Option<Box<ClassExpression>>,
    },

    /// ∃U.D
    DataSomeValuesFrom { property: Name, range: DataRange },

    /// ∀U.D
    DataAllValuesFrom { property: Name, range: DataRange },

    /// ∃U.{v}
    DataHasValue { property: Name, value: Literal },
}

impl ClassExpression {
    pub fn named(name: impl Into<Name>) -> Self {
        ClassExpression::Named(name.into())
    }

    pub fn not(class: ClassExpression) -> Self {
        ClassExpression::ComplementOf(Box::new(class))
    }

    pub fn some(property: PropertyExpression, class: ClassExpression) -> Self {
        ClassExpression::SomeValuesFrom {
            property,
            class: Box::new(class),
        }
    }

    pub fn all(property: PropertyExpression, class: ClassExpression) -> Self {
        ClassExpression::AllValuesFrom {
            property,
            class: Box::new(class),
        }
    }

    pub fn min(cardinality: u32, property: PropertyExpression, class: Option<ClassExpression>) -> Self {
        ClassExpression::MinCardinality {
            cardinality,
            property,
            class: class.map(Box::new),
        }
    }

    pub fn max(cardinality: u32, property: PropertyExpression, class: Option<ClassExpression>) -> Self {
        ClassExpression::MaxCardinality {
            cardinality,
            property,
            class: class.map(Box::new),
        }
    }

    /// Normalizes into the reasoner's interned form.
    pub fn to_concept(&self) -> Concept {
        fn filler(class: &Option<Box<ClassExpression>>) -> Concept {
            class.as_ref().map(|c| c.to_concept()).unwrap_or_else(Concept::top)
        }

        match self {
            ClassExpression::Named(name) => Concept::atom(name.clone()),
            ClassExpression::Thing => Concept::top(),
            ClassExpression::Nothing => Concept::bottom(),
            ClassExpression::IntersectionOf(classes) => {
                Concept::and(classes.iter().map(|c| c.to_concept()))
            }
            ClassExpression::UnionOf(classes) => Concept::or(classes.iter().map(|c| c.to_concept())),
            ClassExpression::ComplementOf(class) => class.to_concept().negate(),
            ClassExpression::OneOf(individuals) => Concept::one_of(individuals.iter().cloned()),
            ClassExpression::SomeValuesFrom { property, class } => {
                Concept::some(property.to_role(), class.to_concept())
            }
            ClassExpression::AllValuesFrom { property, class } => {
                Concept::all(property.to_role(), class.to_concept())
            }
            ClassExpression::HasValue { property, individual } => {
                Concept::has_value(property.to_role(), individual.clone())
            }
            ClassExpression::HasSelf(property) => Concept::has_self(property.to_role()),
            ClassExpression::MinCardinality { cardinality, property, class } => {
                Concept::min(*cardinality, property.to_role(), filler(class))
            }
            ClassExpression::MaxCardinality { cardinality, property, class } => {
                Concept::max(*cardinality, property.to_role(), filler(class))
            }
            ClassExpression::ExactCardinality { cardinality, property, class } => {
                Concept::exactly(*cardinality, property.to_role(), filler(class))
            }
            ClassExpression::DataSomeValuesFrom { property, range } => {
                Concept::some(Role::new(property.clone()), range.to_concept())
            }
            ClassExpression::DataAllValuesFrom { property, range } => {
                Concept::all(Role::new(property.clone()), range.to_concept())
            }
            ClassExpression::DataHasValue { property, value } => {
                Concept::some(Role::new(property.clone()), Concept::value(value.clone()))
            }
        }
    }

    /// True for the constructors of the EL profile (⊤, ⊥, atoms, ⊓, ∃).
    pub fn is_el(&self) -> bool {
        match self {
            ClassExpression::Named(_) | ClassExpression::Thing | ClassExpression::Nothing => true,
            ClassExpression::IntersectionOf(classes) => classes.iter().all(|c| c.is_el()),
            ClassExpression::SomeValuesFrom { property, class } => {
                matches!(property, PropertyExpression::ObjectProperty(_)) && class.is_el()
            }
            _ => false,
        }
    }
}

impl From<&ClassExpression> for Concept {
    fn from(class: &ClassExpression) -> Concept {
        class.to_concept()
    }
}

/// Identifier of an asserted axiom: its position in the ontology.
pub type AxiomId = usize;

/// OWL 2 DL axiom
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axiom {
    SubClassOf(ClassExpression, ClassExpression),
    EquivalentClasses(Vec<ClassExpression>),
    DisjointClasses(Vec<ClassExpression>),
    DisjointUnion(Name, Vec<ClassExpression>),

    SubPropertyOf(PropertyExpression, PropertyExpression),
    /// R1 ∘ … ∘ Rn ⊑ S
    SubPropertyChainOf(Vec<PropertyExpression>, PropertyExpression),
    EquivalentProperties(Vec<PropertyExpression>),
    InverseProperties(PropertyExpression, PropertyExpression),
    DisjointProperties(Vec<PropertyExpression>),
    PropertyDomain(PropertyExpression, ClassExpression),
    PropertyRange(PropertyExpression, ClassExpression),
    DataPropertyRange(Name, DataRange),
    FunctionalProperty(PropertyExpression),
    InverseFunctionalProperty(PropertyExpression),
    TransitiveProperty(PropertyExpression),
    SymmetricProperty(PropertyExpression),
    AsymmetricProperty(PropertyExpression),
    ReflexiveProperty(PropertyExpression),
    IrreflexiveProperty(PropertyExpression),

    SameIndividual(Vec<Name>),
    DifferentIndividuals(Vec<Name>),
    ClassAssertion(ClassExpression, Name),
    ObjectPropertyAssertion(PropertyExpression, Name, Name),
    NegativeObjectPropertyAssertion(PropertyExpression, Name, Name),
    DataPropertyAssertion(Name, Name, Literal),
    NegativeDataPropertyAssertion(Name, Name, Literal),
}

/// Which box an axiom belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxiomKind {
    TBox,
    RBox,
    ABox,
}

impl Axiom {
    pub fn kind(&self) -> AxiomKind {
        match self {
            Axiom::SubClassOf(..)
            | Axiom::EquivalentClasses(_)
            | Axiom::DisjointClasses(_)
            | Axiom::DisjointUnion(..) => AxiomKind::TBox,
            Axiom::SameIndividual(_)
            | Axiom::DifferentIndividuals(_)
            | Axiom::ClassAssertion(..)
            | Axiom::ObjectPropertyAssertion(..)
            | Axiom::NegativeObjectPropertyAssertion(..)
            | Axiom::DataPropertyAssertion(..)
            | Axiom::NegativeDataPropertyAssertion(..) => AxiomKind::ABox,
            _ => AxiomKind::RBox,
        }
    }

    /// Class expressions mentioned at the top level of this axiom.
    pub fn class_expressions(&self) -> Vec<&ClassExpression> {
        match self {
            Axiom::SubClassOf(sub, sup) => vec![sub, sup],
            Axiom::EquivalentClasses(classes)
            | Axiom::DisjointClasses(classes)
            | Axiom::DisjointUnion(_, classes) => classes.iter().collect(),
            Axiom::PropertyDomain(_, class)
            | Axiom::PropertyRange(_, class)
            | Axiom::ClassAssertion(class, _) => vec![class],
            _ => Vec::new(),
        }
    }

    pub fn properties(&self) -> Vec<&PropertyExpression> {
        match self {
            Axiom::SubPropertyOf(sub, sup) | Axiom::InverseProperties(sub, sup) => vec![sub, sup],
            Axiom::SubPropertyChainOf(chain, sup) => {
                let mut properties: Vec<&PropertyExpression> = chain.iter().collect();
                properties.push(sup);
                properties
            }
            Axiom::EquivalentProperties(properties) | Axiom::DisjointProperties(properties) => {
                properties.iter().collect()
            }
            Axiom::PropertyDomain(p, _)
            | Axiom::PropertyRange(p, _)
            | Axiom::FunctionalProperty(p)
            | Axiom::InverseFunctionalProperty(p)
            | Axiom::TransitiveProperty(p)
            | Axiom::SymmetricProperty(p)
            | Axiom::AsymmetricProperty(p)
            | Axiom::ReflexiveProperty(p)
            | Axiom::IrreflexiveProperty(p)
            | Axiom::ObjectPropertyAssertion(p, _, _)
            | Axiom::NegativeObjectPropertyAssertion(p, _, _) => vec![p],
            _ => Vec::new(),
        }
    }

    pub fn individuals(&self) -> Vec<&Name> {
        match self {
            Axiom::SameIndividual(individuals) | Axiom::DifferentIndividuals(individuals) => {
                individuals.iter().collect()
            }
            Axiom::ClassAssertion(_, i) => vec![i],
            Axiom::ObjectPropertyAssertion(_, a, b) | Axiom::NegativeObjectPropertyAssertion(_, a, b) => {
                vec![a, b]
            }
            Axiom::DataPropertyAssertion(_, i, _) | Axiom::NegativeDataPropertyAssertion(_, i, _) => {
                vec![i]
            }
            _ => Vec::new(),
        }
    }
}

/// OWL 2 DL ontology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ontology {
    /// Ontology IRI
    pub iri: Option<Name>,

    /// All axioms in the ontology, in insertion order
    pub axioms: Vec<Axiom>,

    /// Named classes mentioned
    pub classes: BTreeSet<Name>,

    /// Object properties mentioned
    pub object_properties: BTreeSet<Name>,

    /// Data properties mentioned
    pub data_properties: BTreeSet<Name>,

    /// Individuals mentioned, including those inside nominals
    pub individuals: BTreeSet<Name>,
}

impl Ontology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iri(iri: impl Into<Name>) -> Self {
        Self {
            iri: Some(iri.into()),
            ..Self::default()
        }
    }

    pub fn add_axiom(&mut self, axiom: Axiom) {
        self.collect_signature(&axiom);
        self.axioms.push(axiom);
    }

    pub fn add_axioms<I: IntoIterator<Item = Axiom>>(&mut self, axioms: I) {
        for axiom in axioms {
            self.add_axiom(axiom);
        }
    }

    /// Removes the first occurrence of `axiom`; returns whether it was present.
    pub fn remove_axiom(&mut self, axiom: &Axiom) -> bool {
        let Some(pos) = self.axioms.iter().position(|a| a == axiom) else {
            return false;
        };
        self.axioms.remove(pos);
        self.rebuild_signature();
        true
    }

    pub fn contains(&self, axiom: &Axiom) -> bool {
        self.axioms.contains(axiom)
    }

    pub fn axioms_of(&self, kind: AxiomKind) -> impl Iterator<Item = (AxiomId, &Axiom)> {
        self.axioms
            .iter()
            .enumerate()
            .filter(move |(_, axiom)| axiom.kind() == kind)
    }

    fn rebuild_signature(&mut self) {
        self.classes.clear();
        self.object_properties.clear();
        self.data_properties.clear();
        self.individuals.clear();
        let axioms = std::mem::take(&mut self.axioms);
        for axiom in &axioms {
            self.collect_signature(axiom);
        }
        self.axioms = axioms;
    }

    fn collect_signature(&mut self, axiom: &Axiom) {
        for class in axiom.class_expressions() {
            self.collect_class_expression(class);
        }
        for property in axiom.properties() {
            self.collect_property(property);
        }
        for individual in axiom.individuals() {
            self.individuals.insert(individual.clone());
        }
        match axiom {
            Axiom::DisjointUnion(name, _) => {
                self.classes.insert(name.clone());
            }
            Axiom::DataPropertyRange(name, _)
            | Axiom::DataPropertyAssertion(name, _, _)
            | Axiom::NegativeDataPropertyAssertion(name, _, _) => {
                self.data_properties.insert(name.clone());
            }
            _ => {}
        }
    }

    fn collect_property(&mut self, property: &PropertyExpression) {
        match property {
            PropertyExpression::ObjectProperty(name) => {
                self.object_properties.insert(name.clone());
            }
            PropertyExpression::DataProperty(name) => {
                self.data_properties.insert(name.clone());
            }
            PropertyExpression::InverseOf(inner) => self.collect_property(inner),
        }
    }

    fn collect_class_expression(&mut self, expr: &ClassExpression) {
        match expr {
            ClassExpression::Named(name) => {
                self.classes.insert(name.clone());
            }
            ClassExpression::Thing | ClassExpression::Nothing => {}
            ClassExpression::IntersectionOf(classes) | ClassExpression::UnionOf(classes) => {
                for class in classes {
                    self.collect_class_expression(class);
                }
            }
            ClassExpression::ComplementOf(class) => self.collect_class_expression(class),
            ClassExpression::OneOf(individuals) => {
                self.individuals.extend(individuals.iter().cloned());
            }
            ClassExpression::SomeValuesFrom { property, class }
            | ClassExpression::AllValuesFrom { property, class } => {
                self.collect_property(property);
                self.collect_class_expression(class);
            }
            ClassExpression::HasValue { property, individual } => {
                self.collect_property(property);
                self.individuals.insert(individual.clone());
            }
            ClassExpression::HasSelf(property) => self.collect_property(property),
            ClassExpression::MinCardinality { property, class, .. }
            | ClassExpression::MaxCardinality { property, class, .. }
            | ClassExpression::ExactCardinality { property, class, .. } => {
                self.collect_property(property);
                if let Some(class) = class {
                    self.collect_class_expression(class);
                }
            }
            ClassExpression::DataSomeValuesFrom { property, .. }
            | ClassExpression::DataAllValuesFrom { property, .. }
            | ClassExpression::DataHasValue { property, .. } => {
                self.data_properties.insert(property.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(s: &str) -> ClassExpression {
        ClassExpression::named(s)
    }

    #[test]
    fn test_add_axiom_collects_signature() {
        let mut ontology = Ontology::new();
        let r = PropertyExpression::object("ex:r");
        ontology.add_axiom(Axiom::SubClassOf(
            named("ex:A"),
            ClassExpression::some(r.clone(), named("ex:B")),
        ));
        ontology.add_axiom(Axiom::ClassAssertion(named("ex:A"), Name::new("ex:i")));
        ontology.add_axiom(Axiom::DataPropertyAssertion(
            Name::new("ex:age"),
            Name::new("ex:i"),
            Literal::integer(3),
        ));

        assert!(ontology.classes.contains(&Name::new("ex:A")));
        assert!(ontology.classes.contains(&Name::new("ex:B")));
        assert!(ontology.object_properties.contains(&Name::new("ex:r")));
        assert!(ontology.data_properties.contains(&Name::new("ex:age")));
        assert!(ontology.individuals.contains(&Name::new("ex:i")));
    }

    #[test]
    fn test_remove_axiom_rebuilds_signature() {
        let mut ontology = Ontology::new();
        let axiom = Axiom::SubClassOf(named("ex:A"), named("ex:B"));
        ontology.add_axiom(axiom.clone());
        ontology.add_axiom(Axiom::ClassAssertion(named("ex:A"), Name::new("ex:i")));
        assert!(ontology.remove_axiom(&axiom));
        assert!(!ontology.remove_axiom(&axiom));
        assert!(!ontology.classes.contains(&Name::new("ex:B")));
        assert!(ontology.classes.contains(&Name::new("ex:A")));
    }

    #[test]
    fn test_axiom_kinds() {
        assert_eq!(Axiom::SubClassOf(named("ex:A"), named("ex:B")).kind(), AxiomKind::TBox);
        assert_eq!(
            Axiom::TransitiveProperty(PropertyExpression::object("ex:r")).kind(),
            AxiomKind::RBox
        );
        assert_eq!(Axiom::SameIndividual(vec![Name::new("ex:a")]).kind(), AxiomKind::ABox);
    }

    #[test]
    fn test_to_concept_normalizes() {
        let r = PropertyExpression::object("ex:r");
        let expr = ClassExpression::not(ClassExpression::all(r.clone(), named("ex:A")));
        let concept = expr.to_concept();
        let (role, filler) = concept.as_some().unwrap();
        assert_eq!(role, &Role::new("ex:r"));
        assert_eq!(filler, Concept::atom("ex:A").negate());

        let inverse = PropertyExpression::inverse_of(r);
        assert!(inverse.to_role().is_inverse());
        assert_eq!(ClassExpression::Nothing.to_concept(), Concept::bottom());
    }

    #[test]
    fn test_el_profile_detection() {
        let r = PropertyExpression::object("ex:r");
        assert!(ClassExpression::IntersectionOf(vec![
            named("ex:A"),
            ClassExpression::some(r.clone(), named("ex:B")),
        ])
        .is_el());
        assert!(!ClassExpression::all(r, named("ex:B")).is_el());
        assert!(!ClassExpression::UnionOf(vec![named("ex:A"), named("ex:B")]).is_el());
    }

    #[test]
    fn test_serde_roundtrip() {
        let axiom = Axiom::SubClassOf(
            named("ex:A"),
            ClassExpression::min(2, PropertyExpression::object("ex:r"), None),
        );
        let json = serde_json::to_string(&axiom).unwrap();
        let back: Axiom = serde_json::from_str(&json).unwrap();
        assert_eq!(back, axiom);
    }
}

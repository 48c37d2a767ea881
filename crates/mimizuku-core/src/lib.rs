//! Mimizuku コア
//!
//! 記述論理推論器の基盤となる型:
//! - インターン化された概念・ロール表現 (`Concept`, `Role`, `Name`)
//! - OWL 2 DL 公理モデル (`ClassExpression`, `Axiom`, `Ontology`)
//! - 用語オラクル (`TBox`) とロールオラクル (`RBox`)
//! - データ型オラクルと表現力の検出

pub mod automaton;
pub mod budget;
pub mod datatype;
pub mod error;
pub mod expressivity;
pub mod literal;
pub mod model;
pub mod name;
pub mod rbox;
pub mod tbox;
pub mod term;

pub use automaton::{RoleAutomaton, Transition};
pub use budget::{CancellationFlag, ReasoningBudget};
pub use datatype::{BuiltinDatatypes, DatatypeOracle};
pub use error::{ReasonerError, Result};
pub use expressivity::Expressivity;
pub use literal::Literal;
pub use model::{
    Axiom, AxiomId, AxiomKind, ClassExpression, DataRange, Ontology, PropertyExpression,
};
pub use name::Name;
pub use rbox::{RBox, RoleRestriction};
pub use tbox::{Inclusion, TBox, Unfolding};
pub use term::{Concept, ConceptKind, Role};

//! # 🦉 Mimizuku - OWL 2 DL Tableau Reasoner
//!
//! Mimizuku は SROIQ(D) オントロジーに対する記述論理推論器です。
//! 完了グラフ上のテーブロー法で整合性・充足可能性を判定し、
//! クラス階層の分類と個体の実現を提供します。
//!
//! ## Features
//!
//! - **Tableau completion**: dependency-directed backjumping over an explicit branch stack
//! - **Blocking**: subset, equality and pairwise blocking chosen from the ontology's expressivity
//! - **Satisfiability cache**: cached concept models, cache blocking and model merging
//! - **Incremental consistency**: ABox additions resume the retained completion
//! - **Classification**: completely-defined shortcuts with top/bottom search, saturation for EL
//! - **Realization**: most specific types of every named individual
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mimizuku::prelude::*;
//!
//! fn main() -> Result<(), ReasonerError> {
//!     let mut kb = KnowledgeBase::new(ReasonerConfig::default());
//!     kb.add_axiom(Axiom::SubClassOf(
//!         ClassExpression::named("http://example.org/Cat"),
//!         ClassExpression::named("http://example.org/Animal"),
//!     ));
//!     kb.add_axiom(Axiom::ClassAssertion(
//!         ClassExpression::named("http://example.org/Cat"),
//!         Name::new("http://example.org/tama"),
//!     ));
//!
//!     assert!(kb.is_consistent()?);
//!     let taxonomy = kb.classify()?;
//!     println!("{} classes", taxonomy.node_count());
//!
//!     let instances = kb.realize()?;
//!     println!("{:?}", instances.types(&Name::new("http://example.org/tama")));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`mimizuku-core`**: interned terms, axioms, terminology and role oracles
//! - **`mimizuku-tableau`**: completion graph, rules, blocking, caching
//! - **`mimizuku-taxonomy`**: taxonomy builders and realization
//! - **`mimizuku`**: this facade
//!
//! ## Logging
//!
//! All crates log through `tracing`. [`init_tracing`] installs a
//! subscriber filtered by `RUST_LOG`.

pub mod config;
pub mod knowledge_base;

pub use config::ReasonerConfig;
pub use knowledge_base::{KnowledgeBase, ReasoningStatistics, SatisfiabilityResult};

pub use mimizuku_core::{
    Axiom, CancellationFlag, ClassExpression, DataRange, Expressivity, Literal, Name, Ontology,
    PropertyExpression, ReasonerError, Result,
};
pub use mimizuku_tableau::{BlockingPolicy, CacheSafetyPolicy, Clash, ClashKind, InvalidLiteralPolicy};
pub use mimizuku_taxonomy::{FlatTaxonomy, InstanceMap, Taxonomy};

/// Installs a `tracing` subscriber reading its filter from `RUST_LOG`.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        init_tracing, Axiom, BlockingPolicy, CacheSafetyPolicy, ClassExpression, InstanceMap, InvalidLiteralPolicy,
        KnowledgeBase, Literal, Name, Ontology, PropertyExpression, ReasonerConfig, ReasonerError, Taxonomy,
    };
}

/// Current version of Mimizuku
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

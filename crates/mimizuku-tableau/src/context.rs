//! Everything a completion run reads but never mutates.

use crate::blocking::{Blocking, BlockingPolicy};
use crate::cache::{CacheSafety, CacheSafetyPolicy, SatisfiabilityCache};
use mimizuku_core::{
    AxiomKind, BuiltinDatatypes, DatatypeOracle, Expressivity, Ontology, RBox, Result, Role, TBox,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// What to do with a literal whose lexical form is invalid for its datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidLiteralPolicy {
    /// The literal node clashes.
    #[default]
    Inconsistent,
    /// Log a warning and drop the value.
    Ignore,
}

/// Tableau settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableauConfig {
    pub blocking: BlockingPolicy,
    pub cache_safety: CacheSafetyPolicy,
    pub invalid_literal_policy: InvalidLiteralPolicy,
    /// Read and write the satisfiability cache, and cache-block successors.
    pub use_cache: bool,
    /// Add the negations of failed disjuncts to later alternatives.
    pub semantic_branching: bool,
    /// Answer "not subsumed" from two mergeable cached models.
    pub use_model_merging: bool,
    /// Upper bound on live nodes; `None` is unbounded.
    pub max_nodes: Option<usize>,
}

impl Default for TableauConfig {
    fn default() -> Self {
        Self {
            blocking: BlockingPolicy::Auto,
            cache_safety: CacheSafetyPolicy::Auto,
            invalid_literal_policy: InvalidLiteralPolicy::Inconsistent,
            use_cache: true,
            semantic_branching: true,
            use_model_merging: true,
            max_nodes: None,
        }
    }
}

/// Shared, read-only inputs of every completion run over one ontology.
#[derive(Debug, Clone)]
pub struct ReasoningContext {
    pub tbox: Arc<TBox>,
    pub rbox: Arc<RBox>,
    pub expressivity: Expressivity,
    pub datatypes: Arc<dyn DatatypeOracle>,
    pub cache: Arc<SatisfiabilityCache>,
    pub blocking: Blocking,
    pub safety: CacheSafety,
    pub config: TableauConfig,
}

impl ReasoningContext {
    pub fn new(tbox: TBox, rbox: RBox, expressivity: Expressivity, config: TableauConfig) -> Self {
        Self {
            blocking: Blocking::new(config.blocking, &expressivity),
            safety: CacheSafety::select(config.cache_safety, &expressivity),
            tbox: Arc::new(tbox),
            rbox: Arc::new(rbox),
            expressivity,
            datatypes: Arc::new(BuiltinDatatypes::new()),
            cache: Arc::new(SatisfiabilityCache::new()),
            config,
        }
    }

    /// Builds the terminology and role oracles of `ontology`.
    pub fn from_ontology(ontology: &Ontology, config: TableauConfig) -> Result<Self> {
        let mut rbox = RBox::new();
        for name in &ontology.object_properties {
            rbox.declare(&Role::new(name.clone()), false);
        }
        for name in &ontology.data_properties {
            rbox.declare(&Role::new(name.clone()), true);
        }
        for (id, axiom) in ontology.axioms.iter().enumerate() {
            if axiom.kind() != AxiomKind::TBox {
                rbox.add_axiom(id, axiom);
            }
        }
        let tbox = TBox::build(ontology, &mut rbox);
        rbox.prepare()?;
        let expressivity = Expressivity::from_ontology(ontology, &rbox, &tbox);
        debug!(expressivity = %expressivity, "reasoning context ready");
        Ok(Self::new(tbox, rbox, expressivity, config))
    }

    pub fn with_datatypes(mut self, datatypes: Arc<dyn DatatypeOracle>) -> Self {
        self.datatypes = datatypes;
        self
    }

    /// Shares `cache` instead of a private one.
    pub fn with_cache(mut self, cache: Arc<SatisfiabilityCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Successors may be cache-blocked.
    pub fn can_cache_block(&self) -> bool {
        self.config.use_cache && self.safety.can_support()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimizuku_core::{Axiom, ClassExpression, PropertyExpression};

    #[test]
    fn test_from_ontology_selects_policies() {
        let mut ontology = Ontology::new();
        ontology.add_axiom(Axiom::SubClassOf(
            ClassExpression::named("ex:A"),
            ClassExpression::some(
                PropertyExpression::inverse_of(PropertyExpression::object("ex:r")),
                ClassExpression::named("ex:B"),
            ),
        ));
        let context = ReasoningContext::from_ontology(&ontology, TableauConfig::default()).unwrap();
        assert!(context.expressivity.inverse);
        assert_eq!(context.blocking.policy(), BlockingPolicy::Equality);
        assert_eq!(context.safety, CacheSafety::Dynamic);
        assert!(context.can_cache_block());
    }

    #[test]
    fn test_config_roundtrip_uses_defaults() {
        let config: TableauConfig = serde_json::from_str(r#"{"use_cache": false}"#).unwrap();
        assert!(!config.use_cache);
        assert_eq!(config.blocking, BlockingPolicy::Auto);
        assert!(config.semantic_branching);
    }
}

//! 推論器の設定

use anyhow::Context;
use mimizuku_core::{CancellationFlag, ReasoningBudget};
use mimizuku_tableau::{BlockingPolicy, CacheSafetyPolicy, InvalidLiteralPolicy, TableauConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Reasoner settings. Every field has a default, so a partial JSON
/// document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReasonerConfig {
    /// Wall-clock limit per reasoning call; `None` never times out.
    pub timeout_ms: Option<u64>,
    pub use_cache: bool,
    pub use_model_merging: bool,
    pub semantic_branching: bool,
    /// Apply ABox additions to the retained completion graph instead of
    /// rebuilding it.
    pub use_incremental_consistency: bool,
    /// Classify EL terminologies by saturation.
    pub use_el_classifier: bool,
    pub blocking: BlockingPolicy,
    pub cache_safety: CacheSafetyPolicy,
    pub invalid_literal_policy: InvalidLiteralPolicy,
    pub max_nodes: Option<usize>,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        let tableau = TableauConfig::default();
        Self {
            timeout_ms: None,
            use_cache: tableau.use_cache,
            use_model_merging: tableau.use_model_merging,
            semantic_branching: tableau.semantic_branching,
            use_incremental_consistency: true,
            use_el_classifier: true,
            blocking: tableau.blocking,
            cache_safety: tableau.cache_safety,
            invalid_literal_policy: tableau.invalid_literal_policy,
            max_nodes: tableau.max_nodes,
        }
    }
}

impl ReasonerConfig {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("invalid reasoner configuration")
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read reasoner configuration {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("in {}", path.display()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn tableau(&self) -> TableauConfig {
        TableauConfig {
            blocking: self.blocking,
            cache_safety: self.cache_safety,
            invalid_literal_policy: self.invalid_literal_policy,
            use_cache: self.use_cache,
            semantic_branching: self.semantic_branching,
            use_model_merging: self.use_model_merging,
            max_nodes: self.max_nodes,
        }
    }

    /// A fresh budget for one reasoning call, polling `flag`.
    pub fn budget(&self, flag: &CancellationFlag) -> ReasoningBudget {
        let budget = match self.timeout() {
            Some(timeout) => ReasoningBudget::with_timeout(timeout),
            None => ReasoningBudget::unlimited(),
        };
        budget.with_flag(flag.clone())
    }
}

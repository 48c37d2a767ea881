//! Mimizuku 分類・実現エンジン
//!
//! クラス階層 (taxonomy) の構築と個体の実現を提供します。
//! 一般の TBox には CD 最適化付きトップ/ボトム探索を、EL の TBox には
//! 飽和ベースの分類器を使用します。

pub mod builder;
pub mod cd;
pub mod el;
pub mod oracle;
pub mod realization;
pub mod taxonomy;

pub use builder::TaxonomyBuilder;
pub use cd::{BuildStatistics, CdOptimizedTaxonomyBuilder, ConceptFlag};
pub use el::{ElClassifier, ElStatistics};
pub use oracle::{SubsumptionOracle, TableauOracle};
pub use realization::{realize, InstanceMap};
pub use taxonomy::{FlatClass, FlatTaxonomy, NodeIndex, Taxonomy, TaxonomyNode};

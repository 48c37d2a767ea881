//! Mimizuku テーブロー推論エンジン
//!
//! 完了グラフ上で SROIQ(D) のテーブロー規則を適用する:
//! - 依存集合と明示的な分岐スタックによるバックジャンピング
//! - 単一・等価・ペアワイズのブロッキング
//! - 充足可能性キャッシュとモデルマージ
//! - 完了後の ABox 追加に対するインクリメンタルな再検査

pub mod blocking;
pub mod branch;
pub mod cache;
pub mod clash;
pub mod context;
pub mod dependency;
pub mod graph;
pub mod queue;
pub mod reasoner;
mod rules;
pub mod strategy;
pub mod tracker;

pub use blocking::{Blocking, BlockingPolicy};
pub use branch::{Branch, BranchKind};
pub use cache::{Bool3, CacheSafety, CacheSafetyPolicy, CachedConceptNode, CachedNode, SatisfiabilityCache};
pub use clash::{Clash, ClashKind};
pub use context::{InvalidLiteralPolicy, ReasoningContext, TableauConfig};
pub use dependency::DependencySet;
pub use graph::{CompletionGraph, Edge, Node, NodeId, NodeKind, NodeName};
pub use queue::{CompletionQueue, Selector};
pub use reasoner::{SatisfiabilityCheck, TableauReasoner};
pub use strategy::{CompletionOutcome, CompletionStrategy, StrategyState, Statistics};
pub use tracker::ChangeTracker;

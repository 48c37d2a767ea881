//! Satisfiability cache shared by every tableau run of one knowledge base.
//!
//! Entries map a concept to `Top` (satisfiable, no model kept), `Bottom`
//! (unsatisfiable) or a read-only snapshot of the root of a complete model.
//! Writers race freely; equivalent derivations store equivalent entries.

mod safety;

pub use safety::{CacheSafety, CacheSafetyPolicy};

use crate::graph::{CompletionGraph, NodeId};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use mimizuku_core::{Concept, ConceptKind, RBox, ReasonerError, Result, Role};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Three-valued answer of the model-merging pretest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bool3 {
    True,
    False,
    Unknown,
}

impl Bool3 {
    pub fn is_true(self) -> bool {
        self == Bool3::True
    }

    pub fn is_known(self) -> bool {
        self != Bool3::Unknown
    }
}

impl From<bool> for Bool3 {
    fn from(value: bool) -> Self {
        if value {
            Bool3::True
        } else {
            Bool3::False
        }
    }
}

/// Root of a completed model, frozen when it was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedConceptNode {
    types: HashSet<Concept>,
    /// Roles of the root's edges, oriented away from the root.
    edges: Vec<Role>,
    complete: bool,
    independent: bool,
}

impl CachedConceptNode {
    pub fn new(types: HashSet<Concept>, edges: Vec<Role>, complete: bool, independent: bool) -> Self {
        Self {
            types,
            edges,
            complete,
            independent,
        }
    }

    /// Snapshot of `root` in a completed graph. Only the independent part of
    /// the label is kept.
    pub fn from_graph(graph: &CompletionGraph, root: NodeId, complete: bool) -> Self {
        let node = graph.node(root);
        let all_independent = node.types().all(|(_, ds)| ds.is_independent());
        let types = node
            .types()
            .filter(|(_, ds)| ds.is_independent())
            .map(|(c, _)| c.clone())
            .collect();
        let mut edges: Vec<Role> = node
            .out_edges()
            .iter()
            .filter(|e| graph.is_live(e.to))
            .map(|e| e.role.clone())
            .chain(
                node.in_edges()
                    .iter()
                    .filter(|e| graph.is_live(e.from))
                    .map(|e| e.role.inverse()),
            )
            .collect();
        edges.sort();
        edges.dedup();
        Self::new(types, edges, complete, all_independent)
    }

    pub fn types(&self) -> &HashSet<Concept> {
        &self.types
    }

    pub fn has_type(&self, concept: &Concept) -> bool {
        self.types.contains(concept)
    }

    pub fn edges(&self) -> &[Role] {
        &self.edges
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_independent(&self) -> bool {
        self.independent
    }

    pub fn has_nominal(&self) -> bool {
        self.types.iter().any(|c| c.as_nominal().is_some())
    }

    /// Disjoint union of the two models is a model of both roots' labels,
    /// as far as can be seen from the roots.
    fn can_merge_with(&self, other: &CachedConceptNode, rbox: &RBox) -> bool {
        if !(self.complete && other.complete && self.independent && other.independent) {
            return false;
        }
        if self.has_nominal() || other.has_nominal() {
            return false;
        }
        if self.types.iter().any(|c| other.types.contains(&c.negate())) {
            return false;
        }
        if constrains_edges(self, other, rbox) || constrains_edges(other, self, rbox) {
            return false;
        }
        for e1 in &self.edges {
            for f in rbox.functional_supers(e1) {
                if other.edges.iter().any(|e2| rbox.is_sub_role_of(e2, f)) {
                    return false;
                }
            }
        }
        true
    }
}

/// A restriction at the root of `a` that would range over the root edges of `b`.
fn constrains_edges(a: &CachedConceptNode, b: &CachedConceptNode, rbox: &RBox) -> bool {
    a.types.iter().any(|c| {
        let role = match c.kind() {
            ConceptKind::All(role, _) | ConceptKind::AllState { role, .. } => Some(role),
            ConceptKind::Not(inner) => match inner.kind() {
                ConceptKind::Min(_, role, _) | ConceptKind::HasSelf(role) => Some(role),
                _ => None,
            },
            _ => None,
        };
        role.map(|r| b.edges.iter().any(|e| rbox.is_sub_role_of(e, r)))
            .unwrap_or(false)
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedNode {
    Top,
    Bottom,
    Model(Arc<CachedConceptNode>),
}

impl CachedNode {
    pub fn is_satisfiable(&self) -> bool {
        !matches!(self, CachedNode::Bottom)
    }

    pub fn model(&self) -> Option<&Arc<CachedConceptNode>> {
        match self {
            CachedNode::Model(model) => Some(model),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SatisfiabilityCache {
    entries: DashMap<Concept, CachedNode>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl SatisfiabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, concept: &Concept) -> Option<CachedNode> {
        if concept.is_top() {
            return Some(CachedNode::Top);
        }
        if concept.is_bottom() {
            return Some(CachedNode::Bottom);
        }
        match self.entries.get(concept) {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(entry.value().clone())
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    pub fn is_satisfiable(&self, concept: &Concept) -> Option<bool> {
        self.get(concept).map(|node| node.is_satisfiable())
    }

    /// Complete cached model of `concept`, if one was stored.
    pub fn model(&self, concept: &Concept) -> Option<Arc<CachedConceptNode>> {
        self.entries
            .get(concept)
            .and_then(|entry| entry.value().model().cloned())
            .filter(|model| model.is_complete())
    }

    /// Stores an entry. Overwriting satisfiable with unsatisfiable, or the
    /// reverse, means two runs disagreed.
    pub fn put(&self, concept: &Concept, node: CachedNode) -> Result<()> {
        match self.entries.entry(concept.clone()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_satisfiable() != node.is_satisfiable() {
                    return Err(ReasonerError::internal(format!(
                        "conflicting cache entries for {}",
                        concept
                    )));
                }
                if matches!(node, CachedNode::Model(_)) || !matches!(occupied.get(), CachedNode::Model(_)) {
                    occupied.insert(node);
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(node);
            }
        }
        Ok(())
    }

    /// Records the satisfiability of `concept`. An unsatisfiable concept also
    /// makes its complement trivially satisfiable.
    pub fn put_sat(&self, concept: &Concept, sat: bool, model: Option<CachedConceptNode>) -> Result<()> {
        if sat {
            let node = match model {
                Some(model) => CachedNode::Model(Arc::new(model)),
                None => CachedNode::Top,
            };
            debug!(concept = %concept, "cache: satisfiable");
            self.put(concept, node)
        } else {
            debug!(concept = %concept, "cache: unsatisfiable");
            self.put(concept, CachedNode::Bottom)?;
            self.put(&concept.negate(), CachedNode::Top)
        }
    }

    /// Model-merging pretest for the satisfiability of `a ⊓ b`.
    pub fn is_mergable(&self, rbox: &RBox, a: &Concept, b: &Concept) -> Bool3 {
        let x = self.entries.get(a).map(|entry| entry.value().clone());
        let y = self.entries.get(b).map(|entry| entry.value().clone());
        match (x, y) {
            (Some(x), _) if !x.is_satisfiable() => Bool3::False,
            (_, Some(y)) if !y.is_satisfiable() => Bool3::False,
            (Some(x), Some(y)) => match (x.model(), y.model()) {
                (Some(mx), Some(my)) if mx.can_merge_with(my, rbox) => Bool3::True,
                _ => Bool3::Unknown,
            },
            _ => Bool3::Unknown,
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rbox() -> RBox {
        let mut rbox = RBox::new();
        rbox.declare(&Role::new("ex:r"), false);
        rbox.declare(&Role::new("ex:f"), false);
        rbox.prepare().unwrap();
        rbox
    }

    fn model(types: &[Concept], edges: &[Role]) -> CachedConceptNode {
        CachedConceptNode::new(types.iter().cloned().collect(), edges.to_vec(), true, true)
    }

    #[test]
    fn test_unsat_stores_complement() {
        let cache = SatisfiabilityCache::new();
        let a = Concept::atom("ex:CacheA");
        cache.put_sat(&a, false, None).unwrap();
        assert_eq!(cache.is_satisfiable(&a), Some(false));
        assert_eq!(cache.get(&a.negate()), Some(CachedNode::Top));
        assert!(cache.hits() >= 2);
    }

    #[test]
    fn test_conflicting_insert_is_an_error() {
        let cache = SatisfiabilityCache::new();
        let a = Concept::atom("ex:CacheB");
        cache.put_sat(&a, true, None).unwrap();
        let err = cache.put_sat(&a, false, None).unwrap_err();
        assert!(matches!(err, ReasonerError::InternalInvariant(_)));
    }

    #[test]
    fn test_model_survives_top_insert() {
        let cache = SatisfiabilityCache::new();
        let a = Concept::atom("ex:CacheC");
        cache.put_sat(&a, true, Some(model(&[a.clone()], &[]))).unwrap();
        cache.put_sat(&a, true, None).unwrap();
        assert!(cache.model(&a).is_some());
    }

    #[test]
    fn test_trivial_entries() {
        let cache = SatisfiabilityCache::new();
        assert_eq!(cache.is_satisfiable(&Concept::top()), Some(true));
        assert_eq!(cache.is_satisfiable(&Concept::bottom()), Some(false));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_mergable() {
        let rbox = rbox();
        let cache = SatisfiabilityCache::new();
        let r = Role::new("ex:r");
        let (a, b, c) = (
            Concept::atom("ex:MergeA"),
            Concept::atom("ex:MergeB"),
            Concept::atom("ex:MergeC"),
        );
        let some_r = Concept::some(r.clone(), Concept::top());
        let all_r = Concept::all(r.clone(), c.negate());

        cache.put_sat(&a, true, Some(model(&[a.clone(), some_r], &[r.clone()]))).unwrap();
        cache.put_sat(&b, true, Some(model(&[b.clone()], &[]))).unwrap();
        cache.put_sat(&c, true, Some(model(&[c.clone(), all_r], &[]))).unwrap();
        assert_eq!(cache.is_mergable(&rbox, &a, &b), Bool3::True);
        assert_eq!(cache.is_mergable(&rbox, &a, &c), Bool3::Unknown);

        let d = Concept::atom("ex:MergeD");
        assert_eq!(cache.is_mergable(&rbox, &a, &d), Bool3::Unknown);
        cache.put_sat(&d, false, None).unwrap();
        assert_eq!(cache.is_mergable(&rbox, &a, &d), Bool3::False);
    }

    #[test]
    fn test_complementary_types_block_merging() {
        let rbox = rbox();
        let cache = SatisfiabilityCache::new();
        let (a, b) = (Concept::atom("ex:MergeE"), Concept::atom("ex:MergeF"));
        let x = Concept::atom("ex:MergeX");
        cache.put_sat(&a, true, Some(model(&[a.clone(), x.clone()], &[]))).unwrap();
        cache.put_sat(&b, true, Some(model(&[b.clone(), x.negate()], &[]))).unwrap();
        assert_eq!(cache.is_mergable(&rbox, &a, &b), Bool3::Unknown);
    }
}

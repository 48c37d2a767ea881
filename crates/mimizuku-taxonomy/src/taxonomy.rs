//! Subsumption DAG over named classes.
//!
//! Nodes are equivalence classes. Index `0` is always `⊤` and index `1`
//! always `⊥`; every other node sits between them. Links are kept
//! transitively reduced: adding a node between `supers` and `subs` drops
//! the direct links it makes redundant.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

pub type NodeIndex = usize;

const TOP: NodeIndex = 0;
const BOTTOM: NodeIndex = 1;

#[derive(Debug, Clone)]
pub struct TaxonomyNode<T> {
    equivalents: Vec<T>,
    supers: BTreeSet<NodeIndex>,
    subs: BTreeSet<NodeIndex>,
}

impl<T> TaxonomyNode<T> {
    fn new(name: T) -> Self {
        Self {
            equivalents: vec![name],
            supers: BTreeSet::new(),
            subs: BTreeSet::new(),
        }
    }

    /// First element added to the node.
    pub fn name(&self) -> &T {
        &self.equivalents[0]
    }

    pub fn equivalents(&self) -> &[T] {
        &self.equivalents
    }

    pub fn supers(&self) -> &BTreeSet<NodeIndex> {
        &self.supers
    }

    pub fn subs(&self) -> &BTreeSet<NodeIndex> {
        &self.subs
    }

    /// Direct super of `⊥` only.
    pub fn is_leaf(&self) -> bool {
        self.subs.len() == 1 && self.subs.contains(&BOTTOM)
    }
}

#[derive(Debug, Clone)]
pub struct Taxonomy<T> {
    nodes: Vec<TaxonomyNode<T>>,
    index: HashMap<T, NodeIndex>,
}

impl<T> Taxonomy<T>
where
    T: Clone + Eq + Hash + Ord + Debug,
{
    pub fn new(top: T, bottom: T) -> Self {
        let mut top_node = TaxonomyNode::new(top.clone());
        let mut bottom_node = TaxonomyNode::new(bottom.clone());
        top_node.subs.insert(BOTTOM);
        bottom_node.supers.insert(TOP);
        let mut index = HashMap::new();
        index.insert(top, TOP);
        index.insert(bottom, BOTTOM);
        Self {
            nodes: vec![top_node, bottom_node],
            index,
        }
    }

    pub fn top(&self) -> NodeIndex {
        TOP
    }

    pub fn bottom(&self) -> NodeIndex {
        BOTTOM
    }

    pub fn node(&self, index: NodeIndex) -> &TaxonomyNode<T> {
        &self.nodes[index]
    }

    pub fn node_of(&self, element: &T) -> Option<NodeIndex> {
        self.index.get(element).copied()
    }

    pub fn contains(&self, element: &T) -> bool {
        self.index.contains_key(element)
    }

    /// Number of equivalence classes, `⊤` and `⊥` included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every classified element.
    pub fn elements(&self) -> impl Iterator<Item = &T> {
        self.index.keys()
    }

    /// Inserts `element` as a new node directly below `supers` and above
    /// `subs`. An element already present is left where it is.
    pub fn add_node(&mut self, element: T, supers: &[NodeIndex], subs: &[NodeIndex]) -> NodeIndex {
        if let Some(existing) = self.node_of(&element) {
            return existing;
        }
        let id = self.nodes.len();
        self.nodes.push(TaxonomyNode::new(element.clone()));
        self.index.insert(element, id);

        for &sup in supers {
            for &sub in subs {
                self.nodes[sup].subs.remove(&sub);
                self.nodes[sub].supers.remove(&sup);
            }
        }
        for &sup in supers {
            self.nodes[sup].subs.insert(id);
            self.nodes[id].supers.insert(sup);
        }
        for &sub in subs {
            self.nodes[sub].supers.insert(id);
            self.nodes[id].subs.insert(sub);
        }
        id
    }

    pub fn add_equivalent(&mut self, element: T, node: NodeIndex) {
        if self.index.contains_key(&element) {
            return;
        }
        self.nodes[node].equivalents.push(element.clone());
        self.index.insert(element, node);
    }

    /// Strict ancestors of `node`; only the direct ones when `direct`.
    pub fn super_nodes(&self, node: NodeIndex, direct: bool) -> BTreeSet<NodeIndex> {
        self.walk(node, direct, |n| &n.supers)
    }

    /// Strict descendants of `node`; only the direct ones when `direct`.
    pub fn sub_nodes(&self, node: NodeIndex, direct: bool) -> BTreeSet<NodeIndex> {
        self.walk(node, direct, |n| &n.subs)
    }

    fn walk<F>(&self, node: NodeIndex, direct: bool, next: F) -> BTreeSet<NodeIndex>
    where
        F: Fn(&TaxonomyNode<T>) -> &BTreeSet<NodeIndex>,
    {
        if direct {
            return next(&self.nodes[node]).clone();
        }
        let mut seen = BTreeSet::new();
        let mut queue: VecDeque<NodeIndex> = next(&self.nodes[node]).iter().copied().collect();
        while let Some(current) = queue.pop_front() {
            if seen.insert(current) {
                queue.extend(next(&self.nodes[current]).iter().copied());
            }
        }
        seen
    }

    /// Elements of the strict super classes of `element`.
    pub fn supers(&self, element: &T, direct: bool) -> BTreeSet<T> {
        self.collect(element, |node| self.super_nodes(node, direct))
    }

    /// Elements of the strict sub classes of `element`.
    pub fn subs(&self, element: &T, direct: bool) -> BTreeSet<T> {
        self.collect(element, |node| self.sub_nodes(node, direct))
    }

    /// Elements equivalent to `element`, itself excluded.
    pub fn equivalents(&self, element: &T) -> BTreeSet<T> {
        let Some(node) = self.node_of(element) else {
            return BTreeSet::new();
        };
        self.nodes[node]
            .equivalents
            .iter()
            .filter(|e| *e != element)
            .cloned()
            .collect()
    }

    fn collect<F>(&self, element: &T, nodes: F) -> BTreeSet<T>
    where
        F: Fn(NodeIndex) -> BTreeSet<NodeIndex>,
    {
        let Some(node) = self.node_of(element) else {
            return BTreeSet::new();
        };
        nodes(node)
            .into_iter()
            .flat_map(|n| self.nodes[n].equivalents.iter().cloned())
            .collect()
    }

    /// `None` when either element is unknown.
    pub fn is_subsumed_by(&self, sub: &T, sup: &T) -> Option<bool> {
        let sub = self.node_of(sub)?;
        let sup = self.node_of(sup)?;
        Some(sub == sup || sub == BOTTOM || sup == TOP || self.super_nodes(sub, false).contains(&sup))
    }

    /// Drops every node that is a strict ancestor of another in `nodes`.
    pub fn most_specific_nodes(&self, nodes: &BTreeSet<NodeIndex>) -> Vec<NodeIndex> {
        nodes
            .iter()
            .copied()
            .filter(|&candidate| {
                !nodes
                    .iter()
                    .any(|&other| other != candidate && self.super_nodes(other, false).contains(&candidate))
            })
            .collect()
    }

    pub fn is_equivalent(&self, a: &T, b: &T) -> Option<bool> {
        Some(self.node_of(a)? == self.node_of(b)?)
    }

    /// Nodes in breadth-first order from `⊤`, `⊥` last.
    pub fn top_down(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([TOP]);
        while let Some(node) = queue.pop_front() {
            if node == BOTTOM || !seen.insert(node) {
                continue;
            }
            order.push(node);
            queue.extend(self.nodes[node].subs.iter().copied());
        }
        order.push(BOTTOM);
        order
    }

    /// Order-independent view: each equivalence class with the classes
    /// directly above it.
    pub fn flatten(&self) -> FlatTaxonomy<T> {
        let class = |n: NodeIndex| -> BTreeSet<T> { self.nodes[n].equivalents.iter().cloned().collect() };
        let mut classes: Vec<FlatClass<T>> = (0..self.nodes.len())
            .map(|n| FlatClass {
                equivalents: class(n),
                supers: self.nodes[n].supers.iter().map(|&s| class(s)).collect(),
            })
            .collect();
        classes.sort();
        FlatTaxonomy { classes }
    }
}

impl<T> PartialEq for Taxonomy<T>
where
    T: Clone + Eq + Hash + Ord + Debug,
{
    fn eq(&self, other: &Self) -> bool {
        self.flatten() == other.flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlatClass<T: Ord> {
    pub equivalents: BTreeSet<T>,
    pub supers: BTreeSet<BTreeSet<T>>,
}

/// Serializable snapshot of a taxonomy, sorted by equivalence class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatTaxonomy<T: Ord> {
    pub classes: Vec<FlatClass<T>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Taxonomy<&'static str> {
        let mut t = Taxonomy::new("top", "bottom");
        let a = t.add_node("a", &[t.top()], &[t.bottom()]);
        let b = t.add_node("b", &[a], &[t.bottom()]);
        t.add_node("c", &[b], &[t.bottom()]);
        t
    }

    #[test]
    fn add_node_keeps_links_reduced() {
        let t = chain();
        let a = t.node_of(&"a").unwrap();
        let b = t.node_of(&"b").unwrap();
        assert_eq!(t.node(a).subs(), &BTreeSet::from([b]));
        assert!(!t.node(t.top()).subs().contains(&t.bottom()));
        assert!(t.node(t.node_of(&"c").unwrap()).is_leaf());
    }

    #[test]
    fn insertion_between_existing_nodes() {
        let mut t = chain();
        let a = t.node_of(&"a").unwrap();
        let b = t.node_of(&"b").unwrap();
        let x = t.add_node("x", &[a], &[b]);
        assert_eq!(t.supers(&"b", true), BTreeSet::from(["x"]));
        assert_eq!(t.node(a).subs(), &BTreeSet::from([x]));
        assert_eq!(t.is_subsumed_by(&"c", &"x"), Some(true));
    }

    #[test]
    fn supers_and_subs() {
        let t = chain();
        assert_eq!(t.supers(&"c", true), BTreeSet::from(["b"]));
        assert_eq!(t.supers(&"c", false), BTreeSet::from(["a", "b", "top"]));
        assert_eq!(t.subs(&"a", false), BTreeSet::from(["b", "c", "bottom"]));
        assert_eq!(t.is_subsumed_by(&"a", &"c"), Some(false));
        assert_eq!(t.is_subsumed_by(&"a", &"zzz"), None);
    }

    #[test]
    fn equivalents_share_a_node() {
        let mut t = chain();
        let b = t.node_of(&"b").unwrap();
        t.add_equivalent("b2", b);
        assert_eq!(t.is_equivalent(&"b", &"b2"), Some(true));
        assert_eq!(t.equivalents(&"b2"), BTreeSet::from(["b"]));
        assert_eq!(t.supers(&"c", true), BTreeSet::from(["b", "b2"]));
    }

    #[test]
    fn flatten_ignores_insertion_order() {
        let mut left = Taxonomy::new("top", "bottom");
        let a = left.add_node("a", &[left.top()], &[left.bottom()]);
        left.add_node("b", &[a], &[left.bottom()]);

        let mut right = Taxonomy::new("top", "bottom");
        let b = right.add_node("b", &[right.top()], &[right.bottom()]);
        right.add_node("a", &[right.top()], &[b]);

        assert_eq!(left, right);
        let json = serde_json::to_value(left.flatten()).unwrap();
        assert_eq!(json["classes"].as_array().map(|c| c.len()), Some(4));
    }

    #[test]
    fn most_specific_nodes_drop_ancestors() {
        let t = chain();
        let nodes: BTreeSet<NodeIndex> = ["a", "c", "top"].iter().filter_map(|e| t.node_of(e)).collect();
        assert_eq!(t.most_specific_nodes(&nodes), vec![t.node_of(&"c").unwrap()]);
    }

    #[test]
    fn top_down_visits_bottom_last() {
        let t = chain();
        let order = t.top_down();
        assert_eq!(order.first(), Some(&t.top()));
        assert_eq!(order.last(), Some(&t.bottom()));
        assert_eq!(order.len(), t.node_count());
    }
}

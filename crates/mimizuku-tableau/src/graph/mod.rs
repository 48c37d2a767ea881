//! Completion graph: node arena, labels, edges and the undo log.
//!
//! Every mutation appends an entry to a single undo log. [`CompletionGraph::restore`]
//! walks the log backwards and undoes each entry whose fact currently
//! depends on a branch deeper than the target depth. Merges are redirects
//! plus pruning, both of which are undone the same way.

mod edge;
mod node;

pub use edge::Edge;
pub use node::{Node, NodeId, NodeKind, NodeName};

use crate::clash::{Clash, ClashKind};
use crate::dependency::DependencySet;
use crate::queue::{Selector, SELECTOR_COUNT};
use mimizuku_core::{Concept, Literal, Name, RBox, Role};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::trace;

#[derive(Debug, Clone)]
enum Undo {
    NodeCreated(NodeId),
    TypeAdded(NodeId, Concept),
    EdgeAdded { from: NodeId, role: Role, to: NodeId },
    DifferentAdded(NodeId, NodeId),
    Merged(NodeId),
    Pruned(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeChange {
    Added,
    /// Already present; the stored dependency set was replaced by a more general one.
    Weakened,
    Unchanged,
}

impl TypeChange {
    pub fn changed(self) -> bool {
        self != TypeChange::Unchanged
    }
}

/// What a restore undid.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub touched: BTreeSet<NodeId>,
    pub unpruned: Vec<NodeId>,
    pub undone: usize,
}

/// Facts copied onto the representative by a merge.
#[derive(Debug, Default, Clone)]
pub struct MergeEffects {
    pub types: Vec<(Concept, DependencySet)>,
    pub edges: Vec<Edge>,
    pub pruned: Vec<NodeId>,
    pub clash: Option<Clash>,
}

/// A neighbour reached over a role, with the dependency of the connecting edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbour {
    pub node: NodeId,
    pub ds: DependencySet,
}

/// Keeps `candidate` when it is strictly more general than `existing`, or
/// incomparable with it and dependent on shallower branches only.
fn more_general(candidate: &DependencySet, existing: &DependencySet) -> bool {
    if candidate == existing || existing.is_subset(candidate) {
        return false;
    }
    candidate.is_subset(existing) || candidate.max() < existing.max()
}

#[derive(Debug, Clone, Default)]
pub struct CompletionGraph {
    nodes: Vec<Node>,
    individuals: HashMap<Name, NodeId>,
    log: Vec<Undo>,
    next_fresh: u32,
    live: usize,
}

impl CompletionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Nodes ever created, including removed and pruned ones.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes created and not undone (pruned nodes included).
    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn log_len(&self) -> usize {
        self.log.len()
    }

    pub fn is_live(&self, id: NodeId) -> bool {
        self.nodes
            .get(id.index())
            .map(|n| !n.removed && n.pruned.is_none())
            .unwrap_or(false)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| !n.removed && n.pruned.is_none())
    }

    pub fn individuals(&self) -> impl Iterator<Item = (&Name, NodeId)> {
        self.individuals.iter().map(|(name, id)| (name, *id))
    }

    /// Node created for a named individual (before following merges).
    pub fn individual(&self, name: &Name) -> Option<NodeId> {
        self.individuals.get(name).copied()
    }

    fn push_node(&mut self, name: NodeName, kind: NodeKind, ds: DependencySet) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, name, kind, ds));
        self.log.push(Undo::NodeCreated(id));
        self.live += 1;
        id
    }

    fn fresh_name(&mut self) -> NodeName {
        self.next_fresh += 1;
        NodeName::Fresh(self.next_fresh)
    }

    pub fn add_individual(&mut self, name: Name, ds: DependencySet) -> NodeId {
        if let Some(id) = self.individuals.get(&name) {
            if !self.nodes[id.index()].removed {
                return *id;
            }
        }
        let kind = NodeKind::Individual {
            parent: None,
            depth: 0,
            blockable: false,
            origin: None,
        };
        let id = self.push_node(NodeName::Named(name.clone()), kind, ds);
        self.individuals.insert(name, id);
        id
    }

    /// Anonymous root, used as the subject of a satisfiability test.
    pub fn add_root(&mut self, ds: DependencySet) -> NodeId {
        let name = self.fresh_name();
        let kind = NodeKind::Individual {
            parent: None,
            depth: 0,
            blockable: false,
            origin: None,
        };
        self.push_node(name, kind, ds)
    }

    /// Blockable successor of `parent`.
    pub fn add_fresh(&mut self, parent: NodeId, origin: Option<Concept>, ds: DependencySet) -> NodeId {
        let depth = self.node(parent).depth() + 1;
        let name = self.fresh_name();
        let kind = NodeKind::Individual {
            parent: Some(parent),
            depth,
            blockable: true,
            origin,
        };
        self.push_node(name, kind, ds)
    }

    pub fn add_literal(&mut self, value: Option<Literal>, ds: DependencySet) -> NodeId {
        let name = match &value {
            Some(literal) => NodeName::Value(literal.clone()),
            None => self.fresh_name(),
        };
        self.push_node(name, NodeKind::Literal { value }, ds)
    }

    /// Follows merge redirects; the returned set covers every redirect taken.
    pub fn representative(&self, id: NodeId) -> (NodeId, DependencySet) {
        let mut current = id;
        let mut ds = DependencySet::independent();
        for _ in 0..self.nodes.len() {
            match &self.node(current).merged_into {
                Some((target, merge_ds)) => {
                    ds.union_with(merge_ds);
                    current = *target;
                }
                None => break,
            }
        }
        (current, ds)
    }

    pub fn has_type(&self, id: NodeId, concept: &Concept) -> bool {
        self.node(id).has_type(concept)
    }

    pub fn type_ds(&self, id: NodeId, concept: &Concept) -> Option<&DependencySet> {
        self.node(id).type_ds(concept)
    }

    /// Adds `concept` to the label of `id`. Re-adding keeps the more general
    /// dependency set.
    pub fn add_type(&mut self, id: NodeId, concept: Concept, ds: DependencySet) -> TypeChange {
        let node = self.node_mut(id);
        if let Some(existing) = node.types.get_mut(&concept) {
            if more_general(&ds, existing) {
                *existing = ds;
                return TypeChange::Weakened;
            }
            return TypeChange::Unchanged;
        }
        if let Some(selector) = Selector::for_concept(&concept) {
            node.by_selector[selector.index()].push(concept.clone());
        }
        node.types.insert(concept.clone(), ds);
        self.log.push(Undo::TypeAdded(id, concept));
        TypeChange::Added
    }

    /// `⊥` or a complementary pair involving `concept`.
    pub fn clash_for_type(&self, id: NodeId, concept: &Concept) -> Option<Clash> {
        let node = self.node(id);
        let ds = node.type_ds(concept)?;
        if concept.is_bottom() {
            return Some(Clash::new(id, ClashKind::Bottom, ds.clone()));
        }
        let negation = concept.negate();
        node.type_ds(&negation).map(|neg_ds| {
            let positive = if concept.is_negation() { negation.clone() } else { concept.clone() };
            Clash::new(id, ClashKind::Contradiction(positive), ds.union(neg_ds))
        })
    }

    /// Adds `from -role-> to`. Returns the stored edge when it is new or its
    /// dependency set became more general.
    pub fn add_edge(&mut self, from: NodeId, role: &Role, to: NodeId, ds: DependencySet) -> Option<Edge> {
        let (from, role, to) = if role.is_inverse() {
            (to, role.inverse(), from)
        } else {
            (from, role.clone(), to)
        };

        let existing = self
            .node(from)
            .out_edges
            .iter()
            .position(|e| e.role == role && e.to == to);
        if let Some(pos) = existing {
            if !more_general(&ds, &self.node(from).out_edges[pos].ds) {
                return None;
            }
            self.node_mut(from).out_edges[pos].ds = ds.clone();
            if let Some(e) = self
                .node_mut(to)
                .in_edges
                .iter_mut()
                .find(|e| e.role == role && e.from == from)
            {
                e.ds = ds.clone();
            }
            return Some(self.node(from).out_edges[pos].clone());
        }

        let edge = Edge { role: role.clone(), from, to, ds };
        self.node_mut(from).out_edges.push(edge.clone());
        self.node_mut(to).in_edges.push(edge.clone());
        self.log.push(Undo::EdgeAdded { from, role, to });
        Some(edge)
    }

    /// All `role`-neighbours of `id`, one entry per connecting edge.
    pub fn neighbours(&self, id: NodeId, role: &Role, rbox: &RBox) -> Vec<Neighbour> {
        let node = self.node(id);
        let mut result = Vec::new();
        for e in &node.out_edges {
            if self.is_live(e.to) && rbox.is_sub_role_of(&e.role, role) {
                result.push(Neighbour { node: e.to, ds: e.ds.clone() });
            }
        }
        for e in &node.in_edges {
            if self.is_live(e.from) && rbox.is_sub_role_of(&e.role.inverse(), role) {
                result.push(Neighbour { node: e.from, ds: e.ds.clone() });
            }
        }
        result
    }

    /// `role`-neighbours deduplicated by node, keeping the shallowest edge.
    pub fn distinct_neighbours(&self, id: NodeId, role: &Role, rbox: &RBox) -> Vec<Neighbour> {
        let mut by_node: BTreeMap<NodeId, DependencySet> = BTreeMap::new();
        for n in self.neighbours(id, role, rbox) {
            match by_node.get_mut(&n.node) {
                Some(ds) if n.ds.max() < ds.max() => *ds = n.ds,
                Some(_) => {}
                None => {
                    by_node.insert(n.node, n.ds);
                }
            }
        }
        by_node
            .into_iter()
            .map(|(node, ds)| Neighbour { node, ds })
            .collect()
    }

    /// Live nodes connected to `id` by any edge.
    pub fn adjacent(&self, id: NodeId) -> Vec<NodeId> {
        let node = self.node(id);
        let mut result: Vec<NodeId> = node
            .out_edges
            .iter()
            .map(|e| e.to)
            .chain(node.in_edges.iter().map(|e| e.from))
            .filter(|n| self.is_live(*n))
            .collect();
        result.sort();
        result.dedup();
        result
    }

    /// Roles (oriented from `a`) of the edges between `a` and `b`.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> Vec<(Role, DependencySet)> {
        let node = self.node(a);
        node.out_edges
            .iter()
            .filter(|e| e.to == b)
            .map(|e| (e.role.clone(), e.ds.clone()))
            .chain(
                node.in_edges
                    .iter()
                    .filter(|e| e.from == b)
                    .map(|e| (e.role.inverse(), e.ds.clone())),
            )
            .collect()
    }

    pub fn add_different(&mut self, a: NodeId, b: NodeId, ds: DependencySet) -> bool {
        if let Some(existing) = self.node(a).differents.get(&b) {
            if !more_general(&ds, existing) {
                return false;
            }
            self.node_mut(a).differents.insert(b, ds.clone());
            self.node_mut(b).differents.insert(a, ds);
            return true;
        }
        self.node_mut(a).differents.insert(b, ds.clone());
        self.node_mut(b).differents.insert(a, ds);
        self.log.push(Undo::DifferentAdded(a, b));
        true
    }

    pub fn is_different(&self, a: NodeId, b: NodeId) -> Option<&DependencySet> {
        self.node(a).differents.get(&b)
    }

    /// `child` is a blockable node in the tree below `parent`.
    pub fn is_child_of(&self, child: NodeId, parent: NodeId) -> bool {
        let node = self.node(child);
        node.is_blockable() && node.parent() == Some(parent)
    }

    /// Live tree ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = self.node(id).parent();
        while let Some(parent) = current {
            result.push(parent);
            current = self.node(parent).parent();
        }
        result
    }

    /// Merges `y` into `x`: copies the label, edges and inequalities of `y`
    /// onto `x` (edges to the tree children of `y` excepted), records the
    /// redirect and prunes `y` with its subtree.
    pub fn merge(&mut self, y: NodeId, x: NodeId, ds: DependencySet) -> MergeEffects {
        let mut effects = MergeEffects::default();
        if let Some(diff) = self.is_different(x, y) {
            effects.clash = Some(Clash::new(x, ClashKind::Different(y), ds.union(diff)));
            return effects;
        }
        trace!(from = %y, into = %x, ds = %ds, "merge");

        let mut types: Vec<(Concept, DependencySet)> = self
            .node(y)
            .types
            .iter()
            .map(|(c, d)| (c.clone(), d.union(&ds)))
            .collect();
        types.sort_by(|a, b| a.0.cmp(&b.0));
        for (concept, d) in types {
            if self.add_type(x, concept.clone(), d.clone()).changed() {
                effects.types.push((concept, d));
            }
        }

        let out_edges = self.node(y).out_edges.clone();
        for e in out_edges {
            if !self.is_live(e.to) || self.is_child_of(e.to, y) {
                continue;
            }
            let to = if e.to == y { x } else { e.to };
            if let Some(edge) = self.add_edge(x, &e.role, to, e.ds.union(&ds)) {
                effects.edges.push(edge);
            }
        }
        let in_edges = self.node(y).in_edges.clone();
        for e in in_edges {
            if e.from == y || !self.is_live(e.from) || self.is_child_of(e.from, y) {
                continue;
            }
            if let Some(edge) = self.add_edge(e.from, &e.role, x, e.ds.union(&ds)) {
                effects.edges.push(edge);
            }
        }

        let differents: Vec<(NodeId, DependencySet)> = self
            .node(y)
            .differents
            .iter()
            .map(|(n, d)| (*n, d.union(&ds)))
            .collect();
        for (other, d) in differents {
            if other == x {
                continue;
            }
            self.add_different(x, other, d);
        }

        self.node_mut(y).merged_into = Some((x, ds.clone()));
        self.log.push(Undo::Merged(y));
        effects.pruned = self.prune(y, ds);
        effects
    }

    /// Prunes `id` and its blockable subtree.
    pub fn prune(&mut self, id: NodeId, ds: DependencySet) -> Vec<NodeId> {
        let mut pruned = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if self.node(current).pruned.is_some() || self.node(current).removed {
                continue;
            }
            let children: Vec<NodeId> = self
                .adjacent(current)
                .into_iter()
                .filter(|n| self.is_child_of(*n, current))
                .collect();
            self.node_mut(current).pruned = Some(ds.clone());
            self.log.push(Undo::Pruned(current));
            pruned.push(current);
            stack.extend(children);
        }
        pruned
    }

    /// Undoes every logged fact whose current dependency set reaches above `depth`.
    pub fn restore(&mut self, depth: u32) -> RestoreReport {
        let mut report = RestoreReport::default();
        let entries = std::mem::take(&mut self.log);
        let mut kept = Vec::with_capacity(entries.len());

        for entry in entries.into_iter().rev() {
            let keep = match &entry {
                Undo::NodeCreated(id) => {
                    let (removed, deeper, parent) = {
                        let node = self.node(*id);
                        (node.removed, node.ds.max() > depth, node.parent())
                    };
                    if !removed && deeper {
                        if let Some(parent) = parent {
                            report.touched.insert(parent);
                        }
                        self.node_mut(*id).removed = true;
                        self.live -= 1;
                        report.undone += 1;
                    }
                    !removed && !deeper
                }
                Undo::TypeAdded(id, concept) => {
                    let node = self.node(*id);
                    let deeper = if node.removed {
                        None
                    } else {
                        node.types.get(concept).map(|ds| ds.max() > depth)
                    };
                    if deeper == Some(true) {
                        let node = self.node_mut(*id);
                        node.types.remove(concept);
                        if let Some(selector) = Selector::for_concept(concept) {
                            node.by_selector[selector.index()].retain(|c| c != concept);
                        }
                        report.touched.insert(*id);
                        report.undone += 1;
                    }
                    deeper == Some(false)
                }
                Undo::EdgeAdded { from, role, to } => {
                    let found = self
                        .node(*from)
                        .out_edges
                        .iter()
                        .position(|e| &e.role == role && e.to == *to)
                        .map(|pos| (pos, self.node(*from).out_edges[pos].ds.max() > depth));
                    if let Some((pos, true)) = found {
                        self.node_mut(*from).out_edges.remove(pos);
                        self.node_mut(*to)
                            .in_edges
                            .retain(|e| !(&e.role == role && e.from == *from));
                        report.touched.insert(*from);
                        report.touched.insert(*to);
                        report.undone += 1;
                    }
                    matches!(found, Some((_, false)))
                }
                Undo::DifferentAdded(a, b) => {
                    let deeper = self.node(*a).differents.get(b).map(|ds| ds.max() > depth);
                    if deeper == Some(true) {
                        self.node_mut(*a).differents.remove(b);
                        self.node_mut(*b).differents.remove(a);
                        report.undone += 1;
                    }
                    deeper == Some(false)
                }
                Undo::Merged(id) => {
                    let deeper = self
                        .node(*id)
                        .merged_into
                        .as_ref()
                        .map(|(_, ds)| ds.max() > depth);
                    if deeper == Some(true) {
                        self.node_mut(*id).merged_into = None;
                        report.touched.insert(*id);
                        report.undone += 1;
                    }
                    deeper == Some(false)
                }
                Undo::Pruned(id) => {
                    let deeper = self.node(*id).pruned.as_ref().map(|ds| ds.max() > depth);
                    if deeper == Some(true) {
                        self.node_mut(*id).pruned = None;
                        report.touched.insert(*id);
                        report.unpruned.push(*id);
                        report.undone += 1;
                    }
                    deeper == Some(false)
                }
            };
            if keep {
                kept.push(entry);
            }
        }

        kept.reverse();
        self.log = kept;
        report.touched.retain(|id| self.is_live(*id));
        report.unpruned.retain(|id| self.is_live(*id));
        report
    }

    pub fn pointer(&self, id: NodeId, selector: Selector) -> usize {
        self.node(id).apply_next[selector.index()]
    }

    pub fn set_pointer(&mut self, id: NodeId, selector: Selector, value: usize) {
        self.node_mut(id).apply_next[selector.index()] = value;
    }

    pub fn reset_pointers(&mut self, id: NodeId) {
        self.node_mut(id).apply_next = [0; SELECTOR_COUNT];
    }

    pub fn reset_pointer(&mut self, id: NodeId, selector: Selector) {
        self.set_pointer(id, selector, 0);
    }

    /// Concept at position `index` of the selector list of `id`.
    pub fn concept_at(&self, id: NodeId, selector: Selector, index: usize) -> Option<Concept> {
        self.node(id).by_selector[selector.index()].get(index).cloned()
    }
}

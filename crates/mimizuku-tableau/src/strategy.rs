//! テーブロー完了戦略
//!
//! The completion strategy owns one completion graph together with its
//! queue, branch stack and change tracker, and drives rule application:
//!
//! `Initializing → Expanding → {Clashed, Complete}`
//!
//! Non-determinism is explicit: every choice point is a [`Branch`] on a
//! stack, clashes carry dependency sets, and backtracking restores the graph
//! to the depth of the latest branch the clash depends on. A timeout leaves
//! the strategy in `Expanding`, and a later call to [`CompletionStrategy::run`]
//! resumes where it stopped.

use crate::branch::{Branch, BranchKind};
use crate::cache::CachedConceptNode;
use crate::clash::{Clash, ClashKind};
use crate::context::ReasoningContext;
use crate::dependency::DependencySet;
use crate::graph::{CompletionGraph, Edge, NodeId, TypeChange};
use crate::queue::{CompletionQueue, Selector};
use crate::tracker::ChangeTracker;
use mimizuku_core::{
    Axiom, AxiomKind, Concept, ConceptKind, Literal, Name, Ontology, ReasonerError, ReasoningBudget,
    Result, Role,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::ops::AddAssign;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrategyState {
    Initializing,
    Expanding,
    Clashed,
    Complete,
}

/// Verdict of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    Complete,
    Clashed(Clash),
}

impl CompletionOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, CompletionOutcome::Complete)
    }

    pub fn clash(&self) -> Option<&Clash> {
        match self {
            CompletionOutcome::Clashed(clash) => Some(clash),
            CompletionOutcome::Complete => None,
        }
    }
}

/// Run statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Queue pops that reached a rule
    pub rule_applications: u64,
    /// Choice points created
    pub branches: u64,
    pub backtracks: u64,
    pub restores: u64,
    pub nodes_created: u64,
    pub merges: u64,
}

impl AddAssign for Statistics {
    fn add_assign(&mut self, other: Statistics) {
        self.rule_applications += other.rule_applications;
        self.branches += other.branches;
        self.backtracks += other.backtracks;
        self.restores += other.restores;
        self.nodes_created += other.nodes_created;
        self.merges += other.merges;
    }
}

#[derive(Debug, Clone)]
pub struct CompletionStrategy {
    pub(crate) ctx: ReasoningContext,
    pub(crate) graph: CompletionGraph,
    pub(crate) queue: CompletionQueue,
    pub(crate) branches: Vec<Branch>,
    /// Nodes whose generating rules were skipped because they were blocked.
    pub(crate) pending: BTreeSet<NodeId>,
    state: StrategyState,
    /// Clash waiting to be handled by the main loop.
    pub(crate) clash: Option<Clash>,
    /// Final clash of a `Clashed` run.
    witness: Option<Clash>,
    tracker: ChangeTracker,
    pub(crate) stats: Statistics,
    /// Root node and concept of a concept satisfiability test.
    subject: Option<(NodeId, Concept)>,
    /// Built on top of an ABox; such runs never write models to the cache.
    from_abox: bool,
}

impl CompletionStrategy {
    pub fn new(ctx: ReasoningContext) -> Self {
        Self {
            ctx,
            graph: CompletionGraph::new(),
            queue: CompletionQueue::new(),
            branches: Vec::new(),
            pending: BTreeSet::new(),
            state: StrategyState::Initializing,
            clash: None,
            witness: None,
            tracker: ChangeTracker::new(),
            stats: Statistics::default(),
            subject: None,
            from_abox: false,
        }
    }

    /// Strategy seeded with every individual and ABox assertion of `ontology`.
    pub fn for_abox(ctx: ReasoningContext, ontology: &Ontology) -> Result<Self> {
        let mut strategy = Self::new(ctx);
        strategy.from_abox = true;
        for name in &ontology.individuals {
            strategy.add_individual(name.clone());
        }
        for (_, axiom) in ontology.axioms_of(AxiomKind::ABox) {
            strategy.apply_axiom(axiom)?;
        }
        strategy.tracker.clear();
        Ok(strategy)
    }

    /// Strategy testing the satisfiability of `concept` on a single root.
    pub fn for_concept(ctx: ReasoningContext, concept: &Concept) -> Self {
        let mut strategy = Self::new(ctx);
        let root = strategy.graph.add_root(DependencySet::independent());
        strategy.stats.nodes_created += 1;
        strategy.add_type(root, Concept::top(), DependencySet::independent());
        strategy.add_type(root, concept.clone(), DependencySet::independent());
        strategy.subject = Some((root, concept.clone()));
        strategy
    }

    /// Copy of `base` with an extra root carrying `concept`.
    pub fn for_concept_on(base: &CompletionStrategy, concept: &Concept) -> Self {
        let mut strategy = base.clone();
        strategy.stats = Statistics::default();
        strategy.from_abox = true;
        let root = strategy.graph.add_root(DependencySet::independent());
        strategy.stats.nodes_created += 1;
        strategy.tracker.add_individual(root);
        strategy.add_type(root, Concept::top(), DependencySet::independent());
        strategy.add_type(root, concept.clone(), DependencySet::independent());
        strategy.subject = Some((root, concept.clone()));
        strategy
    }

    pub fn context(&self) -> &ReasoningContext {
        &self.ctx
    }

    pub fn graph(&self) -> &CompletionGraph {
        &self.graph
    }

    pub fn state(&self) -> StrategyState {
        self.state
    }

    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub fn branch_depth(&self) -> usize {
        self.branches.len()
    }

    pub fn subject(&self) -> Option<NodeId> {
        self.subject.as_ref().map(|(root, _)| *root)
    }

    /// Final clash of a run that ended `Clashed`.
    pub fn witness(&self) -> Option<&Clash> {
        self.witness.as_ref()
    }

    // ------------------------------------------------------------------
    // ABox additions
    // ------------------------------------------------------------------

    /// Node of a named individual, created with its nominal and `⊤` if new.
    pub fn add_individual(&mut self, name: Name) -> NodeId {
        if let Some(id) = self.graph.individual(&name) {
            if !self.graph.node(id).removed {
                return id;
            }
        }
        let ds = DependencySet::independent();
        let id = self.graph.add_individual(name.clone(), ds.clone());
        self.stats.nodes_created += 1;
        self.tracker.add_individual(id);
        self.add_type(id, Concept::top(), ds.clone());
        self.add_type(id, Concept::nominal(name), ds);
        id
    }

    /// Current representative of a named individual.
    pub fn individual_node(&self, name: &Name) -> Option<NodeId> {
        self.graph.individual(name).map(|id| self.graph.representative(id).0)
    }

    pub fn add_concept_assertion(&mut self, name: &Name, concept: Concept) {
        let node = self.add_individual(name.clone());
        self.add_type(node, concept, DependencySet::independent());
        let (node, _) = self.graph.representative(node);
        self.tracker.update_individual(node);
    }

    pub fn add_role_assertion(&mut self, subject: &Name, role: &Role, object: &Name) {
        let a = self.add_individual(subject.clone());
        let b = self.add_individual(object.clone());
        if let Some(edge) = self.add_edge(a, role, b, DependencySet::independent()) {
            self.tracker.add_edge(edge);
        }
    }

    pub fn add_data_assertion(&mut self, subject: &Name, role: &Role, value: Literal) {
        let a = self.add_individual(subject.clone());
        let ds = DependencySet::independent();
        let literal = self.graph.add_literal(Some(value.clone()), ds.clone());
        self.stats.nodes_created += 1;
        self.add_type(literal, Concept::value(value), ds.clone());
        self.queue.enqueue(literal, Selector::Literal);
        if let Some(edge) = self.add_edge(a, role, literal, ds) {
            self.tracker.add_edge(edge);
        }
    }

    pub fn add_same(&mut self, a: &Name, b: &Name) {
        self.add_concept_assertion(a, Concept::nominal(b.clone()));
        self.add_individual(b.clone());
    }

    pub fn add_different(&mut self, a: &Name, b: &Name) {
        let x = self.add_individual(a.clone());
        let y = self.add_individual(b.clone());
        let (x, dx) = self.graph.representative(x);
        let (y, dy) = self.graph.representative(y);
        let ds = dx.union(&dy);
        if x == y {
            self.set_clash(Clash::new(x, ClashKind::Different(y), ds));
            return;
        }
        self.graph.add_different(x, y, ds);
        self.tracker.update_individual(x);
        self.tracker.update_individual(y);
    }

    /// Applies an ABox axiom as an independent fact. Other axioms are rejected.
    pub fn apply_axiom(&mut self, axiom: &Axiom) -> Result<()> {
        match axiom {
            Axiom::ClassAssertion(class, name) => {
                self.add_concept_assertion(name, class.to_concept());
            }
            Axiom::ObjectPropertyAssertion(property, a, b) => {
                self.add_role_assertion(a, &property.to_role(), b);
            }
            Axiom::NegativeObjectPropertyAssertion(property, a, b) => {
                self.add_individual(b.clone());
                let concept = Concept::all(property.to_role(), Concept::nominal(b.clone()).negate());
                self.add_concept_assertion(a, concept);
            }
            Axiom::DataPropertyAssertion(property, a, value) => {
                self.add_data_assertion(a, &Role::new(property.clone()), value.clone());
            }
            Axiom::NegativeDataPropertyAssertion(property, a, value) => {
                let concept = Concept::all(Role::new(property.clone()), Concept::value(value.clone()).negate());
                self.add_concept_assertion(a, concept);
            }
            Axiom::SameIndividual(names) => {
                for pair in names.windows(2) {
                    self.add_same(&pair[0], &pair[1]);
                }
            }
            Axiom::DifferentIndividuals(names) => {
                for (i, a) in names.iter().enumerate() {
                    for b in &names[i + 1..] {
                        self.add_different(a, b);
                    }
                }
            }
            other => {
                return Err(ReasonerError::Unsupported(format!(
                    "not an assertion: {:?}",
                    other.kind()
                )))
            }
        }
        Ok(())
    }

    /// Records a retracted assertion. Derived facts cannot be withdrawn
    /// one by one, so the owner rebuilds the strategy before the next run.
    pub fn record_deletion(&mut self, axiom: &Axiom) {
        match axiom {
            Axiom::ClassAssertion(class, name) => {
                self.tracker.delete_type(name.clone(), class.to_concept());
            }
            Axiom::ObjectPropertyAssertion(_, a, b) => {
                self.tracker.delete_edge(a.clone(), b.clone());
            }
            Axiom::DataPropertyAssertion(_, a, value) => {
                self.tracker.delete_edge(a.clone(), Name::new(value.to_string()));
            }
            other => {
                for name in other.individuals() {
                    self.tracker.delete_type(name.clone(), Concept::top());
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Main loop
    // ------------------------------------------------------------------

    /// Expands until the graph is complete or every branch clashed. Polls
    /// `budget` before each queue pop.
    pub fn run(&mut self, budget: &ReasoningBudget) -> Result<CompletionOutcome> {
        match self.state {
            StrategyState::Clashed => {
                let witness = self.witness.clone().ok_or_else(|| {
                    ReasonerError::internal("clashed strategy without a witness")
                })?;
                return Ok(CompletionOutcome::Clashed(witness));
            }
            StrategyState::Initializing => {
                let nodes: Vec<NodeId> = self.graph.nodes().map(|n| n.id()).collect();
                for node in nodes {
                    self.queue.enqueue_all(node);
                }
                self.tracker.clear();
            }
            StrategyState::Complete => self.seed_from_tracker(),
            StrategyState::Expanding => {}
        }
        self.state = StrategyState::Expanding;

        loop {
            budget.check()?;

            if let Some(clash) = self.clash.take() {
                if !self.backtrack(clash.clone())? {
                    debug!(clash = %clash, "completion clashed");
                    self.state = StrategyState::Clashed;
                    self.witness = Some(clash.clone());
                    self.record_result(false)?;
                    return Ok(CompletionOutcome::Clashed(clash));
                }
                continue;
            }

            match self.queue.next() {
                Some((selector, node)) => {
                    if !self.graph.is_live(node) {
                        continue;
                    }
                    self.stats.rule_applications += 1;
                    self.apply_rule(selector, node)?;
                    if let Some(limit) = self.ctx.config.max_nodes {
                        if self.graph.live_count() > limit {
                            return Err(ReasonerError::NodeLimitExceeded(limit));
                        }
                    }
                }
                None => {
                    if !self.wake_pending() {
                        debug!(
                            nodes = self.graph.live_count(),
                            branches = self.branches.len(),
                            "completion finished"
                        );
                        self.state = StrategyState::Complete;
                        self.record_result(true)?;
                        return Ok(CompletionOutcome::Complete);
                    }
                }
            }
        }
    }

    /// Incremental seeding from the recorded changes.
    fn seed_from_tracker(&mut self) {
        for node in self.tracker.new_individuals().clone() {
            self.queue.enqueue(node, Selector::Unfolding);
            self.queue.enqueue(node, Selector::Universal);
        }
        for edge in self.tracker.new_edges().to_vec() {
            for node in [edge.from, edge.to] {
                self.queue.enqueue(node, Selector::Universal);
                self.queue.enqueue(node, Selector::Max);
            }
        }
        for node in self.tracker.updated_individuals().clone() {
            self.queue.enqueue(node, Selector::Nominal);
            self.queue.enqueue(node, Selector::Universal);
        }
        for node in self.tracker.unpruned().clone() {
            self.queue.enqueue_all(node);
        }
        self.tracker.clear();
    }

    /// Re-queues pending nodes that are no longer blocked.
    fn wake_pending(&mut self) -> bool {
        let pending = std::mem::take(&mut self.pending);
        let mut woke = false;
        for node in pending {
            if !self.graph.is_live(node) {
                continue;
            }
            if self.is_blocked(node) {
                self.pending.insert(node);
            } else {
                self.queue.enqueue(node, Selector::Existential);
                self.queue.enqueue(node, Selector::Min);
                woke = true;
            }
        }
        woke
    }

    /// Writes the verdict of a concept test to the satisfiability cache.
    fn record_result(&self, satisfiable: bool) -> Result<()> {
        let Some((root, concept)) = &self.subject else {
            return Ok(());
        };
        if !self.ctx.config.use_cache || self.from_abox {
            return Ok(());
        }
        if !satisfiable {
            return self.ctx.cache.put_sat(concept, false, None);
        }
        if self.ctx.expressivity.nominals {
            return Ok(());
        }
        let model = CachedConceptNode::from_graph(&self.graph, *root, true);
        self.ctx.cache.put_sat(concept, true, Some(model))
    }

    // ------------------------------------------------------------------
    // Backtracking
    // ------------------------------------------------------------------

    /// Returns `false` when the clash depends on no branch.
    fn backtrack(&mut self, mut clash: Clash) -> Result<bool> {
        loop {
            self.stats.backtracks += 1;
            if clash.is_independent() {
                return Ok(false);
            }
            let depth = clash.ds.max();
            while self.branches.last().map(|b| b.index > depth).unwrap_or(false) {
                self.branches.pop();
            }
            let Some(branch) = self.branches.last_mut() else {
                return Err(ReasonerError::internal(format!(
                    "clash depends on branch {} but the stack is empty",
                    depth
                )));
            };
            if branch.index != depth {
                return Err(ReasonerError::internal(format!(
                    "clash depends on branch {} which is not on the stack",
                    depth
                )));
            }

            branch.record_failure(&clash.ds);
            if branch.has_next() {
                branch.tried += 1;
                debug!(branch = depth, alternative = branch.tried, clash = %clash, "backtrack");
                self.restore(depth - 1);
                self.apply_branch(self.branches.len() - 1);
                return Ok(true);
            }

            let branch = self
                .branches
                .pop()
                .ok_or_else(|| ReasonerError::internal("branch stack emptied while backtracking"))?;
            let ds = clash.ds.without(depth).union(&branch.prev_ds).union(&branch.term_ds);
            clash = Clash::new(branch.node(), ClashKind::Exhausted, ds);
        }
    }

    fn restore(&mut self, depth: u32) {
        self.stats.restores += 1;
        let report = self.graph.restore(depth);
        trace!(depth, undone = report.undone, touched = report.touched.len(), "restore");
        self.tracker.add_unpruned(report.unpruned.iter().copied());
        let mut touched: Vec<NodeId> = report.touched.into_iter().collect();
        touched.extend(report.unpruned);
        self.queue.flush_for_restore(&mut self.graph, touched);
        self.clash = None;
    }

    pub(crate) fn push_branch(&mut self, kind: BranchKind, term_ds: DependencySet) {
        let index = self.branches.len() as u32 + 1;
        let branch = Branch::new(index, kind, term_ds);
        debug!(branch = index, node = %branch.node(), alternatives = branch.total(), "branch");
        self.stats.branches += 1;
        self.branches.push(branch);
        self.apply_branch(self.branches.len() - 1);
    }

    fn apply_branch(&mut self, position: usize) {
        let branch = self.branches[position].clone();
        let ds = branch.alternative_ds();
        match &branch.kind {
            BranchKind::Disjunction { node, disjuncts, .. } => {
                if self.ctx.config.semantic_branching {
                    let failed_ds = branch.term_ds.union(&branch.prev_ds);
                    for failed in &disjuncts[..branch.tried] {
                        self.add_type(*node, failed.negate(), failed_ds.clone());
                    }
                }
                self.add_type(*node, disjuncts[branch.tried].clone(), ds);
            }
            BranchKind::Merge { pairs, .. } => {
                let (from, into) = pairs[branch.tried];
                self.merge_nodes(from, into, ds);
            }
        }
    }

    // ------------------------------------------------------------------
    // Facts
    // ------------------------------------------------------------------

    pub(crate) fn set_clash(&mut self, clash: Clash) {
        trace!(clash = %clash, ds = %clash.ds, "clash");
        match &self.clash {
            Some(existing) if existing.ds.max() <= clash.ds.max() => {}
            _ => self.clash = Some(clash),
        }
    }

    /// Adds `concept` to the representative of `node`, checks for a clash
    /// and schedules the rule that handles the concept.
    pub(crate) fn add_type(&mut self, node: NodeId, concept: Concept, ds: DependencySet) {
        if self.clash.is_some() {
            return;
        }
        let (node, merge_ds) = self.graph.representative(node);
        let ds = ds.union(&merge_ds);
        if self.graph.node(node).is_literal() && !is_data_concept(&concept) {
            return;
        }

        let change = self.graph.add_type(node, concept.clone(), ds.clone());
        if !change.changed() {
            return;
        }
        trace!(node = %node, concept = %concept, ds = %ds, "add type");
        if let Some(clash) = self.graph.clash_for_type(node, &concept) {
            self.set_clash(clash);
            return;
        }

        if let Some(selector) = Selector::for_concept(&concept) {
            self.queue.enqueue(node, selector);
        }
        if change == TypeChange::Added {
            if let Some(ConceptKind::HasSelf(role)) = concept.as_not().map(|c| c.kind()) {
                self.check_self_loops(node, role, &ds);
            }
            // ≤-restrictions of neighbours count this node by its label
            for neighbour in self.graph.adjacent(node) {
                self.queue.enqueue(neighbour, Selector::Max);
            }
        }
    }

    fn check_self_loops(&mut self, node: NodeId, role: &Role, ds: &DependencySet) {
        let loops = self.graph.edges_between(node, node);
        if let Some((_, edge_ds)) = loops
            .iter()
            .find(|(e, _)| self.ctx.rbox.is_sub_role_of(e, role))
        {
            self.set_clash(Clash::new(
                node,
                ClashKind::SelfRestriction(role.clone()),
                ds.union(edge_ds),
            ));
        }
    }

    /// Adds an edge between the representatives of `from` and `to` and
    /// applies its immediate consequences.
    pub(crate) fn add_edge(&mut self, from: NodeId, role: &Role, to: NodeId, ds: DependencySet) -> Option<Edge> {
        if self.clash.is_some() {
            return None;
        }
        let (from, from_ds) = self.graph.representative(from);
        let (to, to_ds) = self.graph.representative(to);
        let ds = ds.union(&from_ds).union(&to_ds);
        let edge = self.graph.add_edge(from, role, to, ds)?;
        trace!(from = %edge.from, role = %edge.role, to = %edge.to, ds = %edge.ds, "add edge");
        self.edge_effects(&edge);
        Some(edge)
    }

    /// Domain and range, role characteristic clashes, direct universal
    /// propagation from both endpoints and a `Max` re-check of both.
    pub(crate) fn edge_effects(&mut self, edge: &Edge) {
        let rbox = self.ctx.rbox.clone();
        let (from, to, role, ds) = (edge.from, edge.to, &edge.role, &edge.ds);

        for sup in rbox.super_roles(role) {
            for domain in rbox.domains(sup) {
                self.add_type(from, domain.concept.clone(), ds.clone());
            }
            for range in rbox.ranges(sup) {
                self.add_type(to, range.concept.clone(), ds.clone());
            }
        }

        if from == to {
            if rbox.is_irreflexive(role) {
                self.set_clash(Clash::new(from, ClashKind::Irreflexive(role.clone()), ds.clone()));
                return;
            }
            let negated_selves: Vec<(Role, DependencySet)> = self
                .graph
                .node(from)
                .types()
                .filter_map(|(c, d)| match c.as_not().map(|inner| inner.kind()) {
                    Some(ConceptKind::HasSelf(s)) if rbox.is_sub_role_of(role, s) => {
                        Some((s.clone(), d.clone()))
                    }
                    _ => None,
                })
                .collect();
            if let Some((s, d)) = negated_selves.into_iter().next() {
                self.set_clash(Clash::new(from, ClashKind::SelfRestriction(s), ds.union(&d)));
                return;
            }
        }

        for (other, other_ds) in self.graph.edges_between(from, to) {
            if &other == role {
                continue;
            }
            if rbox.are_disjoint(role, &other) {
                self.set_clash(Clash::new(
                    from,
                    ClashKind::DisjointRoles(role.clone(), other),
                    ds.union(&other_ds),
                ));
                return;
            }
        }
        let asymmetric: Vec<&Role> = rbox
            .super_roles(role)
            .iter()
            .filter(|s| rbox.is_asymmetric(s))
            .collect();
        if !asymmetric.is_empty() {
            for (back, back_ds) in self.graph.edges_between(to, from) {
                if asymmetric.iter().any(|s| rbox.is_sub_role_of(&back, s)) {
                    self.set_clash(Clash::new(from, ClashKind::Asymmetric(role.clone()), ds.union(&back_ds)));
                    return;
                }
            }
        }

        self.propagate_universals(from, to, role, ds);
        self.propagate_universals(to, from, &role.inverse(), ds);
        self.queue.enqueue(from, Selector::Max);
        self.queue.enqueue(to, Selector::Max);
    }

    /// Merges the representatives of `a` and `b`, keeping the one preferred
    /// by [`CompletionStrategy::merge_order`].
    pub(crate) fn merge_nodes(&mut self, a: NodeId, b: NodeId, ds: DependencySet) {
        if self.clash.is_some() {
            return;
        }
        let (a, da) = self.graph.representative(a);
        let (b, db) = self.graph.representative(b);
        if a == b {
            return;
        }
        let ds = ds.union(&da).union(&db);
        let (from, into) = self.merge_order(a, b);
        debug!(from = %from, into = %into, ds = %ds, "merge");
        self.stats.merges += 1;

        let effects = self.graph.merge(from, into, ds);
        if let Some(clash) = effects.clash {
            self.set_clash(clash);
            return;
        }
        for (concept, _) in &effects.types {
            if let Some(clash) = self.graph.clash_for_type(into, concept) {
                self.set_clash(clash);
                return;
            }
        }
        for edge in &effects.edges {
            self.edge_effects(edge);
        }
        self.queue.enqueue_all(into);
        for neighbour in self.graph.adjacent(into) {
            self.queue.enqueue(neighbour, Selector::Max);
        }
        if self.graph.node(into).is_named() || self.graph.node(from).is_named() {
            self.tracker.update_individual(into);
        }
    }

    /// `(merged, kept)`: roots before blockable nodes, then shallower nodes,
    /// then the node with more edges, then the older node.
    pub(crate) fn merge_order(&self, a: NodeId, b: NodeId) -> (NodeId, NodeId) {
        let key = |id: NodeId| {
            let node = self.graph.node(id);
            (
                !node.is_root(),
                node.depth(),
                std::cmp::Reverse(node.edge_count()),
                id,
            )
        };
        if key(a) <= key(b) {
            (b, a)
        } else {
            (a, b)
        }
    }

    // ------------------------------------------------------------------
    // Blocking
    // ------------------------------------------------------------------

    pub fn is_blocked(&self, node: NodeId) -> bool {
        self.ctx.blocking.is_blocked(&self.graph, node) || self.is_cache_blocked(node)
    }

    /// The label of `node` lies inside the cached model of its origin filler.
    pub fn is_cache_blocked(&self, node: NodeId) -> bool {
        if !self.ctx.can_cache_block() {
            return false;
        }
        let n = self.graph.node(node);
        if !n.is_blockable() {
            return false;
        }
        let Some(origin) = n.origin() else {
            return false;
        };
        let Some(model) = self.ctx.cache.model(origin) else {
            return false;
        };
        n.types().all(|(c, _)| model.has_type(c))
            && self.ctx.safety.is_safe(&self.graph, node, &model, &self.ctx.rbox)
    }

    // ------------------------------------------------------------------
    // Queries over the current graph
    // ------------------------------------------------------------------

    /// Concepts in the label of an individual that depend on no branch.
    pub fn obvious_types(&self, name: &Name) -> Vec<Concept> {
        let Some(node) = self.individual_node(name) else {
            return Vec::new();
        };
        let mut types: Vec<Concept> = self
            .graph
            .node(node)
            .types()
            .filter(|(_, ds)| ds.is_independent())
            .map(|(c, _)| c.clone())
            .collect();
        types.sort();
        types
    }

    /// Named classes in the label of an individual, with or without branch dependencies.
    pub fn possible_types(&self, name: &Name) -> Vec<Name> {
        let Some(node) = self.individual_node(name) else {
            return Vec::new();
        };
        let mut names: Vec<Name> = self
            .graph
            .node(node)
            .types()
            .filter_map(|(c, _)| c.as_atom().cloned())
            .collect();
        names.sort();
        names
    }
}

/// Built from data ranges only (`⊥` included).
fn is_data_concept(concept: &Concept) -> bool {
    match concept.kind() {
        ConceptKind::Datatype(_) | ConceptKind::Value(_) => true,
        ConceptKind::Not(inner) => inner.is_top() || is_data_concept(inner),
        ConceptKind::And(operands) => operands.iter().all(is_data_concept),
        _ => false,
    }
}

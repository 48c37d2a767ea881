//! Deltas recorded between two consistency checks.

use crate::graph::{Edge, NodeId};
use mimizuku_core::{Concept, Name};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    new_individuals: BTreeSet<NodeId>,
    new_edges: Vec<Edge>,
    /// Individuals whose label or identity changed.
    updated_individuals: BTreeSet<NodeId>,
    unpruned: BTreeSet<NodeId>,
    deleted_edges: Vec<(Name, Name)>,
    deleted_types: Vec<(Name, Concept)>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_individual(&mut self, node: NodeId) {
        self.new_individuals.insert(node);
    }

    pub fn add_edge(&mut self, edge: Edge) {
        self.new_edges.push(edge);
    }

    pub fn update_individual(&mut self, node: NodeId) {
        self.updated_individuals.insert(node);
    }

    pub fn add_unpruned<I: IntoIterator<Item = NodeId>>(&mut self, nodes: I) {
        self.unpruned.extend(nodes);
    }

    pub fn delete_edge(&mut self, subject: Name, object: Name) {
        self.deleted_edges.push((subject, object));
    }

    pub fn delete_type(&mut self, individual: Name, concept: Concept) {
        self.deleted_types.push((individual, concept));
    }

    pub fn new_individuals(&self) -> &BTreeSet<NodeId> {
        &self.new_individuals
    }

    pub fn new_edges(&self) -> &[Edge] {
        &self.new_edges
    }

    pub fn updated_individuals(&self) -> &BTreeSet<NodeId> {
        &self.updated_individuals
    }

    pub fn unpruned(&self) -> &BTreeSet<NodeId> {
        &self.unpruned
    }

    pub fn deleted_edges(&self) -> &[(Name, Name)] {
        &self.deleted_edges
    }

    pub fn deleted_types(&self) -> &[(Name, Concept)] {
        &self.deleted_types
    }

    /// Deletions cannot be applied to a completed graph.
    pub fn has_deletions(&self) -> bool {
        !self.deleted_edges.is_empty() || !self.deleted_types.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.new_individuals.is_empty()
            && self.new_edges.is_empty()
            && self.updated_individuals.is_empty()
            && self.unpruned.is_empty()
            && !self.has_deletions()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

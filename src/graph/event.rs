//! Transaction change-sets and before-commit handler registration
//!
//! A [`ChangeSet`] captures the structural deltas a pending transaction
//! would apply. Hosts hand it to every subscribed [`TransactionHandler`]
//! before commit; any handler may veto.

use super::types::{EdgeId, EdgeType, Label, NodeId};
use super::view::GraphView;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// A label assigned to or removed from a node
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LabelEntry {
    pub node: NodeId,
    pub label: Label,
}

/// A relationship created or deleted by the transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipEntry {
    pub id: EdgeId,
    pub edge_type: EdgeType,
    pub start: NodeId,
    pub end: NodeId,
}

/// Structural deltas of one transaction
#[derive(Debug, Clone, Default)]
pub struct ChangeSet {
    created_nodes: Vec<NodeId>,
    deleted_nodes: Vec<NodeId>,
    assigned_labels: Vec<LabelEntry>,
    removed_labels: Vec<LabelEntry>,
    created_relationships: Vec<RelationshipEntry>,
    deleted_relationships: Vec<RelationshipEntry>,
    /// Labels deleted nodes carried before deletion
    deleted_node_labels: HashMap<NodeId, Vec<Label>>,
    property_changes: usize,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_created_node(&mut self, node: NodeId) {
        self.created_nodes.push(node);
    }

    /// Record a deletion together with the labels the node had
    pub fn record_deleted_node(&mut self, node: NodeId, labels: Vec<Label>) {
        self.deleted_nodes.push(node);
        self.deleted_node_labels.insert(node, labels);
    }

    pub fn record_assigned_label(&mut self, node: NodeId, label: Label) {
        self.assigned_labels.push(LabelEntry { node, label });
    }

    pub fn record_removed_label(&mut self, node: NodeId, label: Label) {
        self.removed_labels.push(LabelEntry { node, label });
    }

    pub fn record_created_relationship(&mut self, entry: RelationshipEntry) {
        self.created_relationships.push(entry);
    }

    pub fn record_deleted_relationship(&mut self, entry: RelationshipEntry) {
        self.deleted_relationships.push(entry);
    }

    /// Record a non-structural write (node or graph property)
    pub fn record_property_change(&mut self) {
        self.property_changes += 1;
    }

    pub fn created_nodes(&self) -> &[NodeId] {
        &self.created_nodes
    }

    pub fn deleted_nodes(&self) -> &[NodeId] {
        &self.deleted_nodes
    }

    pub fn assigned_labels(&self) -> &[LabelEntry] {
        &self.assigned_labels
    }

    pub fn removed_labels(&self) -> &[LabelEntry] {
        &self.removed_labels
    }

    pub fn created_relationships(&self) -> &[RelationshipEntry] {
        &self.created_relationships
    }

    pub fn deleted_relationships(&self) -> &[RelationshipEntry] {
        &self.deleted_relationships
    }

    pub fn property_change_count(&self) -> usize {
        self.property_changes
    }

    /// True when the transaction touches nodes, labels or relationships
    pub fn is_structural(&self) -> bool {
        !(self.created_nodes.is_empty()
            && self.deleted_nodes.is_empty()
            && self.assigned_labels.is_empty()
            && self.removed_labels.is_empty()
            && self.created_relationships.is_empty()
            && self.deleted_relationships.is_empty())
    }

    /// True when nothing at all was recorded
    pub fn is_empty(&self) -> bool {
        !self.is_structural() && self.property_changes == 0
    }

    /// Labels of `node` as this change-set sees them: the pre-deletion
    /// labels for nodes it deleted, the post-transaction labels otherwise.
    pub fn labels_in_view<G: GraphView + ?Sized>(&self, graph: &G, node: NodeId) -> Vec<Label> {
        match self.deleted_node_labels.get(&node) {
            Some(labels) => labels.clone(),
            None => graph.node_labels(node),
        }
    }
}

/// A handler's refusal to let a transaction commit
///
/// Hosts treat the reason as opaque; callers that know which handler vetoed
/// can recover its error with [`Veto::downcast_ref`].
#[derive(Error, Debug)]
#[error("{reason}")]
pub struct Veto {
    reason: Box<dyn StdError + Send + Sync + 'static>,
}

impl Veto {
    pub fn new<E: StdError + Send + Sync + 'static>(reason: E) -> Self {
        Veto {
            reason: Box::new(reason),
        }
    }

    pub fn reason(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.reason.as_ref()
    }

    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.reason.downcast_ref::<E>()
    }
}

/// Callback invoked before a transaction commits
pub trait TransactionHandler: Send + Sync {
    /// Inspect the change-set against the post-transaction graph; an error vetoes the commit
    fn before_commit(&self, changes: &ChangeSet, graph: &dyn GraphView) -> Result<(), Veto>;
}

/// Registration handle returned by [`TransactionEvents::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Host capability for (un)registering before-commit handlers
pub trait TransactionEvents: Send + Sync {
    fn subscribe(&self, handler: Arc<dyn TransactionHandler>) -> HandlerId;

    /// Returns false if the handle was not registered
    fn unsubscribe(&self, id: HandlerId) -> bool;
}

/// Thread-safe list of subscribed handlers
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<Vec<(HandlerId, Arc<dyn TransactionHandler>)>>,
    next_id: AtomicU64,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of subscribed handlers
    pub fn len(&self) -> usize {
        self.handlers.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every handler in subscription order, stopping at the first veto
    pub fn before_commit(&self, changes: &ChangeSet, graph: &dyn GraphView) -> Result<(), Veto> {
        // Handlers may (un)subscribe while running, so work on a copy.
        let handlers: Vec<Arc<dyn TransactionHandler>> = self
            .handlers
            .read()
            .unwrap()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        for handler in handlers {
            handler.before_commit(changes, graph)?;
        }
        Ok(())
    }
}

impl TransactionEvents for HandlerRegistry {
    fn subscribe(&self, handler: Arc<dyn TransactionHandler>) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().unwrap().push((id, handler));
        id
    }

    fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.write().unwrap();
        let before = handlers.len();
        handlers.retain(|(hid, _)| *hid != id);
        handlers.len() != before
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.len())
            .finish()
    }
}

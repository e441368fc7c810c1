//! In-memory graph host with before-commit validation
//!
//! [`GraphStore`] is a small embedded host for the constraint engine: all
//! writes go through a [`Transaction`], which records a [`ChangeSet`] and,
//! on commit, hands it to every subscribed handler. Each write also logs
//! its inverse; a veto replays that log backwards, so a rejected
//! transaction is never partially applied.

use super::edge::Edge;
use super::event::{ChangeSet, HandlerRegistry, RelationshipEntry, Veto};
use super::node::Node;
use super::property::PropertyValue;
use super::types::{Direction, EdgeId, EdgeType, Label, NodeId};
use super::view::{GraphView, Incident};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during graph operations
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Node {0} not found")]
    NodeNotFound(NodeId),

    #[error("Edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("Invalid edge: source node {0} does not exist")]
    InvalidEdgeSource(NodeId),

    #[error("Invalid edge: target node {0} does not exist")]
    InvalidEdgeTarget(NodeId),

    #[error("Transaction rejected: {0}")]
    TransactionRejected(#[from] Veto),
}

pub type GraphResult<T> = Result<T, GraphError>;

/// Graph contents
///
/// - nodes / edges: arena indexed by id, `None` once deleted
/// - outgoing / incoming: adjacency lists per node, ascending edge id
#[derive(Debug, Default)]
struct GraphData {
    nodes: Vec<Option<Node>>,
    edges: Vec<Option<Edge>>,
    outgoing: Vec<Vec<EdgeId>>,
    incoming: Vec<Vec<EdgeId>>,
}

/// Inverse of one applied write
#[derive(Debug)]
enum Undo {
    CreateNode(NodeId),
    CreateEdge(EdgeId),
    AddLabel(NodeId, Label),
    RemoveLabel(NodeId, Label),
    SetProperty(NodeId, String, Option<PropertyValue>),
    DeleteEdge(Edge),
    DeleteNode(Node),
}

impl GraphData {
    fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.as_u64() as usize).and_then(Option::as_ref)
    }

    fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.as_u64() as usize).and_then(Option::as_mut)
    }

    fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.as_u64() as usize).and_then(Option::as_ref)
    }

    fn create_node(&mut self, labels: Vec<Label>) -> NodeId {
        let node_id = NodeId::new(self.nodes.len() as u64);
        self.nodes.push(Some(Node::new_with_labels(node_id, labels)));
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        node_id
    }

    fn add_label(&mut self, node_id: NodeId, label: Label) -> GraphResult<bool> {
        let node = self.get_node_mut(node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        Ok(node.add_label(label))
    }

    fn remove_label(&mut self, node_id: NodeId, label: &Label) -> GraphResult<bool> {
        let node = self.get_node_mut(node_id).ok_or(GraphError::NodeNotFound(node_id))?;
        Ok(node.remove_label(label))
    }

    fn create_edge(&mut self, source: NodeId, target: NodeId, edge_type: EdgeType) -> GraphResult<EdgeId> {
        if self.get_node(source).is_none() {
            return Err(GraphError::InvalidEdgeSource(source));
        }
        if self.get_node(target).is_none() {
            return Err(GraphError::InvalidEdgeTarget(target));
        }

        let edge_id = EdgeId::new(self.edges.len() as u64);
        self.outgoing[source.as_u64() as usize].push(edge_id);
        self.incoming[target.as_u64() as usize].push(edge_id);
        self.edges.push(Some(Edge::new(edge_id, source, target, edge_type)));
        Ok(edge_id)
    }

    fn delete_edge(&mut self, id: EdgeId) -> GraphResult<Edge> {
        let edge = self
            .edges
            .get_mut(id.as_u64() as usize)
            .and_then(Option::take)
            .ok_or(GraphError::EdgeNotFound(id))?;

        if let Some(adj) = self.outgoing.get_mut(edge.source.as_u64() as usize) {
            adj.retain(|&eid| eid != id);
        }
        if let Some(adj) = self.incoming.get_mut(edge.target.as_u64() as usize) {
            adj.retain(|&eid| eid != id);
        }
        Ok(edge)
    }

    /// Delete a node and all its connected edges
    fn delete_node(&mut self, id: NodeId) -> GraphResult<(Node, Vec<Edge>)> {
        let idx = id.as_u64() as usize;
        let node = self
            .nodes
            .get_mut(idx)
            .and_then(Option::take)
            .ok_or(GraphError::NodeNotFound(id))?;

        let mut edge_ids = std::mem::take(&mut self.outgoing[idx]);
        for edge_id in std::mem::take(&mut self.incoming[idx]) {
            if !edge_ids.contains(&edge_id) {
                edge_ids.push(edge_id);
            }
        }

        let mut removed = Vec::with_capacity(edge_ids.len());
        for edge_id in edge_ids {
            removed.push(self.delete_edge(edge_id)?);
        }
        Ok((node, removed))
    }

    /// Apply the inverse of a write. Undos must be replayed newest first.
    fn revert(&mut self, undo: Undo) {
        match undo {
            Undo::CreateNode(_) => {
                self.nodes.pop();
                self.outgoing.pop();
                self.incoming.pop();
            }
            Undo::CreateEdge(id) => {
                if self.delete_edge(id).is_ok() {
                    self.edges.pop();
                }
            }
            Undo::AddLabel(node, label) => {
                if let Some(n) = self.get_node_mut(node) {
                    n.remove_label(&label);
                }
            }
            Undo::RemoveLabel(node, label) => {
                if let Some(n) = self.get_node_mut(node) {
                    n.add_label(label);
                }
            }
            Undo::SetProperty(node, key, previous) => {
                if let Some(n) = self.get_node_mut(node) {
                    match previous {
                        Some(value) => n.properties.insert(key, value),
                        None => n.properties.remove(&key),
                    };
                }
            }
            Undo::DeleteEdge(edge) => {
                let id = edge.id;
                restore_adjacent(&mut self.outgoing[edge.source.as_u64() as usize], id);
                restore_adjacent(&mut self.incoming[edge.target.as_u64() as usize], id);
                self.edges[id.as_u64() as usize] = Some(edge);
            }
            Undo::DeleteNode(node) => {
                let idx = node.id.as_u64() as usize;
                self.nodes[idx] = Some(node);
            }
        }
    }

    fn adjacent<'a>(&'a self, list: &'a [Vec<EdgeId>], node: NodeId) -> impl Iterator<Item = &'a Edge> + 'a {
        list.get(node.as_u64() as usize)
            .into_iter()
            .flatten()
            .filter_map(move |&id| self.get_edge(id))
    }
}

/// Put an edge id back at its original position
fn restore_adjacent(list: &mut Vec<EdgeId>, id: EdgeId) {
    if let Err(pos) = list.binary_search(&id) {
        list.insert(pos, id);
    }
}

impl GraphView for GraphData {
    fn contains_node(&self, node: NodeId) -> bool {
        self.get_node(node).is_some()
    }

    fn node_labels(&self, node: NodeId) -> Vec<Label> {
        self.get_node(node)
            .map(|n| n.get_labels().into_iter().cloned().collect())
            .unwrap_or_default()
    }

    fn has_label(&self, node: NodeId, label: &Label) -> bool {
        self.get_node(node).map_or(false, |n| n.has_label(label))
    }

    fn relationships(
        &self,
        node: NodeId,
        edge_type: Option<&EdgeType>,
        direction: Direction,
    ) -> Vec<Incident> {
        let type_matches = |edge: &Edge| edge_type.map_or(true, |t| &edge.edge_type == t);
        let mut result = Vec::new();

        if direction != Direction::Incoming {
            result.extend(
                self.adjacent(&self.outgoing, node)
                    .filter(|e| type_matches(e))
                    .map(|e| Incident { edge: e.id, other: e.target }),
            );
        }
        if direction != Direction::Outgoing {
            // Under BOTH a self-loop was already seen on the outgoing side.
            let skip_loops = direction == Direction::Both;
            result.extend(
                self.adjacent(&self.incoming, node)
                    .filter(|e| type_matches(e) && !(skip_loops && e.is_loop()))
                    .map(|e| Incident { edge: e.id, other: e.source }),
            );
        }
        result
    }
}

/// In-memory graph storage
#[derive(Debug, Default)]
pub struct GraphStore {
    data: GraphData,

    /// Handlers consulted before every commit
    events: Arc<HandlerRegistry>,
}

impl GraphStore {
    /// Create a new empty graph store
    pub fn new() -> Self {
        Self::default()
    }

    /// The handler registry; hand this to whoever subscribes validators
    pub fn events(&self) -> Arc<HandlerRegistry> {
        Arc::clone(&self.events)
    }

    /// Start a write transaction
    pub fn begin(&mut self) -> Transaction<'_> {
        Transaction {
            store: self,
            undo: Vec::new(),
            changes: ChangeSet::new(),
        }
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.data.get_node(id)
    }

    /// Check if a node exists
    pub fn has_node(&self, id: NodeId) -> bool {
        self.data.get_node(id).is_some()
    }

    /// Get an edge by ID
    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.data.get_edge(id)
    }

    /// Get all outgoing edges from a node
    pub fn get_outgoing_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.data.adjacent(&self.data.outgoing, node_id).collect()
    }

    /// Get all incoming edges to a node
    pub fn get_incoming_edges(&self, node_id: NodeId) -> Vec<&Edge> {
        self.data.adjacent(&self.data.incoming, node_id).collect()
    }

    /// Get total number of nodes
    pub fn node_count(&self) -> usize {
        self.data.nodes.iter().flatten().count()
    }

    /// Get total number of edges
    pub fn edge_count(&self) -> usize {
        self.data.edges.iter().flatten().count()
    }
}

impl GraphView for GraphStore {
    fn contains_node(&self, node: NodeId) -> bool {
        self.data.contains_node(node)
    }

    fn node_labels(&self, node: NodeId) -> Vec<Label> {
        self.data.node_labels(node)
    }

    fn has_label(&self, node: NodeId, label: &Label) -> bool {
        self.data.has_label(node, label)
    }

    fn relationships(
        &self,
        node: NodeId,
        edge_type: Option<&EdgeType>,
        direction: Direction,
    ) -> Vec<Incident> {
        self.data.relationships(node, edge_type, direction)
    }
}

/// A pending write transaction
///
/// Writes apply immediately to the store; dropping the transaction without
/// a successful [`commit`](Transaction::commit) rolls them back.
pub struct Transaction<'a> {
    store: &'a mut GraphStore,
    /// Inverse of every write so far, oldest first
    undo: Vec<Undo>,
    changes: ChangeSet,
}

impl<'a> Transaction<'a> {
    /// Create a node carrying the given labels (possibly none)
    pub fn create_node(&mut self, labels: &[&str]) -> NodeId {
        let labels: Vec<Label> = labels.iter().map(|&l| Label::new(l)).collect();
        let id = self.store.data.create_node(labels.clone());
        self.undo.push(Undo::CreateNode(id));
        self.changes.record_created_node(id);
        for label in labels {
            self.changes.record_assigned_label(id, label);
        }
        id
    }

    /// Add a label; re-adding a present label records nothing
    pub fn add_label(&mut self, node: NodeId, label: &str) -> GraphResult<()> {
        let label = Label::new(label);
        if self.store.data.add_label(node, label.clone())? {
            self.undo.push(Undo::AddLabel(node, label.clone()));
            self.changes.record_assigned_label(node, label);
        }
        Ok(())
    }

    /// Remove a label; removing an absent label records nothing
    pub fn remove_label(&mut self, node: NodeId, label: &str) -> GraphResult<()> {
        let label = Label::new(label);
        if self.store.data.remove_label(node, &label)? {
            self.undo.push(Undo::RemoveLabel(node, label.clone()));
            self.changes.record_removed_label(node, label);
        }
        Ok(())
    }

    /// Set a node property (a non-structural change)
    pub fn set_node_property(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<PropertyValue>,
    ) -> GraphResult<()> {
        let target = self.store.data.get_node_mut(node).ok_or(GraphError::NodeNotFound(node))?;
        let key = key.into();
        let previous = target.set_property(key.clone(), value);
        self.undo.push(Undo::SetProperty(node, key, previous));
        self.changes.record_property_change();
        Ok(())
    }

    /// Create a relationship between two existing nodes
    pub fn create_edge(&mut self, source: NodeId, target: NodeId, edge_type: &str) -> GraphResult<EdgeId> {
        let edge_type = EdgeType::new(edge_type);
        let id = self.store.data.create_edge(source, target, edge_type.clone())?;
        self.undo.push(Undo::CreateEdge(id));
        self.changes.record_created_relationship(RelationshipEntry {
            id,
            edge_type,
            start: source,
            end: target,
        });
        Ok(id)
    }

    /// Delete a relationship
    pub fn delete_edge(&mut self, id: EdgeId) -> GraphResult<()> {
        let edge = self.store.data.delete_edge(id)?;
        self.record_deleted_edge(edge);
        Ok(())
    }

    /// Delete a node together with its relationships
    pub fn delete_node(&mut self, id: NodeId) -> GraphResult<()> {
        let (node, edges) = self.store.data.delete_node(id)?;
        for edge in edges {
            self.record_deleted_edge(edge);
        }

        let labels: Vec<Label> = node.get_labels().into_iter().cloned().collect();
        for label in &labels {
            self.changes.record_removed_label(id, label.clone());
        }
        self.changes.record_deleted_node(id, labels);
        self.undo.push(Undo::DeleteNode(node));
        Ok(())
    }

    fn record_deleted_edge(&mut self, edge: Edge) {
        self.changes.record_deleted_relationship(RelationshipEntry {
            id: edge.id,
            edge_type: edge.edge_type.clone(),
            start: edge.source,
            end: edge.target,
        });
        self.undo.push(Undo::DeleteEdge(edge));
    }

    /// Changes recorded so far
    pub fn changes(&self) -> &ChangeSet {
        &self.changes
    }

    /// Read access to the in-transaction state
    pub fn view(&self) -> &GraphStore {
        self.store
    }

    /// Run the before-commit handlers; on veto the store is rolled back
    pub fn commit(mut self) -> GraphResult<()> {
        let store: &GraphStore = self.store;
        let outcome = store.events.before_commit(&self.changes, &store.data);

        match outcome {
            Ok(()) => {
                debug!(writes = self.undo.len(), "Transaction committed");
                self.undo.clear();
                Ok(())
            }
            Err(veto) => {
                debug!(writes = self.undo.len(), reason = %veto, "Transaction vetoed, rolling back");
                Err(GraphError::TransactionRejected(veto))
            }
        }
    }

    /// Discard every write of this transaction
    pub fn rollback(self) {}
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        while let Some(undo) = self.undo.pop() {
            self.store.data.revert(undo);
        }
    }
}

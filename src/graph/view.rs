//! Read-only graph access consumed by the constraint engine
//!
//! The engine never owns nodes or relationships. Whatever graph it runs
//! against (the in-memory [`GraphStore`](super::GraphStore) or a foreign
//! host) only has to answer label and adjacency questions.

use super::types::{Direction, EdgeId, EdgeType, Label, NodeId};

/// One relationship incident to a node, seen from that node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Incident {
    /// The relationship
    pub edge: EdgeId,
    /// The endpoint opposite to the inspected node (itself for a self-loop)
    pub other: NodeId,
}

/// Traversal capability over the post-transaction state of a graph
pub trait GraphView {
    /// Whether the node exists in this view
    fn contains_node(&self, node: NodeId) -> bool;

    /// Labels currently carried by the node; empty for unknown nodes
    fn node_labels(&self, node: NodeId) -> Vec<Label>;

    /// Relationships incident to `node` in `direction`, restricted to
    /// `edge_type` when one is given. A self-loop appears once.
    fn relationships(
        &self,
        node: NodeId,
        edge_type: Option<&EdgeType>,
        direction: Direction,
    ) -> Vec<Incident>;

    /// Check if the node carries a specific label
    fn has_label(&self, node: NodeId, label: &Label) -> bool {
        self.node_labels(node).iter().any(|l| l == label)
    }

    /// Number of incident relationships, without any endpoint filter
    fn degree(&self, node: NodeId, edge_type: Option<&EdgeType>, direction: Direction) -> usize {
        self.relationships(node, edge_type, direction).len()
    }
}

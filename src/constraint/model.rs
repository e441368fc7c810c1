//! The cardinality constraint and its degree-check algorithm

use super::cardinality::{Cardinality, Outcome};
use crate::graph::{Direction, EdgeType, GraphView, Label, NodeId};
use std::fmt;

/// Name used for a wildcard label or relationship type
pub const NO_TYPE: &str = "";

/// "Nodes labelled `from` connect to nodes labelled `to` via `edge_type`,
/// with bounded neighbour counts on both sides."
///
/// - `to_cardinality` bounds how many `to` neighbours a `from` node has
///   (the forward role, traversed along `direction`).
/// - `from_cardinality` bounds how many `from` neighbours a `to` node has
///   (the reverse role, traversed against `direction`).
///
/// `None` for a label or the type is a wildcard. Immutable once built;
/// equality and ordering are by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constraint {
    from_label: Option<Label>,
    to_label: Option<Label>,
    edge_type: Option<EdgeType>,
    direction: Direction,
    from_cardinality: Cardinality,
    to_cardinality: Cardinality,
}

impl Constraint {
    /// Build a constraint. Empty label or type names are wildcards.
    pub fn new(
        from_label: Option<Label>,
        to_label: Option<Label>,
        edge_type: Option<EdgeType>,
        direction: Direction,
        from_cardinality: Cardinality,
        to_cardinality: Cardinality,
    ) -> Self {
        Constraint {
            from_label: from_label.filter(|l| !l.as_str().trim().is_empty()),
            to_label: to_label.filter(|l| !l.as_str().trim().is_empty()),
            edge_type: edge_type.filter(|t| !t.as_str().trim().is_empty()),
            direction,
            from_cardinality,
            to_cardinality,
        }
    }

    pub fn from_label(&self) -> Option<&Label> {
        self.from_label.as_ref()
    }

    pub fn to_label(&self) -> Option<&Label> {
        self.to_label.as_ref()
    }

    pub fn edge_type(&self) -> Option<&EdgeType> {
        self.edge_type.as_ref()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn from_cardinality(&self) -> Cardinality {
        self.from_cardinality
    }

    pub fn to_cardinality(&self) -> Cardinality {
        self.to_cardinality
    }

    pub fn min_from(&self) -> i64 {
        self.from_cardinality.lower()
    }

    pub fn max_from(&self) -> i64 {
        self.from_cardinality.upper()
    }

    pub fn min_to(&self) -> i64 {
        self.to_cardinality.lower()
    }

    pub fn max_to(&self) -> i64 {
        self.to_cardinality.upper()
    }

    /// `from` label name, [`NO_TYPE`] for a wildcard
    pub fn from_name(&self) -> &str {
        self.from_label.as_ref().map_or(NO_TYPE, Label::as_str)
    }

    /// `to` label name, [`NO_TYPE`] for a wildcard
    pub fn to_name(&self) -> &str {
        self.to_label.as_ref().map_or(NO_TYPE, Label::as_str)
    }

    /// Relationship type name, [`NO_TYPE`] for a wildcard
    pub fn type_name(&self) -> &str {
        self.edge_type.as_ref().map_or(NO_TYPE, EdgeType::as_str)
    }

    /// Label-only applicability test: a wildcard side, or the node carries
    /// the `from` or the `to` label.
    pub fn matches<G: GraphView + ?Sized>(&self, graph: &G, node: NodeId) -> bool {
        match (&self.from_label, &self.to_label) {
            (Some(from), Some(to)) => graph.has_label(node, from) || graph.has_label(node, to),
            _ => true,
        }
    }

    /// Check both roles of `node`. A forward-role violation is reported
    /// without evaluating the reverse role.
    pub fn check<G: GraphView + ?Sized>(&self, graph: &G, node: NodeId) -> Outcome {
        let forward = self.check_forward_role(graph, node);
        if !forward.is_ok() {
            return forward;
        }
        self.check_reverse_role(graph, node)
    }

    /// Count `to` neighbours of a `from` node along `direction`.
    /// Nodes not carrying the `from` label are not in this role.
    pub fn check_forward_role<G: GraphView + ?Sized>(&self, graph: &G, node: NodeId) -> Outcome {
        if !Self::plays_role(graph, node, self.from_label.as_ref()) {
            return Outcome::Ok;
        }
        let degree = self.degree(graph, node, self.direction, self.to_label.as_ref());
        self.to_cardinality.check(degree)
    }

    /// Count `from` neighbours of a `to` node against `direction`.
    /// Nodes not carrying the `to` label are not in this role.
    pub fn check_reverse_role<G: GraphView + ?Sized>(&self, graph: &G, node: NodeId) -> Outcome {
        if !Self::plays_role(graph, node, self.to_label.as_ref()) {
            return Outcome::Ok;
        }
        let degree = self.degree(graph, node, self.direction.reverse(), self.from_label.as_ref());
        self.from_cardinality.check(degree)
    }

    fn plays_role<G: GraphView + ?Sized>(graph: &G, node: NodeId, label: Option<&Label>) -> bool {
        label.map_or(true, |l| graph.has_label(node, l))
    }

    /// Degree of `node` restricted to this constraint's type, optionally
    /// counting only relationships whose other endpoint carries `other_label`.
    /// Linear in the node's incident relationships of that type.
    fn degree<G: GraphView + ?Sized>(
        &self,
        graph: &G,
        node: NodeId,
        direction: Direction,
        other_label: Option<&Label>,
    ) -> usize {
        let edge_type = self.edge_type.as_ref();
        match other_label {
            None => graph.degree(node, edge_type, direction),
            Some(label) => graph
                .relationships(node, edge_type, direction)
                .into_iter()
                .filter(|incident| graph.has_label(incident.other, label))
                .count(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let left = if self.direction == Direction::Incoming { "<" } else { "" };
        let right = if self.direction == Direction::Outgoing { ">" } else { "" };
        write!(
            f,
            "(:{}){}-[:{}]-{}(:{}) OF {}:{}",
            self.from_name(),
            left,
            self.type_name(),
            right,
            self.to_name(),
            self.from_cardinality,
            self.to_cardinality
        )
    }
}

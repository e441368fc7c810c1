//! Aggregated violations of one rejected transaction

use crate::constraint::{Constraint, Outcome};
use crate::graph::NodeId;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;

/// Violations per node, in the order nodes were checked
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationReport {
    nodes: IndexMap<NodeId, IndexMap<Constraint, Outcome>>,
}

impl ViolationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the violations of one node; empty maps are ignored
    pub fn insert(&mut self, node: NodeId, violations: IndexMap<Constraint, Outcome>) {
        if !violations.is_empty() {
            self.nodes.insert(node, violations);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of offending nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of (node, constraint) violations
    pub fn violation_count(&self) -> usize {
        self.nodes.values().map(IndexMap::len).sum()
    }

    pub fn get(&self, node: NodeId) -> Option<&IndexMap<Constraint, Outcome>> {
        self.nodes.get(&node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &IndexMap<Constraint, Outcome>)> + '_ {
        self.nodes.iter().map(|(id, v)| (*id, v))
    }

    /// Machine-readable form: one entry per node with its violated constraints
    pub fn to_json(&self) -> Value {
        let nodes: Vec<Value> = self
            .iter()
            .map(|(node, violations)| {
                let violations: Vec<Value> = violations
                    .iter()
                    .map(|(constraint, outcome)| {
                        json!({
                            "constraint": constraint.to_string(),
                            "outcome": outcome,
                        })
                    })
                    .collect();
                json!({ "node": node.as_u64(), "violations": violations })
            })
            .collect();
        json!({ "nodes": nodes })
    }
}

impl Serialize for ViolationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl fmt::Display for ViolationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nodes violated cardinality constraints:")?;
        for (node, violations) in self.iter() {
            for (constraint, outcome) in violations {
                write!(f, "\n  {}: {} -> {}", node, constraint, outcome)?;
            }
        }
        Ok(())
    }
}

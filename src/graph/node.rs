//! Node implementation for the in-memory host graph

use super::property::{PropertyMap, PropertyValue};
use super::types::{Label, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A node in the property graph
///
/// Nodes carry any number of labels (possibly none) and properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier for this node
    pub id: NodeId,

    /// Set of labels for this node
    pub labels: HashSet<Label>,

    /// Properties associated with this node
    pub properties: PropertyMap,
}

impl Node {
    /// Create a new node with the given labels
    pub fn new_with_labels(id: NodeId, labels: Vec<Label>) -> Self {
        Node {
            id,
            labels: labels.into_iter().collect(),
            properties: PropertyMap::new(),
        }
    }

    /// Add a label to this node, returning whether it was newly added
    pub fn add_label(&mut self, label: impl Into<Label>) -> bool {
        self.labels.insert(label.into())
    }

    /// Remove a label from this node
    pub fn remove_label(&mut self, label: &Label) -> bool {
        self.labels.remove(label)
    }

    /// Check if node has a specific label
    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    /// Get all labels, sorted for stable output
    pub fn get_labels(&self) -> Vec<&Label> {
        let mut labels: Vec<&Label> = self.labels.iter().collect();
        labels.sort();
        labels
    }

    /// Set a property value
    pub fn set_property(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Option<PropertyValue> {
        self.properties.insert(key.into(), value.into())
    }

    /// Get a property value
    pub fn get_property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl std::hash::Hash for Node {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node_multiple_labels() {
        let labels = vec![Label::new("Person"), Label::new("Manager")];
        let node = Node::new_with_labels(NodeId::new(2), labels);

        assert_eq!(node.labels.len(), 2);
        assert!(node.has_label(&Label::new("Person")));
        assert!(node.has_label(&Label::new("Manager")));
        assert_eq!(node.get_labels(), vec![&Label::new("Manager"), &Label::new("Person")]);
    }

    #[test]
    fn test_add_remove_labels() {
        let mut node = Node::new_with_labels(NodeId::new(3), vec![Label::new("Person")]);

        assert!(node.add_label("Manager"));
        assert!(!node.add_label("Manager"));
        assert_eq!(node.labels.len(), 2);

        assert!(node.remove_label(&Label::new("Person")));
        assert!(!node.remove_label(&Label::new("Person")));
        assert_eq!(node.labels.len(), 1);
    }

    #[test]
    fn test_unlabelled_node() {
        let node = Node::new_with_labels(NodeId::new(4), vec![]);
        assert_eq!(node.labels.len(), 0);
        assert!(node.get_labels().is_empty());
    }

    #[test]
    fn test_node_properties() {
        let mut node = Node::new_with_labels(NodeId::new(5), vec![Label::new("Person")]);
        assert_eq!(node.set_property("name", "Alice"), None);
        assert_eq!(node.get_property("name"), Some(&PropertyValue::from("Alice")));
    }

    #[test]
    fn test_node_equality() {
        let node1 = Node::new_with_labels(NodeId::new(7), vec![Label::new("Person")]);
        let node2 = Node::new_with_labels(NodeId::new(7), vec![Label::new("Company")]);
        let node3 = Node::new_with_labels(NodeId::new(8), vec![Label::new("Person")]);

        assert_eq!(node1, node2);
        assert_ne!(node1, node3);
    }
}

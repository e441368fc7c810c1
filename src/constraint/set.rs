//! Indexed collection of constraints

use super::cardinality::Outcome;
use super::model::{Constraint, NO_TYPE};
use crate::graph::{EdgeType, GraphView, Label, NodeId};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// Ordered constraints plus coarse label/type indexes.
///
/// The indexes answer "could this node or relationship be relevant to any
/// constraint?" without evaluating constraints. A wildcard label or type is
/// indexed as [`NO_TYPE`].
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
    labels: FxHashSet<String>,
    types: FxHashSet<String>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a constraint. Duplicates are kept.
    pub fn add(&mut self, constraint: Constraint) {
        self.labels.insert(constraint.from_name().to_string());
        self.labels.insert(constraint.to_name().to_string());
        self.types.insert(constraint.type_name().to_string());
        self.constraints.push(constraint);
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Constraint> {
        self.constraints.iter()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Coarse filter on a node's labels as the graph currently reports them
    pub fn matches_node<G: GraphView + ?Sized>(&self, graph: &G, node: NodeId) -> bool {
        self.matches_labels(&graph.node_labels(node))
    }

    /// Coarse filter on a label list. An unlabelled node is relevant only
    /// when some constraint has a wildcard side.
    pub fn matches_labels(&self, labels: &[Label]) -> bool {
        if labels.is_empty() {
            return self.labels.contains(NO_TYPE);
        }
        labels.iter().any(|l| self.labels.contains(l.as_str()))
    }

    /// Whether a single label (or the wildcard, for `None`) is indexed
    pub fn matches_label(&self, label: Option<&Label>) -> bool {
        self.labels.contains(label.map_or(NO_TYPE, Label::as_str))
    }

    /// Whether a relationship type is named by some constraint
    pub fn matches_relationship(&self, edge_type: &EdgeType) -> bool {
        self.types.contains(edge_type.as_str())
    }

    /// Evaluate every applicable constraint against `node`.
    ///
    /// Returns the violated constraints with their outcome, in set order,
    /// or `None` when nothing is violated. Nodes absent from the view have
    /// no violations.
    pub fn check<G: GraphView + ?Sized>(
        &self,
        graph: &G,
        node: NodeId,
    ) -> Option<IndexMap<Constraint, Outcome>> {
        if !graph.contains_node(node) {
            return None;
        }

        let mut violations = IndexMap::new();
        for constraint in &self.constraints {
            if !constraint.matches(graph, node) {
                continue;
            }
            let outcome = constraint.check(graph, node);
            if !outcome.is_ok() {
                violations.insert(constraint.clone(), outcome);
            }
        }

        if violations.is_empty() {
            None
        } else {
            Some(violations)
        }
    }
}

impl PartialEq for ConstraintSet {
    fn eq(&self, other: &Self) -> bool {
        self.constraints == other.constraints
    }
}

impl Eq for ConstraintSet {}

impl From<Vec<Constraint>> for ConstraintSet {
    fn from(constraints: Vec<Constraint>) -> Self {
        constraints.into_iter().collect()
    }
}

impl FromIterator<Constraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        let mut set = ConstraintSet::new();
        for constraint in iter {
            set.add(constraint);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ConstraintSet {
    type Item = &'a Constraint;
    type IntoIter = std::slice::Iter<'a, Constraint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::cardinality::Cardinality;
    use crate::constraint::parser::parse_constraint;
    use crate::graph::{Direction, GraphStore};

    fn company_set() -> ConstraintSet {
        ConstraintSet::from(vec![
            parse_constraint("(:Person)-[:WORKS_FOR]->(:Company) TO many:1").unwrap(),
            parse_constraint("(:Person)-[:REPORTS_TO]->(:Manager) to 1..3:0..1").unwrap(),
        ])
    }

    #[test]
    fn test_indexes() {
        let set = company_set();
        assert_eq!(set.len(), 2);
        assert!(set.matches_label(Some(&Label::new("Person"))));
        assert!(set.matches_label(Some(&Label::new("Manager"))));
        assert!(!set.matches_label(Some(&Label::new("Product"))));
        assert!(!set.matches_label(None));
        assert!(set.matches_relationship(&EdgeType::new("WORKS_FOR")));
        assert!(!set.matches_relationship(&EdgeType::new("LIKES")));

        assert!(set.matches_labels(&[Label::new("Product"), Label::new("Company")]));
        assert!(!set.matches_labels(&[Label::new("Product")]));
        assert!(!set.matches_labels(&[]));
    }

    #[test]
    fn test_wildcard_indexed_as_empty_name() {
        let mut set = company_set();
        set.add(Constraint::new(
            None,
            Some(Label::new("Car")),
            None,
            Direction::Both,
            Cardinality::UNBOUNDED,
            Cardinality::UNBOUNDED,
        ));
        assert!(set.matches_label(None));
        assert!(set.matches_labels(&[]));
        assert!(set.matches_relationship(&EdgeType::new(NO_TYPE)));
    }

    #[test]
    fn test_add_keeps_duplicates_and_order() {
        let mut set = company_set();
        let first = set.constraints()[0].clone();
        set.add(first.clone());
        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().last(), Some(&first));
    }

    #[test]
    fn test_check_collects_violations() {
        let mut store = GraphStore::new();
        let mut tx = store.begin();
        let lone = tx.create_node(&["Person"]);
        let company = tx.create_node(&["Company"]);
        let product = tx.create_node(&["Product"]);
        tx.commit().unwrap();

        let set = company_set();
        let violations = set.check(&store, lone).unwrap();
        // No employer; having no manager is allowed
        assert_eq!(violations.len(), 1);
        assert_eq!(violations.get(&set.constraints()[0]), Some(&Outcome::TooFew));

        assert!(set.check(&store, company).is_none());
        assert!(set.check(&store, product).is_none());
        assert!(set.matches_node(&store, company));
        assert!(!set.matches_node(&store, product));
    }

    #[test]
    fn test_check_absent_node() {
        let store = GraphStore::new();
        assert!(company_set().check(&store, NodeId::new(99)).is_none());
    }

    #[test]
    fn test_equality_ignores_indexes() {
        assert_eq!(company_set(), company_set());
        assert_ne!(company_set(), ConstraintSet::new());
    }
}

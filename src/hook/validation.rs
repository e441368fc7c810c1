//! Pre-commit validation of cardinality constraints
//!
//! Per transaction the hook:
//!
//! 1. accepts immediately when the change-set has no structural change
//!    (this covers the write that stores a new constraint definition);
//! 2. reloads the constraint set, accepting when it is empty;
//! 3. derives candidate nodes from the change-set, using the set's coarse
//!    label index;
//! 4. runs the precise check on every candidate and aggregates violations;
//! 5. rejects with a [`ViolationReport`] if anything is violated.
//!
//! No state is kept between transactions.

use super::report::ViolationReport;
use crate::constraint::ConstraintSet;
use crate::graph::{ChangeSet, GraphView, NodeId, TransactionHandler, Veto};
use crate::persistence::{ConstraintPersister, PersistenceError, PropertyStore};
use indexmap::IndexSet;
use thiserror::Error;
use tracing::{debug, info};

/// Reasons a transaction is vetoed
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{0}")]
    ConstraintViolation(ViolationReport),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ValidationError {
    /// The violation report, if this is a constraint violation
    pub fn report(&self) -> Option<&ViolationReport> {
        match self {
            ValidationError::ConstraintViolation(report) => Some(report),
            ValidationError::Persistence(_) => None,
        }
    }
}

pub type ValidationResult<T> = Result<T, ValidationError>;

/// Verdict on one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject(ViolationReport),
}

impl Decision {
    pub fn is_accept(&self) -> bool {
        matches!(self, Decision::Accept)
    }
}

/// Before-commit handler enforcing the stored constraints
#[derive(Debug)]
pub struct ValidationHook<S> {
    persister: ConstraintPersister<S>,
}

impl<S: PropertyStore> ValidationHook<S> {
    pub fn new(persister: ConstraintPersister<S>) -> Self {
        Self { persister }
    }

    pub fn persister(&self) -> &ConstraintPersister<S> {
        &self.persister
    }

    /// Decide on one transaction. `graph` is the post-transaction view.
    pub fn evaluate<G: GraphView + ?Sized>(
        &self,
        changes: &ChangeSet,
        graph: &G,
    ) -> ValidationResult<Decision> {
        if !changes.is_structural() {
            debug!(
                property_changes = changes.property_change_count(),
                "No structural changes, skipping constraint check"
            );
            return Ok(Decision::Accept);
        }

        let constraints = self.persister.restore()?;
        if constraints.is_empty() {
            return Ok(Decision::Accept);
        }

        let candidates = candidates(&constraints, changes, graph);
        debug!(
            constraints = constraints.len(),
            candidates = candidates.len(),
            "Checking cardinality constraints"
        );

        let mut report = ViolationReport::new();
        for node in candidates {
            if let Some(violations) = constraints.check(graph, node) {
                report.insert(node, violations);
            }
        }

        if report.is_empty() {
            Ok(Decision::Accept)
        } else {
            info!(
                nodes = report.node_count(),
                violations = report.violation_count(),
                "Rejecting transaction"
            );
            Ok(Decision::Reject(report))
        }
    }
}

impl<S: PropertyStore> TransactionHandler for ValidationHook<S> {
    fn before_commit(&self, changes: &ChangeSet, graph: &dyn GraphView) -> Result<(), Veto> {
        match self.evaluate(changes, graph).map_err(Veto::new)? {
            Decision::Accept => Ok(()),
            Decision::Reject(report) => Err(Veto::new(ValidationError::ConstraintViolation(report))),
        }
    }
}

/// Nodes whose constraints may have been affected by `changes`, in first-seen order.
///
/// Label filtering uses the change-set's view: deleted nodes are judged by
/// the labels they carried before deletion.
pub fn candidates<G: GraphView + ?Sized>(
    constraints: &ConstraintSet,
    changes: &ChangeSet,
    graph: &G,
) -> IndexSet<NodeId> {
    let relevant = |node: NodeId| constraints.matches_labels(&changes.labels_in_view(graph, node));
    let mut candidates = IndexSet::new();

    candidates.extend(changes.created_nodes().iter().copied());

    for &node in changes.deleted_nodes() {
        if relevant(node) {
            candidates.insert(node);
        }
    }

    for entry in changes.assigned_labels().iter().chain(changes.removed_labels()) {
        if constraints.matches_label(Some(&entry.label)) && relevant(entry.node) {
            candidates.insert(entry.node);
        }
    }

    for rel in changes.created_relationships().iter().chain(changes.deleted_relationships()) {
        for endpoint in [rel.start, rel.end] {
            if relevant(endpoint) {
                candidates.insert(endpoint);
            }
        }
    }

    candidates
}

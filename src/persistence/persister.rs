//! Loads and stores the constraint set in a graph property

use super::storage::{PropertyBatch, PropertyStore};
use super::PersistenceResult;
use crate::constraint::{parse_constraint, serializer, Constraint, ConstraintSet};
use crate::graph::PropertyValue;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Default property key holding the serialized constraints
pub const CONSTRAINT_KEY: &str = "CONSTRAINT";

/// Reads and writes the constraint set under one property key
#[derive(Debug)]
pub struct ConstraintPersister<S> {
    store: S,
    key: String,
    /// Serialises read-modify-write in [`define`](Self::define)
    define_lock: Mutex<()>,
}

impl<S: PropertyStore> ConstraintPersister<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, CONSTRAINT_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            define_lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replace the stored set, in one atomic write
    pub fn persist(&self, constraints: &ConstraintSet) -> PersistenceResult<()> {
        let data = serializer::serialize(constraints);
        let mut batch = PropertyBatch::new();
        batch.set(self.key.as_str(), PropertyValue::StringArray(data));
        self.store.commit(batch)?;

        debug!(key = %self.key, constraints = constraints.len(), "Persisted constraints");
        Ok(())
    }

    /// Load the stored set. An absent property, or one that is not a
    /// string array, yields an empty set.
    pub fn restore(&self) -> PersistenceResult<ConstraintSet> {
        let value = self.store.get(&self.key)?;
        let data = value.as_ref().and_then(PropertyValue::as_string_array);
        if let (Some(other), None) = (&value, data) {
            warn!(key = %self.key, kind = other.type_name(), "Ignoring non-array constraint property");
        }

        let constraints = serializer::deserialize(data)?;
        debug!(key = %self.key, constraints = constraints.len(), "Restored constraints");
        Ok(constraints)
    }

    /// Parse `pattern` and append it to the stored set.
    ///
    /// Concurrent calls on the same persister do not lose updates.
    pub fn define(&self, pattern: &str) -> PersistenceResult<Constraint> {
        let constraint = parse_constraint(pattern)?;

        let _guard = self.define_lock.lock().unwrap();
        let mut constraints = self.restore()?;
        constraints.add(constraint.clone());
        self.persist(&constraints)?;

        info!(constraint = %constraint, total = constraints.len(), "Defined cardinality constraint");
        Ok(constraint)
    }

    /// Remove the stored set entirely
    pub fn clear(&self) -> PersistenceResult<()> {
        let _guard = self.define_lock.lock().unwrap();
        let mut batch = PropertyBatch::new();
        batch.remove(self.key.as_str());
        self.store.commit(batch)?;

        info!(key = %self.key, "Cleared cardinality constraints");
        Ok(())
    }
}

//! Samyama Constraints
//!
//! Cardinality constraints for property graphs, enforced incrementally
//! before a transaction commits.
//!
//! A constraint such as
//!
//! ```text
//! (:Person)-[:WORKS_FOR]->(:Company) TO many:1
//! ```
//!
//! says every `Person` works for exactly one `Company`, while a `Company`
//! may employ any number of people. The second count bounds the `to` side
//! as seen from a `from` node; the first bounds the `from` side as seen
//! from a `to` node.
//!
//! # Architecture
//!
//! - [`constraint`]: the constraint model, pattern parser, indexed
//!   constraint set and stored form
//! - [`persistence`]: property stores (memory, RocksDB) and the persister
//! - [`hook`]: before-commit validation and its registration lifecycle
//! - [`graph`]: the host interfaces the engine needs, plus an in-memory host
//!
//! ## Example Usage
//!
//! ```rust
//! use samyama_constraints::{
//!     ConstraintExtension, ConstraintPersister, GraphStore, MemoryPropertyStore, ValidationHook,
//! };
//!
//! let mut store = GraphStore::new();
//! let persister = ConstraintPersister::new(MemoryPropertyStore::new());
//! persister.define("(:Person)-[:WORKS_FOR]->(:Company) TO many:1").unwrap();
//!
//! let extension = ConstraintExtension::new(store.events(), ValidationHook::new(persister));
//! extension.start();
//!
//! // A person without an employer is rejected
//! let mut tx = store.begin();
//! tx.create_node(&["Person"]);
//! assert!(tx.commit().is_err());
//!
//! // ...one with an employer is accepted
//! let mut tx = store.begin();
//! let person = tx.create_node(&["Person"]);
//! let company = tx.create_node(&["Company"]);
//! tx.create_edge(person, company, "WORKS_FOR").unwrap();
//! assert!(tx.commit().is_ok());
//! ```

pub mod config;
pub mod constraint;
pub mod graph;
pub mod hook;
pub mod persistence;

// Re-export main types for convenience
pub use config::{ConfigError, ConstraintConfig};
pub use constraint::{
    parse_constraint, Cardinality, CardinalityError, Constraint, ConstraintSet, FormatError,
    Outcome, ParseError,
};
pub use graph::{
    ChangeSet, Direction, GraphError, GraphStore, GraphView, Label, NodeId, EdgeType,
    TransactionEvents, TransactionHandler, Veto,
};
pub use hook::{ConstraintExtension, Decision, ValidationError, ValidationHook, ViolationReport};
pub use persistence::{
    ConstraintPersister, MemoryPropertyStore, PersistenceError, PropertyStore, RocksPropertyStore,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Property graph model and host interfaces
//!
//! The constraint engine depends only on [`GraphView`] (read-only traversal)
//! and on the change-set / handler types in [`event`]. [`GraphStore`] is an
//! in-memory host implementing both, used for embedding and tests.

pub mod edge;
pub mod event;
pub mod node;
pub mod property;
pub mod store;
pub mod types;
pub mod view;

// Re-export main types
pub use edge::Edge;
pub use event::{
    ChangeSet, HandlerId, HandlerRegistry, LabelEntry, RelationshipEntry, TransactionEvents,
    TransactionHandler, Veto,
};
pub use node::Node;
pub use property::{PropertyMap, PropertyValue};
pub use store::{GraphError, GraphResult, GraphStore, Transaction};
pub use types::{Direction, EdgeId, EdgeType, Label, NodeId};
pub use view::{GraphView, Incident};

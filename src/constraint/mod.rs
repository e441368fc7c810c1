//! Cardinality constraints over labelled, typed relationships
//!
//! A [`Constraint`] bounds how many neighbours of one label a node of another
//! label may have via one relationship type. Constraints are written as
//! patterns (see [`parser`]), kept in a [`ConstraintSet`] and stored as a flat
//! string array (see [`serializer`]).

pub mod cardinality;
pub mod model;
pub mod parser;
pub mod serializer;
pub mod set;

pub use cardinality::{Cardinality, CardinalityError, Outcome, MANY, ONE};
pub use model::{Constraint, NO_TYPE};
pub use parser::{parse_constraint, ParseError, ParseResult};
pub use serializer::{deserialize, serialize, ConstraintRecord, FormatError, FormatResult, RECORD_WIDTH};
pub use set::ConstraintSet;

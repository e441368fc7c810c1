//! Flat string-array form of a constraint set
//!
//! Each constraint becomes eight consecutive strings:
//!
//! | slot | field      | example       |
//! |------|------------|---------------|
//! | 0    | from label | `Person`      |
//! | 1    | to label   | `Company`     |
//! | 2    | type       | `WORKS_FOR`   |
//! | 3    | direction  | `OUTGOING`    |
//! | 4    | min from   | `-1`          |
//! | 5    | max from   | `-1`          |
//! | 6    | min to     | `1`           |
//! | 7    | max to     | `1`           |
//!
//! Wildcards are stored as the empty string. Counts are written as decimal
//! integers; `one` and `many` are accepted when reading.

use super::cardinality::{parse_count, Cardinality, CardinalityError};
use super::model::Constraint;
use super::set::ConstraintSet;
use crate::graph::{Direction, EdgeType, Label};
use thiserror::Error;

/// Number of strings per stored constraint
pub const RECORD_WIDTH: usize = 8;

/// Malformed stored data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Invalid data size {0}, expected a multiple of {RECORD_WIDTH} elements")]
    InvalidLength(usize),

    #[error("Invalid direction '{0}'")]
    InvalidDirection(String),

    #[error("Invalid count '{0}'")]
    InvalidCount(String),

    #[error("Invalid range in record {index}: {source}")]
    InvalidRange {
        index: usize,
        #[source]
        source: CardinalityError,
    },
}

pub type FormatResult<T> = Result<T, FormatError>;

/// One constraint in its stored, all-string form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintRecord {
    pub from_label: String,
    pub to_label: String,
    pub edge_type: String,
    pub direction: String,
    pub min_from: String,
    pub max_from: String,
    pub min_to: String,
    pub max_to: String,
}

impl ConstraintRecord {
    /// Read exactly [`RECORD_WIDTH`] fields
    pub fn from_fields(fields: &[String]) -> FormatResult<Self> {
        let [from_label, to_label, edge_type, direction, min_from, max_from, min_to, max_to] = fields
        else {
            return Err(FormatError::InvalidLength(fields.len()));
        };
        Ok(ConstraintRecord {
            from_label: from_label.clone(),
            to_label: to_label.clone(),
            edge_type: edge_type.clone(),
            direction: direction.clone(),
            min_from: min_from.clone(),
            max_from: max_from.clone(),
            min_to: min_to.clone(),
            max_to: max_to.clone(),
        })
    }

    pub fn into_fields(self) -> [String; RECORD_WIDTH] {
        [
            self.from_label,
            self.to_label,
            self.edge_type,
            self.direction,
            self.min_from,
            self.max_from,
            self.min_to,
            self.max_to,
        ]
    }

    /// Rebuild the constraint; `index` is only used for error reporting
    pub fn to_constraint(&self, index: usize) -> FormatResult<Constraint> {
        let direction: Direction = self.direction.parse().map_err(FormatError::InvalidDirection)?;
        let range = |min: &str, max: &str| -> FormatResult<Cardinality> {
            Cardinality::new(count(min)?, count(max)?)
                .map_err(|source| FormatError::InvalidRange { index, source })
        };

        Ok(Constraint::new(
            Some(Label::new(self.from_label.as_str())),
            Some(Label::new(self.to_label.as_str())),
            Some(EdgeType::new(self.edge_type.as_str())),
            direction,
            range(&self.min_from, &self.max_from)?,
            range(&self.min_to, &self.max_to)?,
        ))
    }
}

impl From<&Constraint> for ConstraintRecord {
    fn from(c: &Constraint) -> Self {
        ConstraintRecord {
            from_label: c.from_name().to_string(),
            to_label: c.to_name().to_string(),
            edge_type: c.type_name().to_string(),
            direction: c.direction().name().to_string(),
            min_from: c.min_from().to_string(),
            max_from: c.max_from().to_string(),
            min_to: c.min_to().to_string(),
            max_to: c.max_to().to_string(),
        }
    }
}

fn count(token: &str) -> FormatResult<i64> {
    parse_count(token).ok_or_else(|| FormatError::InvalidCount(token.to_string()))
}

/// Flatten a set, in set order
pub fn serialize(set: &ConstraintSet) -> Vec<String> {
    let mut data = Vec::with_capacity(set.len() * RECORD_WIDTH);
    for constraint in set {
        data.extend(ConstraintRecord::from(constraint).into_fields());
    }
    data
}

/// Rebuild a set; absent or empty data yields an empty set
pub fn deserialize(data: Option<&[String]>) -> FormatResult<ConstraintSet> {
    let data = match data {
        None => return Ok(ConstraintSet::new()),
        Some(data) => data,
    };
    if data.len() % RECORD_WIDTH != 0 {
        return Err(FormatError::InvalidLength(data.len()));
    }

    data.chunks_exact(RECORD_WIDTH)
        .enumerate()
        .map(|(index, fields)| ConstraintRecord::from_fields(fields)?.to_constraint(index))
        .collect::<FormatResult<Vec<_>>>()
        .map(ConstraintSet::from)
}

//! Degree ranges and check outcomes

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Bound value meaning "unbounded on this side"
pub const MANY: i64 = -1;

/// Value of the `one` count keyword
pub const ONE: i64 = 1;

/// Invalid range construction
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CardinalityError {
    #[error("bound {0} is negative; only {MANY} (many) may be used")]
    NegativeBound(i64),

    #[error("minimum {min} exceeds maximum {max}")]
    MinExceedsMax { min: i64, max: i64 },
}

/// Result of checking a node against a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Ok,
    TooFew,
    TooMany,
}

impl Outcome {
    pub fn is_ok(self) -> bool {
        self == Outcome::Ok
    }

    pub fn name(self) -> &'static str {
        match self {
            Outcome::Ok => "OK",
            Outcome::TooFew => "TOO_FEW",
            Outcome::TooMany => "TOO_MANY",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Inclusive `min..max` degree range; [`MANY`] disables a side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cardinality {
    min: i64,
    max: i64,
}

impl Cardinality {
    /// No bound on either side
    pub const UNBOUNDED: Cardinality = Cardinality { min: MANY, max: MANY };

    pub fn new(min: i64, max: i64) -> Result<Self, CardinalityError> {
        for bound in [min, max] {
            if bound < MANY {
                return Err(CardinalityError::NegativeBound(bound));
            }
        }
        if min != MANY && max != MANY && min > max {
            return Err(CardinalityError::MinExceedsMax { min, max });
        }
        Ok(Cardinality { min, max })
    }

    /// A fixed count, `n..n`
    pub fn exactly(n: i64) -> Result<Self, CardinalityError> {
        Self::new(n, n)
    }

    /// Lower bound, [`MANY`] when unbounded
    pub fn lower(&self) -> i64 {
        self.min
    }

    /// Upper bound, [`MANY`] when unbounded
    pub fn upper(&self) -> i64 {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.min == MANY && self.max == MANY
    }

    /// Compare a degree against the range; the lower bound is tested first
    pub fn check(&self, degree: usize) -> Outcome {
        let degree = degree as i64;
        if self.min != MANY && degree < self.min {
            return Outcome::TooFew;
        }
        if self.max != MANY && degree > self.max {
            return Outcome::TooMany;
        }
        Outcome::Ok
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.min, self.max)
    }
}

/// Read a count token: `one`, `many` (any case) or a decimal integer
pub fn parse_count(token: &str) -> Option<i64> {
    if token.eq_ignore_ascii_case("one") {
        Some(ONE)
    } else if token.eq_ignore_ascii_case("many") {
        Some(MANY)
    } else {
        token.parse().ok()
    }
}

//! Cardinality pattern parser using Pest
//!
//! `(:From)<-[:TYPE]->(:To) TO fromCard:toCard` where each card is
//! `n` or `min..max` and `n` is a decimal, `one` or `many`. The first card
//! bounds the `from` side, the second the `to` side.

use super::cardinality::{parse_count, Cardinality};
use super::model::Constraint;
use crate::graph::{Direction, EdgeType, Label};
use pest::error::ErrorVariant;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;
use tracing::debug;

#[derive(Parser)]
#[grammar = "constraint/pattern.pest"]
struct PatternParser;

/// Pattern parser errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// Text does not match the pattern grammar
    #[error("Invalid constraint pattern '{input}': {source}")]
    Syntax {
        input: String,
        #[source]
        source: Box<pest::error::Error<Rule>>,
    },

    /// Grammar matched but a range is unusable
    #[error("Invalid cardinality in pattern '{input}': {reason}")]
    InvalidCardinality { input: String, reason: String },
}

impl ParseError {
    /// The pattern text that failed
    pub fn input(&self) -> &str {
        match self {
            ParseError::Syntax { input, .. } | ParseError::InvalidCardinality { input, .. } => input,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse one constraint pattern
pub fn parse_constraint(input: &str) -> ParseResult<Constraint> {
    let root = PatternParser::parse(Rule::constraint, input)
        .map_err(|e| ParseError::Syntax {
            input: input.to_string(),
            source: Box::new(e),
        })?
        .next()
        .ok_or_else(|| invalid(input, "empty pattern"))?;

    let mut labels = Vec::with_capacity(2);
    let mut edge_type = None;
    let mut left = false;
    let mut right = false;
    let mut cardinalities = Vec::with_capacity(2);

    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::node => labels.push(Label::new(inner_text(pair))),
            Rule::relationship => edge_type = Some(EdgeType::new(inner_text(pair))),
            Rule::left_arrow => left = true,
            Rule::right_arrow => right = true,
            Rule::cardinality => cardinalities.push(parse_cardinality(pair, input)?),
            Rule::to_keyword => expect_separated(&pair, input)?,
            _ => {}
        }
    }

    let (from_label, to_label) = match labels.as_slice() {
        [from, to] => (from.clone(), to.clone()),
        _ => return Err(invalid(input, "expected two node patterns")),
    };
    let (from_cardinality, to_cardinality) = match cardinalities.as_slice() {
        [from, to] => (*from, *to),
        _ => return Err(invalid(input, "expected two cardinalities")),
    };

    let constraint = Constraint::new(
        Some(from_label),
        Some(to_label),
        edge_type,
        Direction::from_arrows(left, right),
        from_cardinality,
        to_cardinality,
    );
    debug!(pattern = input, constraint = %constraint, "Parsed cardinality constraint");
    Ok(constraint)
}

/// `TO` must follow whitespace, not the closing parenthesis directly
fn expect_separated(keyword: &Pair<Rule>, input: &str) -> ParseResult<()> {
    let span = keyword.as_span();
    if input[..span.start()].ends_with(char::is_whitespace) {
        return Ok(());
    }
    Err(ParseError::Syntax {
        input: input.to_string(),
        source: Box::new(pest::error::Error::new_from_span(
            ErrorVariant::CustomError {
                message: "expected whitespace before TO".to_string(),
            },
            span,
        )),
    })
}

/// Trimmed text of the single name inside a node or relationship pair
fn inner_text(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|name| name.as_str().trim().to_string())
        .unwrap_or_default()
}

fn parse_cardinality(pair: Pair<Rule>, input: &str) -> ParseResult<Cardinality> {
    let mut counts = Vec::with_capacity(2);
    for count in pair.into_inner() {
        let token = count.as_str();
        let value = parse_count(token)
            .ok_or_else(|| invalid(input, format!("count '{}' is out of range", token)))?;
        counts.push(value);
    }

    let (min, max) = match counts.as_slice() {
        [n] => (*n, *n),
        [min, max] => (*min, *max),
        _ => return Err(invalid(input, "expected one or two counts")),
    };
    Cardinality::new(min, max).map_err(|e| invalid(input, e.to_string()))
}

fn invalid(input: &str, reason: impl Into<String>) -> ParseError {
    ParseError::InvalidCardinality {
        input: input.to_string(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::cardinality::MANY;

    #[test]
    fn test_parse_simple() {
        let c = parse_constraint("(:Person)-[:KNOWS]-(:Person) TO many:many").unwrap();
        assert_eq!(c.to_string(), "(:Person)-[:KNOWS]-(:Person) OF -1..-1:-1..-1");
        assert_eq!(c.direction(), Direction::Both);
        assert_eq!(c.from_label(), Some(&Label::new("Person")));
        assert_eq!(c.edge_type(), Some(&EdgeType::new("KNOWS")));
    }

    #[test]
    fn test_parse_incoming() {
        let c = parse_constraint("(:Company)<-[:WORKS_AT]-(:Person) TO 1:many").unwrap();
        assert_eq!(c.to_string(), "(:Company)<-[:WORKS_AT]-(:Person) OF 1..1:-1..-1");
        assert_eq!(c.direction(), Direction::Incoming);
        assert_eq!(c.min_from(), 1);
        assert_eq!(c.max_to(), MANY);
    }

    #[test]
    fn test_parse_ranges() {
        let c = parse_constraint("(:Employee)-[:REPORTS_TO]->(:Manager) TO 1..3:1..1").unwrap();
        assert_eq!(c.to_string(), "(:Employee)-[:REPORTS_TO]->(:Manager) OF 1..3:1..1");
        assert_eq!(c.direction(), Direction::Outgoing);
        assert_eq!((c.min_from(), c.max_from()), (1, 3));
        assert_eq!((c.min_to(), c.max_to()), (1, 1));
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let a = parse_constraint("(:Person)-[:REPORTS_TO]->(:Manager) to 1..3:0..1").unwrap();
        let b = parse_constraint("(:Person)-[:REPORTS_TO]->(:Manager) To ONE..3:0..One").unwrap();
        assert_eq!(a.min_from(), 1);
        assert_eq!(b.min_from(), 1);
        assert_eq!(b.max_to(), 1);
        assert_eq!(a.to_string(), "(:Person)-[:REPORTS_TO]->(:Manager) OF 1..3:0..1");
    }

    #[test]
    fn test_whitespace_everywhere() {
        let c = parse_constraint("( : Person ) < - [ : KNOWS ] - > ( : Person ) TO many : many").unwrap();
        assert_eq!(c.from_label(), Some(&Label::new("Person")));
        assert_eq!(c.edge_type(), Some(&EdgeType::new("KNOWS")));
        assert_eq!(c.direction(), Direction::Both);
        assert_eq!(c.to_string(), "(:Person)-[:KNOWS]-(:Person) OF -1..-1:-1..-1");
    }

    #[test]
    fn test_keyword_separated_by_any_whitespace() {
        let c = parse_constraint("(:A)-[:R]->(:B)\tto\n1:1").unwrap();
        assert_eq!(c.to_string(), "(:A)-[:R]->(:B) OF 1..1:1..1");
    }

    #[test]
    fn test_names_keep_inner_spaces() {
        let c = parse_constraint("(:Big Company)-[:WORKS FOR]->(:Person) TO 1:1").unwrap();
        assert_eq!(c.from_name(), "Big Company");
        assert_eq!(c.type_name(), "WORKS FOR");
    }

    #[test]
    fn test_syntax_errors() {
        for input in [
            "",
            "(Person)-[:KNOWS]->(:Person) TO 1:1",
            "(:Person)-[:KNOWS]->(:Person)",
            "(:Person)-[:KNOWS]->(:Person) TO 1",
            "(:Person)-[:KNOWS]->(:Person) TO few:1",
            "(:Person)-[KNOWS]->(:Person) TO 1:1",
            "(:Person)-[:KNOWS]->(:Person) TO 1:1 extra",
            "(:)-[:KNOWS]->(:Person) TO 1:1",
            "(:Person)-[:KNOWS]->(:Person)TO 1:1",
            "(:Person)-[:KNOWS]->(:Person) TOone:1",
            "(:Person)-[:KNOWS]->(:Person) TO1:1",
        ] {
            let err = parse_constraint(input).unwrap_err();
            assert!(matches!(err, ParseError::Syntax { .. }), "accepted '{}'", input);
            assert_eq!(err.input(), input);
        }
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = parse_constraint("(:A)-[:R]->(:B) TO 3..1:1").unwrap_err();
        assert!(matches!(err, ParseError::InvalidCardinality { .. }));
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_count_overflow_rejected() {
        let err = parse_constraint("(:A)-[:R]->(:B) TO 99999999999999999999:1").unwrap_err();
        assert!(matches!(err, ParseError::InvalidCardinality { .. }));
    }

    #[test]
    fn test_many_on_one_side() {
        let c = parse_constraint("(:A)-[:R]->(:B) TO 2..many:many..4").unwrap();
        assert_eq!((c.min_from(), c.max_from()), (2, MANY));
        assert_eq!((c.min_to(), c.max_to()), (MANY, 4));
    }
}

//! Query text parser.
//!
//! Grammar (reserved tokens are case-sensitive and must not appear inside
//! field names or operand values):
//!
//! ```text
//! query      ::= "GET " fields [ "WHERE " conditions ]
//! fields     ::= fieldname ("," fieldname)* | "*"
//! conditions ::= condition ("AND" condition)*
//! condition  ::= fieldname "=" value ("," value)*
//!              | fieldname ">" value
//!              | fieldname "<" value
//! ```
//!
//! Parsing is a single forward pass with no backtracking. `WHERE` and `AND`
//! are matched as plain substrings, not as whitespace-delimited words.

use crate::ast::{Condition, Operator, Predicate, Query, SelectSpec};
use crate::error::{QueryError, Result};
use std::str::FromStr;
use tracing::debug;

/// Required query prefix, including the trailing space.
pub const GET_PREFIX: &str = "GET ";

/// Keyword separating the field list from the conditions.
pub const WHERE_KEYWORD: &str = "WHERE";

/// Keyword separating conditions.
pub const AND_KEYWORD: &str = "AND";

/// Field token meaning "all fields".
pub const WILDCARD: &str = "*";

/// Parses a query string into a [`Query`].
///
/// Surrounding whitespace is trimmed before the `GET ` prefix is checked.
///
/// # Errors
///
/// - [`QueryError::MissingGetPrefix`] if the query does not start with `GET `
/// - [`QueryError::MultipleWhere`] if `WHERE` occurs more than once
/// - [`QueryError::MissingOperator`] if a clause has no `=`, `>` or `<`
/// - [`QueryError::MalformedCondition`] if a clause has an empty side or
///   repeats its operator
///
/// # Examples
///
/// ```
/// use iplens_query::{parse, SelectSpec};
///
/// let query = parse("GET * WHERE country = us").unwrap();
/// assert_eq!(query.fields, SelectSpec::All);
/// assert_eq!(query.conditions.len(), 1);
/// ```
pub fn parse(input: &str) -> Result<Query> {
    let body = input
        .trim()
        .strip_prefix(GET_PREFIX)
        .ok_or(QueryError::MissingGetPrefix)?;

    let (fields_segment, conditions_segment) = split_on_where(body)?;

    let fields = parse_fields(fields_segment);
    let conditions = match conditions_segment {
        Some(segment) if !segment.trim().is_empty() => parse_conditions(segment)?,
        _ => Vec::new(),
    };

    debug!(
        wildcard = fields.is_all(),
        conditions = conditions.len(),
        "Parsed query"
    );

    Ok(Query { fields, conditions })
}

impl FromStr for Query {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

/// Splits the query body into the field segment and the optional condition
/// segment.
fn split_on_where(body: &str) -> Result<(&str, Option<&str>)> {
    let mut parts = body.split(WHERE_KEYWORD);
    let fields = parts.next().unwrap_or_default();
    let conditions = parts.next();

    if parts.next().is_some() {
        return Err(QueryError::MultipleWhere);
    }

    Ok((fields, conditions))
}

/// Only the first token is checked for the wildcard: `GET *, a` selects
/// everything while `GET a, *` selects the fields `a` and `*`.
fn parse_fields(segment: &str) -> SelectSpec {
    let fields: Vec<String> = segment.split(',').map(|f| f.trim().to_string()).collect();

    if fields.first().is_some_and(|f| f == WILDCARD) {
        SelectSpec::All
    } else {
        SelectSpec::Fields(fields)
    }
}

fn parse_conditions(segment: &str) -> Result<Vec<Condition>> {
    segment
        .split(AND_KEYWORD)
        .map(str::trim)
        .map(parse_condition)
        .collect()
}

/// Parses one trimmed clause.
///
/// The operator is the first of `=`, `>`, `<` (in that order) found anywhere
/// in the clause. The clause must split on it into exactly two non-empty
/// sides, so the operator character may appear only once.
fn parse_condition(clause: &str) -> Result<Condition> {
    let operator = Operator::SCAN_ORDER
        .into_iter()
        .find(|op| clause.contains(op.as_char()))
        .ok_or_else(|| QueryError::MissingOperator {
            clause: clause.to_string(),
        })?;

    let malformed = || QueryError::MalformedCondition {
        clause: clause.to_string(),
    };

    let parts: Vec<&str> = clause.split(operator.as_char()).map(str::trim).collect();
    let &[field, operand] = parts.as_slice() else {
        return Err(malformed());
    };
    if field.is_empty() || operand.is_empty() {
        return Err(malformed());
    }

    let predicate = match operator {
        Operator::Eq => Predicate::AnyOf(
            operand
                .split(',')
                .map(|value| value.trim().to_string())
                .collect(),
        ),
        Operator::Gt => Predicate::GreaterThan(operand.to_string()),
        Operator::Lt => Predicate::LessThan(operand.to_string()),
    };

    Ok(Condition::new(field, predicate))
}

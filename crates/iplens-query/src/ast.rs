//! Data model for datasets and parsed queries.
//!
//! A [`Dataset`] maps record keys to [`Record`]s; a [`Record`] maps field
//! names to field values. All values are strings and every comparison the
//! query core performs is a string comparison.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Field name to field value mapping for a single record key.
pub type Record = BTreeMap<String, String>;

/// Record key to [`Record`] mapping.
pub type Dataset = BTreeMap<String, Record>;

/// The field-selection portion of a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectSpec {
    /// Wildcard sentinel: keep every field present on each record.
    All,
    /// Explicit field names, in query order. Duplicates are kept.
    Fields(Vec<String>),
}

impl SelectSpec {
    /// Returns `true` if this is the wildcard sentinel.
    #[must_use]
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Returns `true` if `field` should survive projection.
    #[must_use]
    pub fn selects(&self, field: &str) -> bool {
        match self {
            Self::All => true,
            Self::Fields(fields) => fields.iter().any(|f| f == field),
        }
    }
}

impl Serialize for SelectSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str("*"),
            Self::Fields(fields) => fields.serialize(serializer),
        }
    }
}

/// Comparison operator of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=`: value is one of the operand values.
    Eq,
    /// `>`: value sorts lexicographically after the operand.
    Gt,
    /// `<`: value sorts lexicographically before the operand.
    Lt,
}

impl Operator {
    /// Operators in the order the parser scans for them.
    pub const SCAN_ORDER: [Operator; 3] = [Operator::Eq, Operator::Gt, Operator::Lt];

    /// The reserved character for this operator.
    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Self::Eq => '=',
            Self::Gt => '>',
            Self::Lt => '<',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// An operator bound to its operand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "op", content = "operand")]
pub enum Predicate {
    /// Value must equal at least one of these strings.
    #[serde(rename = "=")]
    AnyOf(Vec<String>),
    /// Value must be lexicographically greater than this string.
    #[serde(rename = ">")]
    GreaterThan(String),
    /// Value must be lexicographically less than this string.
    #[serde(rename = "<")]
    LessThan(String),
}

impl Predicate {
    /// The operator this predicate was parsed from.
    #[must_use]
    pub fn operator(&self) -> Operator {
        match self {
            Self::AnyOf(_) => Operator::Eq,
            Self::GreaterThan(_) => Operator::Gt,
            Self::LessThan(_) => Operator::Lt,
        }
    }

    /// Tests a field value against this predicate.
    ///
    /// Ordering uses plain `str` comparison, so `"9" > "10"`.
    #[must_use]
    pub fn test(&self, value: &str) -> bool {
        match self {
            Self::AnyOf(accepted) => accepted.iter().any(|a| a == value),
            Self::GreaterThan(bound) => value > bound.as_str(),
            Self::LessThan(bound) => value < bound.as_str(),
        }
    }
}

/// One clause of a `WHERE` segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Condition {
    /// Field the predicate applies to.
    pub field: String,
    /// Operator and operand.
    pub predicate: Predicate,
}

impl Condition {
    /// Creates a new condition.
    pub fn new(field: impl Into<String>, predicate: Predicate) -> Self {
        Self {
            field: field.into(),
            predicate,
        }
    }

    /// The operator of this condition.
    #[must_use]
    pub fn operator(&self) -> Operator {
        self.predicate.operator()
    }

    /// Returns `true` if `record` has the field and its value passes the
    /// predicate. A record without the field never matches.
    #[must_use]
    pub fn matches(&self, record: &Record) -> bool {
        record
            .get(&self.field)
            .is_some_and(|value| self.predicate.test(value))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ", self.field, self.operator())?;
        match &self.predicate {
            Predicate::AnyOf(values) => f.write_str(&values.join(", ")),
            Predicate::GreaterThan(bound) | Predicate::LessThan(bound) => f.write_str(bound),
        }
    }
}

/// A parsed query: which fields to keep and which records to keep.
///
/// Construct one with [`parse`](crate::parse) or [`str::parse`]. An empty
/// `conditions` list means no filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Query {
    /// Field selection.
    pub fields: SelectSpec,
    /// Conditions, in source order. All must hold for a record to survive.
    pub conditions: Vec<Condition>,
}

impl Query {
    /// Applies this query to `dataset`: filter, then project.
    ///
    /// The input dataset is left untouched.
    #[must_use]
    pub fn apply(&self, dataset: &Dataset) -> Dataset {
        let filtered = crate::filter(dataset, &self.conditions);
        crate::project(&filtered, &self.fields)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GET ")?;
        match &self.fields {
            SelectSpec::All => f.write_str("*")?,
            SelectSpec::Fields(fields) => f.write_str(&fields.join(", "))?,
        }
        for (i, condition) in self.conditions.iter().enumerate() {
            let keyword = if i == 0 { " WHERE " } else { " AND " };
            write!(f, "{keyword}{condition}")?;
        }
        Ok(())
    }
}

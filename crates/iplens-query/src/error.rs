//! Error types for query parsing.
//!
//! Only parsing can fail. Filtering and projection are total over a parsed
//! [`Query`](crate::Query) and any dataset shape.

use thiserror::Error;

/// Broad classification of a [`QueryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The query does not start with the `GET ` prefix.
    Format,
    /// The query has the right prefix but its body is malformed.
    Syntax,
}

/// The error type for query parsing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query does not begin with `GET ` (note the trailing space).
    #[error("Invalid query format: query must start with \"GET \"")]
    MissingGetPrefix,

    /// The reserved word `WHERE` appears more than once.
    #[error("Syntax error: multiple WHERE")]
    MultipleWhere,

    /// A condition clause contains none of `=`, `>` or `<`.
    #[error("Syntax error: invalid condition (no operator): '{clause}'")]
    MissingOperator {
        /// The offending clause, trimmed.
        clause: String,
    },

    /// A condition clause has an empty field name or an empty operand.
    #[error("Syntax error: invalid condition: '{clause}'")]
    MalformedCondition {
        /// The offending clause, trimmed.
        clause: String,
    },
}

impl QueryError {
    /// Returns the broad kind of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingGetPrefix => ErrorKind::Format,
            Self::MultipleWhere | Self::MissingOperator { .. } | Self::MalformedCondition { .. } => {
                ErrorKind::Syntax
            }
        }
    }
}

/// A specialized Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

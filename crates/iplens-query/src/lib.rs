//! A minimal query language for filtering and projecting keyed records.
//!
//! A query such as `GET city, asn WHERE country = us AND region_code < CO`
//! is parsed into a [`Query`], which is then applied to a [`Dataset`] in two
//! stages: [`filter`] drops records that fail any condition, and [`project`]
//! restricts the surviving records to the selected fields.
//!
//! Every stage is a pure function: datasets are read, never mutated, and a
//! new dataset is returned. All comparisons are over strings.
//!
//! ```
//! use iplens_query::{execute_query, Dataset, Record};
//!
//! let mut dataset = Dataset::new();
//! dataset.insert(
//!     "8.8.8.8".into(),
//!     Record::from([("country".into(), "us".into()), ("city".into(), "Mountain View".into())]),
//! );
//!
//! let result = execute_query(&dataset, "GET city WHERE country = us").unwrap();
//! assert_eq!(result["8.8.8.8"]["city"], "Mountain View");
//! assert!(!result["8.8.8.8"].contains_key("country"));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod error;
pub mod filter;
pub mod parser;
pub mod projection;

pub use ast::{Condition, Dataset, Operator, Predicate, Query, Record, SelectSpec};
pub use error::{ErrorKind, QueryError, Result};
pub use filter::filter;
pub use parser::parse;
pub use projection::project;

/// Parses `query` and applies it to `dataset`.
///
/// A parse failure aborts before any filtering or projection happens.
///
/// # Errors
///
/// Returns a [`QueryError`] if `query` does not parse.
pub fn execute_query(dataset: &Dataset, query: &str) -> Result<Dataset> {
    let query = parse(query)?;
    Ok(query.apply(dataset))
}

//! Row filtering.

use crate::ast::{Condition, Dataset};
use tracing::debug;

/// Returns the records of `dataset` that satisfy every condition.
///
/// Conditions are applied in order against a shrinking working copy; a
/// record missing a condition's field is dropped. The input is not modified
/// and the survivor set does not depend on condition order.
///
/// # Examples
///
/// ```
/// use iplens_query::{filter, Condition, Dataset, Predicate, Record};
///
/// let mut dataset = Dataset::new();
/// dataset.insert("k1".into(), Record::from([("c".into(), "us".into())]));
/// dataset.insert("k2".into(), Record::from([("c".into(), "mx".into())]));
///
/// let conditions = [Condition::new("c", Predicate::AnyOf(vec!["us".into()]))];
/// let result = filter(&dataset, &conditions);
/// assert_eq!(result.keys().collect::<Vec<_>>(), ["k1"]);
/// ```
#[must_use]
pub fn filter(dataset: &Dataset, conditions: &[Condition]) -> Dataset {
    let mut working = dataset.clone();

    for condition in conditions {
        let before = working.len();
        working.retain(|_, record| condition.matches(record));
        debug!(
            condition = %condition,
            dropped = before - working.len(),
            remaining = working.len(),
            "Applied condition"
        );
    }

    working
}

//! Field projection.

use crate::ast::{Dataset, Record, SelectSpec};

/// Restricts every record in `dataset` to the fields named in `fields`.
///
/// Selected fields a record lacks are skipped. Records left with no fields
/// are kept as empty records; projection never removes rows.
#[must_use]
pub fn project(dataset: &Dataset, fields: &SelectSpec) -> Dataset {
    if fields.is_all() {
        return dataset.clone();
    }

    dataset
        .iter()
        .map(|(key, record)| {
            let projected: Record = record
                .iter()
                .filter(|(name, _)| fields.selects(name))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();
            (key.clone(), projected)
        })
        .collect()
}

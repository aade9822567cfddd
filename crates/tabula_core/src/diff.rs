//! Changeset computation for updates.

use tabula_store::Tuple;

/// Returns the sub-mapping of `proposed` that differs from `original`.
///
/// A key survives when `original` has no value for it or holds a
/// different one; keys only present in `original` never appear in the
/// result. Without an `original` snapshot the proposed tuple is
/// returned unchanged. Pure: neither input is modified.
#[must_use]
pub fn diff(proposed: &Tuple, original: Option<&Tuple>) -> Tuple {
    match original {
        None => proposed.clone(),
        Some(original) => proposed
            .iter()
            .filter(|(column, value)| original.get(*column) != Some(value))
            .map(|(column, value)| (column.clone(), value.clone()))
            .collect(),
    }
}

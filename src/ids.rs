//! Synthetic identifiers for records that arrive without one.

use crate::Identified;
use crate::error::InvalidIdDomainError;
use compact_str::ToCompactString;
use tracing::info;

/// Assigns consecutive integers to the records missing an identifier,
/// starting after the largest numeric identifier already present.
///
/// Identifiers are handed out in the iteration order of the missing records.
/// Existing non-numeric identifiers are kept as-is and ignored when looking
/// for the maximum. When no identifier is missing the records are returned
/// unchanged.
///
/// # Errors
///
/// Returns [`InvalidIdDomainError::NoNumericId`] when identifiers are missing
/// but none of the present ones is numeric, so there is no maximum to extend,
/// and [`InvalidIdDomainError::Exhausted`] when the new identifiers would not
/// fit in a `u64`. Records are left untouched on error.
///
/// # Examples
///
/// ```
/// use druglink::{allocate_missing_ids, Channel, Identified, PartialArticle};
/// use chrono::NaiveDate;
///
/// let row = |id: Option<&str>| PartialArticle {
///     id: id.map(Into::into),
///     title: "Title".to_string(),
///     journal: Some("Journal".to_string()),
///     date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
///     channel: Channel::Literature,
/// };
/// let records = vec![row(Some("3")), row(None), row(Some("9")), row(Some("7")), row(None)];
///
/// let records = allocate_missing_ids(records).unwrap();
/// let ids: Vec<_> = records.iter().map(|r| r.record_id().unwrap()).collect();
/// assert_eq!(ids, ["3", "10", "9", "7", "11"]);
/// ```
pub fn allocate_missing_ids<T: Identified>(
    mut records: Vec<T>,
) -> Result<Vec<T>, InvalidIdDomainError> {
    let missing = records.iter().filter(|r| r.record_id().is_none()).count();
    if missing == 0 {
        return Ok(records);
    }

    let max_id = records
        .iter()
        .filter_map(|r| r.record_id())
        .filter_map(parse_numeric_id)
        .max()
        .ok_or(InvalidIdDomainError::NoNumericId { missing })?;
    max_id
        .checked_add(missing as u64)
        .ok_or(InvalidIdDomainError::Exhausted { max: max_id, missing })?;

    let mut next_id = max_id;
    for record in records.iter_mut().filter(|r| r.record_id().is_none()) {
        next_id += 1;
        record.assign_id(next_id.to_compact_string());
    }

    info!(
        allocated = missing,
        first = max_id + 1,
        last = next_id,
        "Allocated identifiers for records missing one"
    );
    Ok(records)
}

fn parse_numeric_id(id: &str) -> Option<u64> {
    id.trim().parse().ok()
}

//! Duplicate record merging.
//!
//! Source files routinely list the same article several times, each copy
//! missing a different field. Rows sharing a canonical title and date are
//! collapsed into one representative whose gaps are filled from its siblings.
//!
//! ## Fill rule
//!
//! Within one partition every field takes the first non-missing value in the
//! order the rows were listed (a forward fill followed by a backward fill,
//! keeping the first row). When three or more siblings disagree, the earliest
//! listed one wins.
//!
//! ```rust
//! use druglink::{merge_duplicates, Channel, PartialArticle};
//! use chrono::NaiveDate;
//!
//! let date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
//! let rows = vec![
//!     PartialArticle {
//!         id: None,
//!         title: "Aspirin Trial".to_string(),
//!         journal: Some("J1".to_string()),
//!         date,
//!         channel: Channel::ClinicalTrial,
//!     },
//!     PartialArticle {
//!         id: Some("NCT01".into()),
//!         title: "Aspirin Trial".to_string(),
//!         journal: None,
//!         date,
//!         channel: Channel::ClinicalTrial,
//!     },
//! ];
//!
//! let merged = merge_duplicates(rows);
//! assert_eq!(merged.len(), 1);
//! assert_eq!(merged[0].id.as_deref(), Some("NCT01"));
//! assert_eq!(merged[0].journal.as_deref(), Some("J1"));
//! ```

use crate::{Identified, PartialArticle};
use chrono::NaiveDate;
use compact_str::CompactString;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Merges rows sharing the same (canonical title, date) key, then removes rows
/// duplicated by identifier.
///
/// Partitions are emitted in order of first appearance; a partition of one row
/// is returned unchanged.
pub fn merge_duplicates(records: Vec<PartialArticle>) -> Vec<PartialArticle> {
    let input_len = records.len();
    let mut slots: HashMap<(String, NaiveDate), usize> = HashMap::with_capacity(input_len);
    let mut merged: Vec<PartialArticle> = Vec::with_capacity(input_len);

    for record in records {
        match slots.entry((record.title.clone(), record.date)) {
            Entry::Occupied(slot) => merged[*slot.get()].fill_from(record),
            Entry::Vacant(slot) => {
                slot.insert(merged.len());
                merged.push(record);
            }
        }
    }

    debug!(
        input = input_len,
        partitions = merged.len(),
        "Merged duplicate rows by title and date"
    );
    dedupe_by_id(merged)
}

/// Removes records whose identifier was already seen, keeping the first
/// occurrence. Records without an identifier are always kept.
pub fn dedupe_by_id<T: Identified>(records: Vec<T>) -> Vec<T> {
    let input_len = records.len();
    let mut seen: HashSet<CompactString> = HashSet::with_capacity(input_len);
    let kept: Vec<T> = records
        .into_iter()
        .filter(|record| match record.record_id() {
            Some(id) => seen.insert(CompactString::from(id)),
            None => true,
        })
        .collect();

    if kept.len() < input_len {
        debug!(removed = input_len - kept.len(), "Dropped rows with duplicate identifiers");
    }
    kept
}

//! Coordinate Joiner
//! Left join of enrollment records onto the coordinate lookup by normalized key.

use super::model::{CoordinateEntry, JoinKey, JoinedRecord, Record};
use std::collections::HashMap;
use tracing::warn;

/// Left-join coordinates onto records.
///
/// Every record yields exactly one joined record, in input order. When the
/// lookup holds the same key twice the first entry wins.
pub fn join(records: Vec<Record>, coordinates: &[CoordinateEntry]) -> Vec<JoinedRecord> {
    let (lookup, _) = build_lookup(coordinates);

    records
        .into_iter()
        .map(|record| {
            let (latitude, longitude) = lookup
                .get(&record.join_key)
                .map(|entry| (entry.latitude, entry.longitude))
                .unwrap_or((None, None));
            JoinedRecord {
                record,
                latitude,
                longitude,
            }
        })
        .collect()
}

/// Key -> first entry, plus the keys of every entry that was skipped.
fn build_lookup(
    coordinates: &[CoordinateEntry],
) -> (HashMap<&JoinKey, &CoordinateEntry>, Vec<&JoinKey>) {
    let mut lookup = HashMap::with_capacity(coordinates.len());
    let mut duplicates = Vec::new();

    for entry in coordinates {
        if lookup.contains_key(&entry.join_key) {
            warn!(key = %entry.join_key, "coordinate sheet repeats key; first entry kept");
            duplicates.push(&entry.join_key);
            continue;
        }
        lookup.insert(&entry.join_key, entry);
    }
    (lookup, duplicates)
}

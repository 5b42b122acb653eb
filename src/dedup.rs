//! Collapse joined location rows to one row per restaurant.

use std::collections::HashSet;

use crate::error::NormalizeError;
use crate::source::{Column, RawRecord, RecordSet};

/// Keep the first row seen for each restaurant key, preserving input order.
///
/// Joined sources list a restaurant once per delivery location; counting must
/// see each restaurant once. A row without a key is a malformed record.
pub fn dedup_by_restaurant(
    platform: &str,
    records: &[RawRecord],
) -> Result<Vec<RawRecord>, NormalizeError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());
    let mut unique = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        let key = record
            .restaurant_key
            .as_deref()
            .ok_or_else(|| NormalizeError::MalformedRecord {
                platform: platform.to_string(),
                row: i + 1,
                reason: "missing restaurant key".to_string(),
            })?;
        if seen.insert(key) {
            unique.push(record.clone());
        }
    }

    tracing::debug!(
        platform,
        rows = records.len(),
        restaurants = unique.len(),
        "deduplicated joined rows"
    );
    Ok(unique)
}

/// One row per restaurant when the source carries restaurant keys, else every row.
pub fn unique_restaurants(set: &RecordSet) -> Result<Vec<RawRecord>, NormalizeError> {
    if set.has_column(Column::RestaurantKey) {
        dedup_by_restaurant(&set.platform, &set.records)
    } else {
        Ok(set.records.clone())
    }
}

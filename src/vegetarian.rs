use crate::source::RawRecord;

/// Category match used for the vegetarian maps: "veg" anywhere, any case.
///
/// Covers "Vegetarian", "Vegan", "Veggie" and slugs like `vegetarian-friendly`.
pub fn is_vegetarian(category: &str) -> bool {
    category.to_lowercase().contains("veg")
}

/// Rows whose category marks them vegetarian. Rows without a category are dropped.
pub fn vegetarian_subset(records: &[RawRecord]) -> Vec<RawRecord> {
    records
        .iter()
        .filter(|r| r.category.as_deref().is_some_and(is_vegetarian))
        .cloned()
        .collect()
}

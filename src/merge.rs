//! Cross-platform concatenation and label reconciliation.
//!
//! Some spellings only collide once platforms are put side by side (one
//! platform says "Namen", another "Namur"). The merge relabels those, regroups,
//! and recomputes the per-region totals that drive the comparison order.

use std::collections::HashMap;

use serde::Serialize;

use crate::aggregate::{LabelCount, RegionTable, sort_by_count_desc};

/// Spellings collapsed after concatenation. Targets map to themselves so the
/// relabeling is idempotent.
pub const MERGE_RELABELS: [(&str, &str); 6] = [
    ("Brussels", "Brussels-Capital Region"),
    ("Brussels-Capital Region", "Brussels-Capital Region"),
    ("Namen", "Namur"),
    ("Namur", "Namur"),
    ("Luxemburg", "Luxembourg"),
    ("Luxembourg", "Luxembourg"),
];

/// One `(label, platform)` cell of the long-form comparison table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedRow {
    pub label: String,
    pub platform: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedTable {
    /// Grouped rows, ordered by their label's total, then first appearance.
    pub rows: Vec<MergedRow>,
    /// Per-label totals across platforms, sorted by count descending.
    pub totals: Vec<LabelCount>,
}

impl MergedTable {
    pub fn total(&self, label: &str) -> Option<u64> {
        self.totals
            .iter()
            .find(|t| t.label == label)
            .map(|t| t.count)
    }

    pub fn count(&self, label: &str, platform: &str) -> Option<u64> {
        self.rows
            .iter()
            .find(|r| r.label == label && r.platform == platform)
            .map(|r| r.count)
    }

    /// Platforms in first-appearance order.
    pub fn platforms(&self) -> Vec<&str> {
        let mut platforms: Vec<&str> = Vec::new();
        for row in &self.rows {
            if !platforms.contains(&row.platform.as_str()) {
                platforms.push(&row.platform);
            }
        }
        platforms
    }
}

#[derive(Debug, Clone)]
pub struct LabelMerger {
    relabels: HashMap<String, String>,
}

impl Default for LabelMerger {
    fn default() -> Self {
        Self::new(MERGE_RELABELS)
    }
}

impl LabelMerger {
    pub fn new<I, A, B>(relabels: I) -> Self
    where
        I: IntoIterator<Item = (A, B)>,
        A: Into<String>,
        B: Into<String>,
    {
        Self {
            relabels: relabels
                .into_iter()
                .map(|(from, to)| (from.into(), to.into()))
                .collect(),
        }
    }

    /// Replacement label, or the label itself when it has no entry.
    pub fn relabel<'a>(&'a self, label: &'a str) -> &'a str {
        self.relabels.get(label).map_or(label, String::as_str)
    }

    /// Relabel, group by `(label, platform)`, and order by label totals.
    pub fn merge<I>(&self, rows: I) -> MergedTable
    where
        I: IntoIterator<Item = MergedRow>,
    {
        let mut grouped: Vec<MergedRow> = Vec::new();
        let mut index: HashMap<(String, String), usize> = HashMap::new();

        for row in rows {
            let label = self.relabel(&row.label).to_string();
            let key = (label.clone(), row.platform.clone());
            match index.get(&key) {
                Some(&i) => grouped[i].count = grouped[i].count.saturating_add(row.count),
                None => {
                    index.insert(key, grouped.len());
                    grouped.push(MergedRow {
                        label,
                        platform: row.platform,
                        count: row.count,
                    });
                }
            }
        }

        let mut totals: Vec<LabelCount> = Vec::new();
        for row in &grouped {
            match totals.iter_mut().find(|t| t.label == row.label) {
                Some(total) => total.count = total.count.saturating_add(row.count),
                None => totals.push(LabelCount {
                    label: row.label.clone(),
                    count: row.count,
                }),
            }
        }
        sort_by_count_desc(&mut totals, |t| t.count);

        let rank: HashMap<&str, usize> = totals
            .iter()
            .enumerate()
            .map(|(i, t)| (t.label.as_str(), i))
            .collect();
        // Stable: rows of one label keep their platform order.
        grouped.sort_by_key(|r| rank[r.label.as_str()]);

        MergedTable {
            rows: grouped,
            totals,
        }
    }
}

/// Long-form rows for a platform's canonical table.
pub fn table_rows(table: &RegionTable) -> impl Iterator<Item = MergedRow> + '_ {
    table.rows.iter().map(|r| MergedRow {
        label: r.region.name().to_string(),
        platform: r.platform.clone(),
        count: r.count,
    })
}

/// Concatenate per-platform tables and reconcile labels with the default relabels.
pub fn merge_platforms(tables: &[RegionTable]) -> MergedTable {
    let merged = LabelMerger::default().merge(tables.iter().flat_map(|t| table_rows(t)));
    tracing::debug!(
        platforms = tables.len(),
        labels = merged.totals.len(),
        "merged platform tables"
    );
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::postal::Classification;
    use crate::region::CanonicalRegion;

    fn row(label: &str, platform: &str, count: u64) -> MergedRow {
        MergedRow {
            label: label.into(),
            platform: platform.into(),
            count,
        }
    }

    #[test]
    fn test_brussels_spellings_collapse() {
        let merged = LabelMerger::default().merge(vec![
            row("Brussels", "ubereats", 40),
            row("Brussels-Capital Region", "deliveroo", 60),
            row("Brussels-Capital Region", "takeaway", 20),
        ]);
        assert_eq!(merged.totals.len(), 1);
        assert_eq!(merged.total("Brussels-Capital Region"), Some(120));
        assert_eq!(merged.total("Brussels"), None);
        assert_eq!(merged.count("Brussels-Capital Region", "ubereats"), Some(40));
    }

    #[test]
    fn test_same_platform_rows_summed() {
        let merged = LabelMerger::default().merge(vec![
            row("Namen", "ubereats", 0),
            row("Namur", "ubereats", 5),
            row("Luxemburg", "ubereats", 3),
            row("Luxembourg", "ubereats", 1),
        ]);
        assert_eq!(merged.count("Namur", "ubereats"), Some(5));
        assert_eq!(merged.count("Luxembourg", "ubereats"), Some(4));
        assert_eq!(merged.rows.len(), 2);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let merger = LabelMerger::default();
        let once = merger.merge(vec![
            row("Brussels", "ubereats", 40),
            row("Brussels-Capital Region", "deliveroo", 60),
            row("Antwerp", "deliveroo", 70),
        ]);
        let twice = merger.merge(once.rows.clone());
        assert_eq!(once, twice);
        assert_eq!(twice.total("Brussels-Capital Region"), Some(100));
    }

    #[test]
    fn test_totals_drive_row_order() {
        let merged = LabelMerger::default().merge(vec![
            row("Namur", "deliveroo", 1),
            row("Antwerp", "deliveroo", 5),
            row("Namur", "takeaway", 1),
            row("Antwerp", "takeaway", 5),
            row("Liège", "deliveroo", 3),
        ]);
        let labels: Vec<&str> = merged.totals.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Antwerp", "Liège", "Namur"]);
        let order: Vec<(&str, &str)> = merged
            .rows
            .iter()
            .map(|r| (r.label.as_str(), r.platform.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Antwerp", "deliveroo"),
                ("Antwerp", "takeaway"),
                ("Liège", "deliveroo"),
                ("Namur", "deliveroo"),
                ("Namur", "takeaway"),
            ]
        );
    }

    #[test]
    fn test_huge_counts_saturate() {
        let merged = LabelMerger::default().merge(vec![
            row("Brussels", "ubereats", u64::MAX),
            row("Brussels-Capital Region", "ubereats", 1),
            row("Brussels-Capital Region", "deliveroo", 5),
        ]);
        assert_eq!(merged.count("Brussels-Capital Region", "ubereats"), Some(u64::MAX));
        assert_eq!(merged.total("Brussels-Capital Region"), Some(u64::MAX));
    }

    #[test]
    fn test_unlisted_labels_pass_through() {
        let merger = LabelMerger::default();
        assert_eq!(merger.relabel("Hainaut"), "Hainaut");
        assert_eq!(merger.relabel("Brussels"), "Brussels-Capital Region");
    }

    #[test]
    fn test_merge_platform_tables() {
        let deliveroo = aggregate(
            "deliveroo",
            vec![(Classification::Region(CanonicalRegion::Antwerp), 3)],
        );
        let takeaway = aggregate(
            "takeaway",
            vec![(Classification::Region(CanonicalRegion::Antwerp), 2)],
        );
        let merged = merge_platforms(&[deliveroo, takeaway]);
        assert_eq!(merged.rows.len(), 22);
        assert_eq!(merged.totals.len(), 11);
        assert_eq!(merged.totals[0].label, "Antwerp");
        assert_eq!(merged.totals[0].count, 5);
        assert_eq!(merged.platforms(), vec!["deliveroo", "takeaway"]);
    }
}

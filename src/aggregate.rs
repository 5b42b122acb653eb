//! Per-platform region counts with missing-region backfill.

use serde::Serialize;

use crate::postal::Classification;
use crate::region::CanonicalRegion;

/// Count of restaurants in one region on one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub region: CanonicalRegion,
    pub count: u64,
    pub platform: String,
}

/// Count for a label that did not map to any canonical region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

/// Canonical table for one platform plus the entries kept out of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionTable {
    pub platform: String,
    /// Exactly one row per canonical region, sorted by count descending.
    pub rows: Vec<RegionCount>,
    /// Unknown entries by label, sorted by count descending.
    pub unknown: Vec<LabelCount>,
    /// Restaurants dropped before classification.
    pub excluded: u64,
}

impl RegionTable {
    pub fn count(&self, region: CanonicalRegion) -> u64 {
        self.rows
            .iter()
            .find(|r| r.region == region)
            .map_or(0, |r| r.count)
    }

    /// Sum over the canonical rows only.
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|r| r.count).sum()
    }

    pub fn unknown_total(&self) -> u64 {
        self.unknown.iter().map(|l| l.count).sum()
    }
}

/// Sort by count, highest first. Ties keep their input order.
pub fn sort_by_count_desc<T>(items: &mut [T], count: impl Fn(&T) -> u64) {
    items.sort_by(|a, b| count(b).cmp(&count(a)));
}

/// Running counts for one platform.
#[derive(Debug, Clone, Default)]
pub struct RegionTally {
    counts: [u64; CanonicalRegion::ALL.len()],
    unknown: Vec<LabelCount>,
    excluded: u64,
}

impl RegionTally {
    /// Counts saturate at `u64::MAX` rather than wrap.
    pub fn add(&mut self, classification: &Classification, weight: u64) {
        match classification {
            Classification::Region(region) => {
                let count = &mut self.counts[region.index()];
                *count = count.saturating_add(weight);
            }
            Classification::Unknown(label) => {
                match self.unknown.iter_mut().find(|l| &l.label == label) {
                    Some(entry) => entry.count = entry.count.saturating_add(weight),
                    None => self.unknown.push(LabelCount {
                        label: label.clone(),
                        count: weight,
                    }),
                }
            }
            Classification::Excluded => self.excluded = self.excluded.saturating_add(weight),
        }
    }

    /// Reindex against every canonical region and sort.
    pub fn into_table(self, platform: &str) -> RegionTable {
        let mut rows: Vec<RegionCount> = CanonicalRegion::ALL
            .iter()
            .map(|region| RegionCount {
                region: *region,
                count: self.counts[region.index()],
                platform: platform.to_string(),
            })
            .collect();
        sort_by_count_desc(&mut rows, |r| r.count);

        let mut unknown = self.unknown;
        sort_by_count_desc(&mut unknown, |l| l.count);

        RegionTable {
            platform: platform.to_string(),
            rows,
            unknown,
            excluded: self.excluded,
        }
    }
}

/// Count weighted classifications into a complete, sorted region table.
pub fn aggregate<I>(platform: &str, classifications: I) -> RegionTable
where
    I: IntoIterator<Item = (Classification, u64)>,
{
    let mut tally = RegionTally::default();
    for (classification, weight) in classifications {
        tally.add(&classification, weight);
    }
    tally.into_table(platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(r: CanonicalRegion) -> (Classification, u64) {
        (Classification::Region(r), 1)
    }

    #[test]
    fn test_all_regions_present_when_input_empty() {
        let table = aggregate("deliveroo", std::iter::empty());
        assert_eq!(table.rows.len(), 11);
        assert!(table.rows.iter().all(|r| r.count == 0));
        // Zero everywhere keeps canonical order
        let order: Vec<CanonicalRegion> = table.rows.iter().map(|r| r.region).collect();
        assert_eq!(order, CanonicalRegion::ALL.to_vec());
    }

    #[test]
    fn test_each_region_exactly_once() {
        let table = aggregate(
            "deliveroo",
            vec![
                region(CanonicalRegion::Antwerp),
                region(CanonicalRegion::Antwerp),
                region(CanonicalRegion::Namur),
            ],
        );
        for r in CanonicalRegion::ALL {
            assert_eq!(table.rows.iter().filter(|row| row.region == r).count(), 1);
        }
        assert_eq!(table.count(CanonicalRegion::Antwerp), 2);
        assert_eq!(table.count(CanonicalRegion::Namur), 1);
        assert_eq!(table.count(CanonicalRegion::Hainaut), 0);
    }

    #[test]
    fn test_sorted_descending() {
        let table = aggregate(
            "deliveroo",
            vec![
                (Classification::Region(CanonicalRegion::Namur), 10),
                (Classification::Region(CanonicalRegion::Antwerp), 30),
                (Classification::Region(CanonicalRegion::Limburg), 20),
            ],
        );
        let top: Vec<(CanonicalRegion, u64)> =
            table.rows.iter().take(3).map(|r| (r.region, r.count)).collect();
        assert_eq!(
            top,
            vec![
                (CanonicalRegion::Antwerp, 30),
                (CanonicalRegion::Limburg, 20),
                (CanonicalRegion::Namur, 10),
            ]
        );
    }

    #[test]
    fn test_huge_weights_saturate() {
        let table = aggregate(
            "deliveroo",
            vec![
                (Classification::Region(CanonicalRegion::Antwerp), u64::MAX),
                (Classification::Region(CanonicalRegion::Antwerp), 1),
                (Classification::Unknown("6500".into()), u64::MAX),
                (Classification::Unknown("6500".into()), 1),
                (Classification::Excluded, u64::MAX),
                (Classification::Excluded, 1),
            ],
        );
        assert_eq!(table.count(CanonicalRegion::Antwerp), u64::MAX);
        assert_eq!(table.unknown_total(), u64::MAX);
        assert_eq!(table.excluded, u64::MAX);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let mut counts = vec![
            ("Antwerp", 50),
            ("Namur", 10),
            ("Hainaut", 50),
        ];
        sort_by_count_desc(&mut counts, |(_, c)| *c);
        assert_eq!(counts, vec![("Antwerp", 50), ("Hainaut", 50), ("Namur", 10)]);

        let table = aggregate(
            "deliveroo",
            vec![
                (Classification::Region(CanonicalRegion::Hainaut), 50),
                (Classification::Region(CanonicalRegion::Antwerp), 50),
                (Classification::Region(CanonicalRegion::Namur), 10),
            ],
        );
        // Antwerp precedes Hainaut in table order
        assert_eq!(table.rows[0].region, CanonicalRegion::Antwerp);
        assert_eq!(table.rows[1].region, CanonicalRegion::Hainaut);
        assert_eq!(table.rows[2].region, CanonicalRegion::Namur);
    }

    #[test]
    fn test_unknown_and_excluded_kept_out_of_canonical_rows() {
        let table = aggregate(
            "takeaway",
            vec![
                region(CanonicalRegion::BrusselsCapital),
                (Classification::Unknown("6500".into()), 1),
                (Classification::Unknown("6500".into()), 2),
                (Classification::Unknown("10400".into()), 4),
                (Classification::Excluded, 1),
                (Classification::Excluded, 1),
            ],
        );
        assert_eq!(table.total(), 1);
        assert_eq!(table.unknown_total(), 7);
        assert_eq!(
            table.unknown,
            vec![
                LabelCount {
                    label: "10400".into(),
                    count: 4
                },
                LabelCount {
                    label: "6500".into(),
                    count: 3
                },
            ]
        );
        assert_eq!(table.excluded, 2);
    }

    #[test]
    fn test_weights_summed() {
        let table = aggregate(
            "deliveroo",
            vec![
                (Classification::Region(CanonicalRegion::Liege), 7),
                (Classification::Region(CanonicalRegion::Liege), 5),
            ],
        );
        assert_eq!(table.count(CanonicalRegion::Liege), 12);
        assert!(table.rows.iter().all(|r| r.platform == "deliveroo"));
    }
}

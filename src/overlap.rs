//! Which restaurant names appear on which platforms (Venn-diagram counts).

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::error::NormalizeError;
use crate::source::RawRecord;

/// Largest number of platforms compared at once; cells grow as 2^n.
pub const MAX_PLATFORMS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSet {
    pub platform: String,
    pub names: BTreeSet<String>,
}

impl NameSet {
    /// Distinct trimmed names. Names are compared exactly, case included.
    pub fn from_records(platform: &str, records: &[RawRecord]) -> Self {
        let names = records
            .iter()
            .filter_map(|r| r.name.as_deref())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            platform: platform.to_string(),
            names,
        }
    }
}

/// Names present on exactly these platforms and no others.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OverlapCell {
    pub platforms: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetSize {
    pub platform: String,
    pub size: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Overlap {
    pub sizes: Vec<SetSize>,
    /// Every non-empty platform combination, singles first, then pairs, and so on.
    pub cells: Vec<OverlapCell>,
}

impl Overlap {
    pub fn cell(&self, platforms: &[&str]) -> Option<usize> {
        self.cells
            .iter()
            .find(|c| {
                c.platforms.len() == platforms.len()
                    && platforms.iter().all(|p| c.platforms.iter().any(|q| q == p))
            })
            .map(|c| c.count)
    }

    /// Names on every platform.
    pub fn shared_by_all(&self) -> usize {
        self.cells.last().map_or(0, |c| c.count)
    }
}

pub fn overlap(sets: &[NameSet]) -> Result<Overlap, NormalizeError> {
    if sets.is_empty() || sets.len() > MAX_PLATFORMS {
        return Err(NormalizeError::InvalidArgument {
            reason: format!(
                "overlap needs between 1 and {MAX_PLATFORMS} platforms, got {}",
                sets.len()
            ),
        });
    }

    let mut membership: HashMap<&str, u32> = HashMap::new();
    for (i, set) in sets.iter().enumerate() {
        for name in &set.names {
            *membership.entry(name.as_str()).or_default() |= 1 << i;
        }
    }

    let mut by_mask: HashMap<u32, usize> = HashMap::new();
    for mask in membership.values() {
        *by_mask.entry(*mask).or_default() += 1;
    }

    let mut masks: Vec<u32> = (1..(1u32 << sets.len())).collect();
    masks.sort_by_key(|m| (m.count_ones(), *m));

    let cells = masks
        .into_iter()
        .map(|mask| OverlapCell {
            platforms: sets
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, s)| s.platform.clone())
                .collect(),
            count: by_mask.get(&mask).copied().unwrap_or(0),
        })
        .collect();

    let sizes = sets
        .iter()
        .map(|s| SetSize {
            platform: s.platform.clone(),
            size: s.names.len(),
        })
        .collect();

    Ok(Overlap { sizes, cells })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(platform: &str, names: &[&str]) -> NameSet {
        NameSet {
            platform: platform.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }

    #[test]
    fn test_three_way_cells() {
        let sets = [
            set("ubereats", &["A", "B", "C", "D"]),
            set("takeaway", &["B", "C", "E"]),
            set("deliveroo", &["C", "D", "F", "G"]),
        ];
        let result = overlap(&sets).unwrap();
        assert_eq!(result.cells.len(), 7);
        assert_eq!(result.cell(&["ubereats"]), Some(1));
        assert_eq!(result.cell(&["takeaway"]), Some(1));
        assert_eq!(result.cell(&["deliveroo"]), Some(2));
        assert_eq!(result.cell(&["ubereats", "takeaway"]), Some(1));
        assert_eq!(result.cell(&["deliveroo", "ubereats"]), Some(1));
        assert_eq!(result.cell(&["takeaway", "deliveroo"]), Some(0));
        assert_eq!(result.shared_by_all(), 1);
        let total: usize = result.cells.iter().map(|c| c.count).sum();
        assert_eq!(total, 7);
    }

    #[test]
    fn test_cell_order_singles_first() {
        let sets = [set("a", &[]), set("b", &[]), set("c", &[])];
        let result = overlap(&sets).unwrap();
        let sizes: Vec<usize> = result.cells.iter().map(|c| c.platforms.len()).collect();
        assert_eq!(sizes, vec![1, 1, 1, 2, 2, 2, 3]);
        assert_eq!(result.cells[3].platforms, vec!["a", "b"]);
    }

    #[test]
    fn test_names_trimmed_and_deduplicated() {
        let records = vec![
            RawRecord {
                name: Some(" Pizza Roma ".into()),
                ..Default::default()
            },
            RawRecord {
                name: Some("Pizza Roma".into()),
                ..Default::default()
            },
            RawRecord {
                name: Some("   ".into()),
                ..Default::default()
            },
            RawRecord::default(),
        ];
        let names = NameSet::from_records("deliveroo", &records);
        assert_eq!(names.names.len(), 1);
    }

    #[test]
    fn test_sizes_reported() {
        let result = overlap(&[set("a", &["x", "y"]), set("b", &["y"])]).unwrap();
        assert_eq!(
            result.sizes,
            vec![
                SetSize {
                    platform: "a".into(),
                    size: 2
                },
                SetSize {
                    platform: "b".into(),
                    size: 1
                },
            ]
        );
    }

    #[test]
    fn test_no_sets_is_error() {
        assert!(overlap(&[]).is_err());
    }
}

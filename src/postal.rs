//! Postal-code to province classification.
//!
//! Belgian postal codes are allocated in contiguous blocks per province, so a
//! small ordered table of half-open ranges is enough to place a code.

use std::ops::Range;

use crate::region::CanonicalRegion;

/// One row of the range table: codes in `codes` belong to `region`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalRange {
    pub codes: Range<u32>,
    pub region: CanonicalRegion,
}

const fn range(start: u32, end: u32, region: CanonicalRegion) -> PostalRange {
    PostalRange {
        codes: start..end,
        region,
    }
}

/// Belgian postal ranges. Flemish Brabant appears twice: the Halle-Vilvoorde
/// block and the Leuven block. [6000, 6600) is intentionally absent.
pub const BELGIAN_POSTAL_RANGES: [PostalRange; 12] = [
    range(1000, 1300, CanonicalRegion::BrusselsCapital),
    range(1300, 1500, CanonicalRegion::WalloonBrabant),
    range(1500, 2000, CanonicalRegion::FlemishBrabant),
    range(2000, 3000, CanonicalRegion::Antwerp),
    range(3000, 3500, CanonicalRegion::FlemishBrabant),
    range(3500, 4000, CanonicalRegion::Limburg),
    range(4000, 5000, CanonicalRegion::Liege),
    range(5000, 6000, CanonicalRegion::Namur),
    range(6600, 7000, CanonicalRegion::Luxembourg),
    range(7000, 8000, CanonicalRegion::Hainaut),
    range(8000, 9000, CanonicalRegion::WestFlanders),
    range(9000, 10000, CanonicalRegion::EastFlanders),
];

/// What to do with a postal code that is missing, has no digits, or is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidPostalPolicy {
    /// Drop the record before counting.
    #[default]
    Exclude,
    /// Count the record under Unknown.
    Unknown,
}

/// Outcome of classifying one postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Region(CanonicalRegion),
    /// A valid code outside every range; carries the cleaned code for auditing.
    Unknown(String),
    /// Missing or malformed input that does not take part in counting.
    Excluded,
}

/// Strip every non-digit and parse what remains.
///
/// Returns `None` for empty results, zero, and values that overflow `u32`.
pub fn parse_postal_code(raw: &str) -> Option<u32> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(code) => Some(code),
    }
}

/// Range-table classifier. The table is injected so alternative allocations can
/// be tested without touching the Belgian defaults.
#[derive(Debug, Clone)]
pub struct PostalClassifier {
    ranges: Vec<PostalRange>,
    invalid_policy: InvalidPostalPolicy,
}

impl Default for PostalClassifier {
    fn default() -> Self {
        Self::new(BELGIAN_POSTAL_RANGES.to_vec(), InvalidPostalPolicy::default())
    }
}

impl PostalClassifier {
    pub fn new(ranges: Vec<PostalRange>, invalid_policy: InvalidPostalPolicy) -> Self {
        Self {
            ranges,
            invalid_policy,
        }
    }

    pub fn with_policy(invalid_policy: InvalidPostalPolicy) -> Self {
        Self {
            invalid_policy,
            ..Self::default()
        }
    }

    pub fn invalid_policy(&self) -> InvalidPostalPolicy {
        self.invalid_policy
    }

    /// Region for an already-parsed code. First matching range wins.
    pub fn region_for(&self, code: u32) -> Option<CanonicalRegion> {
        self.ranges
            .iter()
            .find(|r| r.codes.contains(&code))
            .map(|r| r.region)
    }

    /// Classify a raw postal-code cell. `None` is an absent cell.
    pub fn classify(&self, raw: Option<&str>) -> Classification {
        let Some(code) = raw.and_then(parse_postal_code) else {
            return match self.invalid_policy {
                InvalidPostalPolicy::Exclude => Classification::Excluded,
                InvalidPostalPolicy::Unknown => {
                    Classification::Unknown(raw.unwrap_or_default().trim().to_string())
                }
            };
        };

        match self.region_for(code) {
            Some(region) => Classification::Region(region),
            None => Classification::Unknown(code.to_string()),
        }
    }
}

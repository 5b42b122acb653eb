use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// One of the eleven Belgian provinces used as comparison keys across platforms.
///
/// Variant order is the canonical table order; it is the tie-break order when
/// region tables are sorted by count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "&'static str")]
pub enum CanonicalRegion {
    BrusselsCapital,
    WalloonBrabant,
    FlemishBrabant,
    Antwerp,
    Limburg,
    Liege,
    Namur,
    Luxembourg,
    Hainaut,
    WestFlanders,
    EastFlanders,
}

impl CanonicalRegion {
    /// All regions in canonical table order.
    pub const ALL: [CanonicalRegion; 11] = [
        CanonicalRegion::BrusselsCapital,
        CanonicalRegion::WalloonBrabant,
        CanonicalRegion::FlemishBrabant,
        CanonicalRegion::Antwerp,
        CanonicalRegion::Limburg,
        CanonicalRegion::Liege,
        CanonicalRegion::Namur,
        CanonicalRegion::Luxembourg,
        CanonicalRegion::Hainaut,
        CanonicalRegion::WestFlanders,
        CanonicalRegion::EastFlanders,
    ];

    /// Display name, as used in every output table.
    pub fn name(self) -> &'static str {
        match self {
            CanonicalRegion::BrusselsCapital => "Brussels-Capital Region",
            CanonicalRegion::WalloonBrabant => "Walloon Brabant",
            CanonicalRegion::FlemishBrabant => "Flemish Brabant",
            CanonicalRegion::Antwerp => "Antwerp",
            CanonicalRegion::Limburg => "Limburg",
            CanonicalRegion::Liege => "Liège",
            CanonicalRegion::Namur => "Namur",
            CanonicalRegion::Luxembourg => "Luxembourg",
            CanonicalRegion::Hainaut => "Hainaut",
            CanonicalRegion::WestFlanders => "West Flanders",
            CanonicalRegion::EastFlanders => "East Flanders",
        }
    }

    /// Position in [`CanonicalRegion::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl From<CanonicalRegion> for &'static str {
    fn from(region: CanonicalRegion) -> Self {
        region.name()
    }
}

impl fmt::Display for CanonicalRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string is not one of the eleven canonical names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a canonical region: {0:?}")]
pub struct UnknownRegion(pub String);

impl FromStr for CanonicalRegion {
    type Err = UnknownRegion;

    /// Parses an exact canonical name. Platform spellings go through
    /// [`crate::alias::AliasResolver`] instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CanonicalRegion::ALL
            .into_iter()
            .find(|r| r.name() == s)
            .ok_or_else(|| UnknownRegion(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_has_eleven_distinct_regions() {
        let mut names: Vec<&str> = CanonicalRegion::ALL.iter().map(|r| r.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 11);
    }

    #[test]
    fn test_index_matches_table_order() {
        for (i, region) in CanonicalRegion::ALL.iter().enumerate() {
            assert_eq!(region.index(), i);
        }
    }

    #[test]
    fn test_from_str_round_trips_names() {
        for region in CanonicalRegion::ALL {
            assert_eq!(region.name().parse::<CanonicalRegion>(), Ok(region));
        }
    }

    #[test]
    fn test_from_str_rejects_platform_spelling() {
        assert!("anvers".parse::<CanonicalRegion>().is_err());
        assert!("brussels-capital region".parse::<CanonicalRegion>().is_err());
    }

    #[test]
    fn test_serializes_as_display_name() {
        let json = serde_json::to_string(&CanonicalRegion::Liege).unwrap();
        assert_eq!(json, "\"Liège\"");
    }
}

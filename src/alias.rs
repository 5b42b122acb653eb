//! Platform region labels to canonical regions.

use std::collections::HashMap;

use crate::region::CanonicalRegion;

/// Region labels as published by the platform that ships pre-assigned regions
/// (lowercase French slugs). Matching is case-sensitive.
pub const PLATFORM_REGION_ALIASES: [(&str, CanonicalRegion); 10] = [
    ("anvers", CanonicalRegion::Antwerp),
    ("bruxelles-capitale", CanonicalRegion::BrusselsCapital),
    ("flandre-orientale", CanonicalRegion::EastFlanders),
    ("brabant-flamand", CanonicalRegion::FlemishBrabant),
    ("flandre-occidentale", CanonicalRegion::WestFlanders),
    ("brabant-wallon", CanonicalRegion::WalloonBrabant),
    ("limbourg", CanonicalRegion::Limburg),
    ("liège", CanonicalRegion::Liege),
    // UTF-8 "liège" read back as Latin-1 by the scraper.
    ("liÃ¨ge", CanonicalRegion::Liege),
    ("hainaut", CanonicalRegion::Hainaut),
];

/// Where labels without a table entry end up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasFallback {
    Region(CanonicalRegion),
    Unknown,
}

impl Default for AliasFallback {
    /// Unmatched and absent labels land in Luxembourg, which is how the
    /// published comparison tables were built.
    fn default() -> Self {
        AliasFallback::Region(CanonicalRegion::Luxembourg)
    }
}

/// Result of resolving one label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasResolution {
    /// The label had a table entry.
    Matched(CanonicalRegion),
    /// No entry; the fallback region was applied.
    Fallback(CanonicalRegion),
    /// No entry and the fallback is Unknown. Carries the raw label.
    Unknown(String),
}

impl AliasResolution {
    pub fn region(&self) -> Option<CanonicalRegion> {
        match self {
            AliasResolution::Matched(r) | AliasResolution::Fallback(r) => Some(*r),
            AliasResolution::Unknown(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AliasResolver {
    table: HashMap<String, CanonicalRegion>,
    fallback: AliasFallback,
}

impl Default for AliasResolver {
    fn default() -> Self {
        Self::new(PLATFORM_REGION_ALIASES, AliasFallback::default())
    }
}

impl AliasResolver {
    pub fn new<I, S>(aliases: I, fallback: AliasFallback) -> Self
    where
        I: IntoIterator<Item = (S, CanonicalRegion)>,
        S: Into<String>,
    {
        Self {
            table: aliases.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            fallback,
        }
    }

    pub fn with_fallback(fallback: AliasFallback) -> Self {
        Self {
            fallback,
            ..Self::default()
        }
    }

    pub fn fallback(&self) -> AliasFallback {
        self.fallback
    }

    /// Resolve a label. `None` (a null cell) is treated like an unmatched label.
    pub fn resolve(&self, label: Option<&str>) -> AliasResolution {
        if let Some(region) = label.and_then(|l| self.table.get(l)) {
            return AliasResolution::Matched(*region);
        }
        match self.fallback {
            AliasFallback::Region(region) => AliasResolution::Fallback(region),
            AliasFallback::Unknown => AliasResolution::Unknown(label.unwrap_or_default().to_string()),
        }
    }
}

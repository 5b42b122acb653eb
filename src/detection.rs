use std::path::Path;

use serde::Serialize;

use crate::error::NormalizeError;
use crate::source::{Column, RecordSet};

/// How a platform encodes where its restaurants are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecordShape {
    /// One row per restaurant (or per postal code, weighted) with a postal code.
    PostalCodes,
    /// Rows carry a region label assigned by the platform.
    RegionLabels,
    /// Restaurant rows joined to a one-to-many location table.
    JoinedLocations,
}

impl RecordShape {
    pub fn required_columns(self) -> &'static [Column] {
        match self {
            RecordShape::PostalCodes => &[Column::PostalCode],
            RecordShape::RegionLabels => &[Column::RegionLabel],
            RecordShape::JoinedLocations => &[Column::RestaurantKey, Column::PostalCode],
        }
    }
}

/// Pick the shape from the columns present.
///
/// Priority: key + postal code → postal code → region label.
pub fn detect_shape(set: &RecordSet) -> Result<RecordShape, NormalizeError> {
    let has_postal = set.has_column(Column::PostalCode);
    if has_postal && set.has_column(Column::RestaurantKey) {
        return Ok(RecordShape::JoinedLocations);
    }
    if has_postal {
        return Ok(RecordShape::PostalCodes);
    }
    if set.has_column(Column::RegionLabel) {
        return Ok(RecordShape::RegionLabels);
    }
    Err(NormalizeError::MissingColumn {
        platform: set.platform.clone(),
        column: format!(
            "{} or {}",
            Column::PostalCode.as_str(),
            Column::RegionLabel.as_str()
        ),
    })
}

/// Detect the input format from a file path and optional header bytes.
///
/// Priority: content heuristic → file extension.
pub fn detect_format(path: &Path, header_bytes: &[u8]) -> Option<&'static str> {
    let header = header_bytes
        .strip_prefix(b"\xEF\xBB\xBF")
        .unwrap_or(header_bytes);

    // JSON heuristic: starts with { or [
    if let Some(&first) = header.iter().find(|b| !b.is_ascii_whitespace()) {
        if first == b'{' || first == b'[' {
            return Some("json");
        }
    }

    detect_by_extension(path)
}

/// Detect format by file extension alone.
fn detect_by_extension(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some("csv"),
        "json" => Some("json"),
        _ => None,
    }
}

/// Platform name for a file: its stem, lowercased (`data/Deliveroo.csv` → `deliveroo`).
pub fn platform_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_ascii_lowercase())
}

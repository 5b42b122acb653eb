pub mod csv_source;
pub mod json_source;

use crate::error::NormalizeError;
use crate::normalize::{NormalizeWarning, WarningCode};

pub use csv_source::CsvSource;
pub use json_source::JsonSource;

/// Logical column of a platform table. Each platform spells these differently;
/// [`Column::from_header`] maps the known spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    RestaurantKey,
    Name,
    PostalCode,
    RegionLabel,
    Latitude,
    Longitude,
    Category,
    Weight,
}

impl Column {
    pub fn from_header(header: &str) -> Option<Column> {
        match header.trim() {
            "restaurant_key" | "primarySlug" | "restaurant_id" | "id" => Some(Column::RestaurantKey),
            "name" | "title" => Some(Column::Name),
            "postal_code" | "postalCode" => Some(Column::PostalCode),
            "region_label" | "location__geo__region" | "province" => Some(Column::RegionLabel),
            "latitude" | "location__latitude" => Some(Column::Latitude),
            "longitude" | "location__longitude" => Some(Column::Longitude),
            "category" | "category_id" => Some(Column::Category),
            "restaurant_count" | "province_count" | "count" => Some(Column::Weight),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Column::RestaurantKey => "restaurant_key",
            Column::Name => "name",
            Column::PostalCode => "postal_code",
            Column::RegionLabel => "region_label",
            Column::Latitude => "latitude",
            Column::Longitude => "longitude",
            Column::Category => "category",
            Column::Weight => "restaurant_count",
        }
    }
}

/// One row of a platform table. Empty cells are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub restaurant_key: Option<String>,
    pub name: Option<String>,
    pub postal_code: Option<String>,
    pub region_label: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub category: Option<String>,
    /// How many restaurants this row stands for. Pre-aggregated sources
    /// (one row per postal code) carry their count here.
    pub weight: u64,
}

impl Default for RawRecord {
    fn default() -> Self {
        Self {
            restaurant_key: None,
            name: None,
            postal_code: None,
            region_label: None,
            latitude: None,
            longitude: None,
            category: None,
            weight: 1,
        }
    }
}

impl RawRecord {
    fn set(&mut self, column: Column, value: Option<String>) -> Result<(), String> {
        match column {
            Column::RestaurantKey => self.restaurant_key = value,
            Column::Name => self.name = value,
            Column::PostalCode => self.postal_code = value,
            Column::RegionLabel => self.region_label = value,
            Column::Latitude => self.latitude = value,
            Column::Longitude => self.longitude = value,
            Column::Category => self.category = value,
            Column::Weight => {
                if let Some(v) = value {
                    self.weight = parse_weight(&v)?;
                }
            }
        }
        Ok(())
    }
}

/// Largest restaurant count one row may carry. Keeps per-region sums far from `u64` overflow.
pub const MAX_WEIGHT: u64 = u32::MAX as u64;

/// Row counts arrive either as integers or as floats from a dataframe export.
fn parse_weight(value: &str) -> Result<u64, String> {
    let value = value.trim();
    let weight = match value.parse::<u64>() {
        Ok(n) => n,
        Err(_) => match value.parse::<f64>() {
            Ok(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => f as u64,
            _ => return Err(format!("invalid restaurant count {value:?}")),
        },
    };
    if weight > MAX_WEIGHT {
        return Err(format!("restaurant count {value} exceeds {MAX_WEIGHT}"));
    }
    Ok(weight)
}

/// All rows read for one platform.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    pub platform: String,
    /// Logical columns present in the source header, in header order.
    pub columns: Vec<Column>,
    pub records: Vec<RawRecord>,
    /// Recoverable issues met while reading.
    pub warnings: Vec<NormalizeWarning>,
}

impl RecordSet {
    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    pub fn require_column(&self, column: Column) -> Result<(), NormalizeError> {
        if self.has_column(column) {
            Ok(())
        } else {
            Err(NormalizeError::MissingColumn {
                platform: self.platform.clone(),
                column: column.as_str().to_string(),
            })
        }
    }

    pub fn require_records(&self) -> Result<(), NormalizeError> {
        if self.records.is_empty() {
            Err(NormalizeError::EmptySource {
                platform: self.platform.clone(),
            })
        } else {
            Ok(())
        }
    }
}

/// Builds [`RawRecord`]s from header-ordered cells.
pub(crate) struct RowMapper {
    platform: String,
    /// Logical column per source column; `None` for ignored columns.
    slots: Vec<Option<Column>>,
}

impl RowMapper {
    pub(crate) fn new<'a>(platform: &str, headers: impl IntoIterator<Item = &'a str>) -> Self {
        let mut seen = Vec::new();
        let slots = headers
            .into_iter()
            .map(|h| {
                // First header wins when two spellings of one column are present.
                Column::from_header(h).filter(|c| {
                    if seen.contains(c) {
                        false
                    } else {
                        seen.push(*c);
                        true
                    }
                })
            })
            .collect();
        Self {
            platform: platform.to_string(),
            slots,
        }
    }

    pub(crate) fn columns(&self) -> Vec<Column> {
        self.slots.iter().flatten().copied().collect()
    }

    /// `row` is 1-based, counting data rows only.
    pub(crate) fn map_row<'a>(
        &self,
        row: usize,
        cells: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Result<RawRecord, NormalizeError> {
        let mut record = RawRecord::default();
        for (slot, cell) in self.slots.iter().zip(cells) {
            let Some(column) = slot else { continue };
            let value = cell
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);
            record
                .set(*column, value)
                .map_err(|reason| NormalizeError::MalformedRecord {
                    platform: self.platform.clone(),
                    row,
                    reason,
                })?;
        }
        Ok(record)
    }
}

/// Decode input bytes as UTF-8, falling back to Windows-1252 for legacy exports.
pub(crate) fn decode_text(data: &[u8]) -> (String, Option<NormalizeWarning>) {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    match std::str::from_utf8(data) {
        Ok(text) => (text.to_string(), None),
        Err(_) => {
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(data);
            let warning = NormalizeWarning {
                code: WarningCode::NonUtf8Input,
                message: "input is not valid UTF-8, decoded as Windows-1252".to_string(),
                location: None,
            };
            (text.into_owned(), Some(warning))
        }
    }
}

/// Trait implemented by each input format reader.
pub trait SourceReader {
    /// Returns the file extensions this reader supports (e.g., `["csv"]`).
    fn supported_extensions(&self) -> &[&str];

    fn can_read(&self, extension: &str) -> bool {
        self.supported_extensions().contains(&extension)
    }

    /// Parse file bytes into the records of `platform`.
    fn read(&self, data: &[u8], platform: &str) -> Result<RecordSet, NormalizeError>;
}

static READERS: &[&(dyn SourceReader + Sync)] = &[&CsvSource, &JsonSource];

/// Find the reader registered for `extension`.
pub fn reader_for(extension: &str) -> Option<&'static dyn SourceReader> {
    READERS
        .iter()
        .find(|r| r.can_read(extension))
        .map(|r| *r as &dyn SourceReader)
}

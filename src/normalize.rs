use serde::Serialize;

use crate::aggregate::{RegionTable, RegionTally};
use crate::alias::{AliasFallback, AliasResolution, AliasResolver};
use crate::dedup::dedup_by_restaurant;
use crate::detection::{RecordShape, detect_shape};
use crate::error::NormalizeError;
use crate::postal::{Classification, InvalidPostalPolicy, PostalClassifier};
use crate::source::{RawRecord, RecordSet};

/// Categories for recoverable data-quality issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningCode {
    /// Postal code missing, without digits, or zero.
    ExcludedPostalCode,
    /// Valid postal code outside every known range.
    UnknownPostalCode,
    /// Region label without a table entry; the fallback was applied.
    FallbackRegionLabel,
    /// Region label without a table entry and no fallback region.
    UnknownRegionLabel,
    /// Joined rows repeated a restaurant key.
    DuplicateRestaurant,
    /// Coordinates missing, unparsable, or outside the bounding box.
    InvalidCoordinates,
    /// Input bytes were not UTF-8.
    NonUtf8Input,
}

/// A recoverable issue met while normalizing.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizeWarning {
    pub code: WarningCode,
    pub message: String,
    pub location: Option<String>,
}

/// Options controlling normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Fate of missing, digit-less, and zero postal codes.
    pub invalid_postal: InvalidPostalPolicy,
    /// Region for labels without an alias entry.
    pub alias_fallback: AliasFallback,
    /// Force a record shape instead of detecting it from the columns.
    pub shape: Option<RecordShape>,
    /// If true, unknown postal codes and unmatched labels are errors.
    pub strict: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            invalid_postal: InvalidPostalPolicy::Exclude,
            alias_fallback: AliasFallback::default(),
            shape: None,
            strict: false,
        }
    }
}

impl NormalizeOptions {
    pub fn classifier(&self) -> PostalClassifier {
        PostalClassifier::with_policy(self.invalid_postal)
    }

    pub fn resolver(&self) -> AliasResolver {
        AliasResolver::with_fallback(self.alias_fallback)
    }
}

/// Normalized output for one platform.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformReport {
    pub shape: RecordShape,
    pub table: RegionTable,
    /// Rows read before deduplication.
    pub rows_read: usize,
    pub warnings: Vec<NormalizeWarning>,
}

/// Turns one platform's records into a canonical region table.
pub struct RegionNormalizer {
    classifier: PostalClassifier,
    resolver: AliasResolver,
    shape: Option<RecordShape>,
    strict: bool,
}

impl RegionNormalizer {
    pub fn new(options: &NormalizeOptions) -> Self {
        Self::with_tables(options.classifier(), options.resolver(), options)
    }

    /// Build with explicit lookup tables.
    pub fn with_tables(
        classifier: PostalClassifier,
        resolver: AliasResolver,
        options: &NormalizeOptions,
    ) -> Self {
        Self {
            classifier,
            resolver,
            shape: options.shape,
            strict: options.strict,
        }
    }

    pub fn normalize(&self, set: &RecordSet) -> Result<PlatformReport, NormalizeError> {
        let shape = match self.shape {
            Some(shape) => shape,
            None => detect_shape(set)?,
        };
        for column in shape.required_columns() {
            set.require_column(*column)?;
        }
        set.require_records()?;

        let mut warnings = set.warnings.clone();
        let mut tally = RegionTally::default();

        match shape {
            RecordShape::PostalCodes => {
                self.tally_postal(set, &set.records, &mut tally, &mut warnings)?;
            }
            RecordShape::JoinedLocations => {
                let unique = dedup_by_restaurant(&set.platform, &set.records)?;
                let dropped = set.records.len() - unique.len();
                if dropped > 0 {
                    warnings.push(NormalizeWarning {
                        code: WarningCode::DuplicateRestaurant,
                        message: format!("{dropped} location rows collapsed into their restaurant"),
                        location: None,
                    });
                }
                self.tally_postal(set, &unique, &mut tally, &mut warnings)?;
            }
            RecordShape::RegionLabels => {
                self.tally_labels(set, &mut tally, &mut warnings)?;
            }
        }

        let table = tally.into_table(&set.platform);
        tracing::debug!(
            platform = %set.platform,
            ?shape,
            total = table.total(),
            unknown = table.unknown_total(),
            excluded = table.excluded,
            "normalized platform"
        );

        Ok(PlatformReport {
            shape,
            table,
            rows_read: set.records.len(),
            warnings,
        })
    }

    fn tally_postal(
        &self,
        set: &RecordSet,
        records: &[RawRecord],
        tally: &mut RegionTally,
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<(), NormalizeError> {
        for (i, record) in records.iter().enumerate() {
            let raw = record.postal_code.as_deref();
            let classification = self.classifier.classify(raw);
            match &classification {
                Classification::Region(_) => {}
                Classification::Excluded => {
                    warnings.push(NormalizeWarning {
                        code: WarningCode::ExcludedPostalCode,
                        message: format!("postal code {:?} excluded", raw.unwrap_or_default()),
                        location: Some(row_location(i, record)),
                    });
                }
                Classification::Unknown(code) => {
                    if self.strict {
                        return Err(NormalizeError::Unmatched {
                            platform: set.platform.clone(),
                            kind: "postal code",
                            value: raw.unwrap_or_default().to_string(),
                        });
                    }
                    warnings.push(NormalizeWarning {
                        code: WarningCode::UnknownPostalCode,
                        message: format!("postal code {code:?} matches no region"),
                        location: Some(row_location(i, record)),
                    });
                }
            }
            tally.add(&classification, record.weight);
        }
        Ok(())
    }

    fn tally_labels(
        &self,
        set: &RecordSet,
        tally: &mut RegionTally,
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<(), NormalizeError> {
        for (i, record) in set.records.iter().enumerate() {
            let label = record.region_label.as_deref();
            let resolution = self.resolver.resolve(label);
            let classification = match resolution {
                AliasResolution::Matched(region) => Classification::Region(region),
                AliasResolution::Fallback(region) => {
                    if self.strict {
                        return Err(unmatched_label(set, label));
                    }
                    warnings.push(NormalizeWarning {
                        code: WarningCode::FallbackRegionLabel,
                        message: format!(
                            "region label {:?} has no alias, counted as {region}",
                            label.unwrap_or_default()
                        ),
                        location: Some(row_location(i, record)),
                    });
                    Classification::Region(region)
                }
                AliasResolution::Unknown(raw) => {
                    if self.strict {
                        return Err(unmatched_label(set, label));
                    }
                    warnings.push(NormalizeWarning {
                        code: WarningCode::UnknownRegionLabel,
                        message: format!("region label {raw:?} has no alias"),
                        location: Some(row_location(i, record)),
                    });
                    Classification::Unknown(raw)
                }
            };
            tally.add(&classification, record.weight);
        }
        Ok(())
    }
}

fn unmatched_label(set: &RecordSet, label: Option<&str>) -> NormalizeError {
    NormalizeError::Unmatched {
        platform: set.platform.clone(),
        kind: "region label",
        value: label.unwrap_or_default().to_string(),
    }
}

fn row_location(index: usize, record: &RawRecord) -> String {
    match &record.restaurant_key {
        Some(key) => format!("row {} ({key})", index + 1),
        None => format!("row {}", index + 1),
    }
}

/// Normalize one platform's records with the default lookup tables.
pub fn normalize_records(
    set: &RecordSet,
    options: &NormalizeOptions,
) -> Result<PlatformReport, NormalizeError> {
    RegionNormalizer::new(options).normalize(set)
}

pub mod aggregate;
pub mod alias;
pub mod dedup;
pub mod detection;
pub mod error;
pub mod geo;
pub mod markdown;
pub mod merge;
pub mod normalize;
pub mod overlap;
pub mod postal;
pub mod region;
pub mod report;
pub mod source;
pub mod vegetarian;

pub use aggregate::{LabelCount, RegionCount, RegionTable};
pub use alias::{AliasFallback, AliasResolver};
pub use detection::RecordShape;
pub use error::NormalizeError;
pub use merge::{MergedTable, merge_platforms};
pub use normalize::{
    NormalizeOptions, NormalizeWarning, PlatformReport, RegionNormalizer, WarningCode,
    normalize_records,
};
pub use postal::{Classification, InvalidPostalPolicy, PostalClassifier};
pub use region::CanonicalRegion;
pub use report::{DistributionReport, OutputFormat};
pub use source::{RawRecord, RecordSet};

use std::path::Path;

/// Read a platform table from a file.
///
/// The format is detected from content and file extension. `platform`
/// defaults to the lowercased file stem.
pub fn load_file(
    path: impl AsRef<Path>,
    platform: Option<&str>,
) -> Result<RecordSet, NormalizeError> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;

    let header = &data[..data.len().min(16)];
    let extension = match detection::detect_format(path, header) {
        Some(format) => format,
        None => path.extension().and_then(|e| e.to_str()).unwrap_or(""),
    };

    let platform = match platform {
        Some(p) => p.to_string(),
        None => detection::platform_from_path(path).ok_or_else(|| {
            NormalizeError::InvalidArgument {
                reason: format!("cannot derive a platform name from {}", path.display()),
            }
        })?,
    };

    load_bytes(&data, extension, &platform)
}

/// Read a platform table from raw bytes with an explicit format extension.
pub fn load_bytes(
    data: &[u8],
    extension: &str,
    platform: &str,
) -> Result<RecordSet, NormalizeError> {
    let reader =
        source::reader_for(extension).ok_or_else(|| NormalizeError::UnsupportedFormat {
            extension: extension.to_string(),
        })?;
    let set = reader.read(data, platform)?;
    tracing::debug!(
        platform,
        extension,
        rows = set.records.len(),
        columns = set.columns.len(),
        "loaded platform table"
    );
    Ok(set)
}

/// Normalize every platform and merge the results for comparison.
pub fn distribution(
    sets: &[RecordSet],
    options: &NormalizeOptions,
) -> Result<DistributionReport, NormalizeError> {
    let normalizer = RegionNormalizer::new(options);
    let platforms = sets
        .iter()
        .map(|set| normalizer.normalize(set))
        .collect::<Result<Vec<_>, _>>()?;
    let tables: Vec<RegionTable> = platforms.iter().map(|p| p.table.clone()).collect();
    let merged = merge_platforms(&tables);
    Ok(DistributionReport { platforms, merged })
}

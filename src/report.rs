//! Markdown and JSON rendering of normalized tables.

use serde::Serialize;

use crate::error::NormalizeError;
use crate::geo::PointSet;
use crate::markdown::{Table, format_heading, format_list_item};
use crate::merge::MergedTable;
use crate::normalize::PlatformReport;
use crate::overlap::Overlap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

/// Per-platform tables plus their cross-platform merge.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub platforms: Vec<PlatformReport>,
    pub merged: MergedTable,
}

fn to_json<T: Serialize>(value: &T) -> Result<String, NormalizeError> {
    let mut out = serde_json::to_string_pretty(value)?;
    out.push('\n');
    Ok(out)
}

pub fn render_distribution(
    report: &DistributionReport,
    format: OutputFormat,
) -> Result<String, NormalizeError> {
    if format == OutputFormat::Json {
        return to_json(report);
    }

    let mut out = format_heading(1, "Restaurants by province");

    for platform in &report.platforms {
        let table = &platform.table;
        out.push('\n');
        out.push_str(&format_heading(2, &table.platform));
        out.push('\n');
        let mut counts = Table::counts("Province", "Restaurants");
        for row in &table.rows {
            counts.push_count(row.region.name(), row.count);
        }
        out.push_str(&counts.render());

        if !table.unknown.is_empty() {
            out.push('\n');
            out.push_str(&format_heading(3, "Unmatched"));
            out.push('\n');
            let mut unmatched = Table::counts("Label", "Restaurants");
            for label in &table.unknown {
                unmatched.push_count(label.label.as_str(), label.count);
            }
            out.push_str(&unmatched.render());
        }
        if table.excluded > 0 {
            out.push('\n');
            out.push_str(&format!("Excluded: {}\n", table.excluded));
        }
    }

    if !report.merged.totals.is_empty() {
        out.push('\n');
        out.push_str(&format_heading(2, "All platforms"));
        out.push('\n');
        out.push_str(&comparison_table(&report.merged));
    }

    Ok(out)
}

/// Wide table: one row per label, one column per platform, plus the total.
fn comparison_table(merged: &MergedTable) -> String {
    let platforms = merged.platforms();
    let mut table = platforms
        .iter()
        .fold(Table::new().text("Province"), |t, p| t.count(p))
        .count("Total");

    for total in &merged.totals {
        let per_platform = platforms
            .iter()
            .map(|p| merged.count(&total.label, p).unwrap_or(0));
        table.push_counts(
            total.label.as_str(),
            per_platform.chain(std::iter::once(total.count)),
        );
    }
    table.render()
}

pub fn render_points(sets: &[PointSet], format: OutputFormat) -> Result<String, NormalizeError> {
    if format == OutputFormat::Json {
        return to_json(&sets);
    }

    let mut out = format_heading(1, "Restaurant locations");
    out.push('\n');
    let mut summary = Table::new()
        .text("Platform")
        .count("In bounds")
        .count("Outside")
        .count("Missing");
    for s in sets {
        summary.push_counts(
            s.platform.as_str(),
            [s.points.len(), s.outside.len(), s.missing].map(|n| n as u64),
        );
    }
    out.push_str(&summary.render());

    let mut points = Table::new()
        .text("Platform")
        .text("Name")
        .count("Latitude")
        .count("Longitude");
    for p in sets.iter().flat_map(|s| &s.points) {
        points.push_row(vec![
            p.platform.clone(),
            p.name.clone().unwrap_or_default(),
            p.latitude.to_string(),
            p.longitude.to_string(),
        ]);
    }
    if !points.is_empty() {
        out.push('\n');
        out.push_str(&format_heading(2, "Points"));
        out.push('\n');
        out.push_str(&points.render());
    }

    Ok(out)
}

pub fn render_overlap(overlap: &Overlap, format: OutputFormat) -> Result<String, NormalizeError> {
    if format == OutputFormat::Json {
        return to_json(overlap);
    }

    let mut out = format_heading(1, "Restaurant names across platforms");
    out.push('\n');
    for size in &overlap.sizes {
        out.push_str(&format_list_item(
            0,
            &format!("{}: {} names", size.platform, size.size),
        ));
    }
    out.push('\n');
    let mut cells = Table::counts("Only on", "Restaurants");
    for cell in &overlap.cells {
        cells.push_count(cell.platforms.join(" & "), cell.count as u64);
    }
    out.push_str(&cells.render());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate;
    use crate::detection::RecordShape;
    use crate::geo::{BELGIUM, validate_points};
    use crate::merge::merge_platforms;
    use crate::overlap::{NameSet, overlap};
    use crate::postal::Classification;
    use crate::region::CanonicalRegion;
    use crate::source::RawRecord;

    fn report() -> DistributionReport {
        let deliveroo = aggregate(
            "deliveroo",
            vec![
                (Classification::Region(CanonicalRegion::Antwerp), 4),
                (Classification::Unknown("6500".into()), 1),
                (Classification::Excluded, 2),
            ],
        );
        let takeaway = aggregate(
            "takeaway",
            vec![(Classification::Region(CanonicalRegion::Liege), 9)],
        );
        let merged = merge_platforms(&[deliveroo.clone(), takeaway.clone()]);
        let platforms = [deliveroo, takeaway]
            .into_iter()
            .map(|table| PlatformReport {
                shape: RecordShape::PostalCodes,
                table,
                rows_read: 0,
                warnings: Vec::new(),
            })
            .collect();
        DistributionReport { platforms, merged }
    }

    #[test]
    fn test_distribution_markdown() {
        let md = render_distribution(&report(), OutputFormat::Markdown).unwrap();
        assert!(md.starts_with("# Restaurants by province\n"));
        assert!(md.contains("## deliveroo"));
        assert!(md.contains("| Antwerp | 4 |"));
        assert!(md.contains("| 6500 | 1 |"));
        assert!(md.contains("Excluded: 2"));
        assert!(md.contains("| Province | deliveroo | takeaway | Total |"));
        assert!(md.contains("| Liège | 0 | 9 | 9 |"));
        assert!(md.contains("| Antwerp | 4 | 0 | 4 |"));
    }

    #[test]
    fn test_distribution_json() {
        let json = render_distribution(&report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = value["platforms"][0]["table"]["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 11);
        assert_eq!(rows[0]["region"], "Antwerp");
        assert_eq!(rows[0]["count"], 4);
        assert_eq!(value["merged"]["totals"][0]["label"], "Liège");
    }

    #[test]
    fn test_points_markdown() {
        let records = vec![RawRecord {
            name: Some("Frituur".into()),
            latitude: Some("51.2".into()),
            longitude: Some("4.4".into()),
            ..Default::default()
        }];
        let sets = vec![validate_points("takeaway", &records, &BELGIUM)];
        let md = render_points(&sets, OutputFormat::Markdown).unwrap();
        assert!(md.contains("| takeaway | 1 | 0 | 0 |"));
        assert!(md.contains("| takeaway | Frituur | 51.2 | 4.4 |"));
    }

    #[test]
    fn test_overlap_markdown() {
        let sets = [
            NameSet {
                platform: "ubereats".into(),
                names: ["A", "B"].iter().map(|s| s.to_string()).collect(),
            },
            NameSet {
                platform: "takeaway".into(),
                names: ["B"].iter().map(|s| s.to_string()).collect(),
            },
        ];
        let md = render_overlap(&overlap(&sets).unwrap(), OutputFormat::Markdown).unwrap();
        assert!(md.contains("- ubereats: 2 names"));
        assert!(md.contains("| ubereats & takeaway | 1 |"));
        assert!(md.contains("| takeaway | 0 |"));
    }
}

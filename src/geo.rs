use serde::Serialize;

use crate::normalize::{NormalizeWarning, WarningCode};
use crate::source::RawRecord;

/// Inclusive latitude/longitude rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Rectangle around Belgium used to frame every restaurant map.
pub const BELGIUM: BoundingBox = BoundingBox {
    min_lat: 50.5,
    max_lat: 51.7,
    min_lon: 2.5,
    max_lon: 6.0,
};

impl BoundingBox {
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoPoint {
    pub platform: String,
    pub latitude: f64,
    pub longitude: f64,
    pub name: Option<String>,
}

/// Points split by validity.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PointSet {
    pub platform: String,
    pub points: Vec<GeoPoint>,
    /// Parsed but outside the bounding box.
    pub outside: Vec<GeoPoint>,
    /// Missing, unparsable, or zero placeholder coordinates.
    pub missing: usize,
    pub warnings: Vec<NormalizeWarning>,
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse coordinates and keep the points inside `bounds`.
///
/// A latitude or longitude of exactly zero is the scraper's placeholder for
/// "unknown" and counts as missing.
pub fn validate_points(platform: &str, records: &[RawRecord], bounds: &BoundingBox) -> PointSet {
    let mut set = PointSet {
        platform: platform.to_string(),
        ..Default::default()
    };

    for record in records {
        let lat = parse_coordinate(record.latitude.as_deref());
        let lon = parse_coordinate(record.longitude.as_deref());
        let (Some(latitude), Some(longitude)) = (lat, lon) else {
            set.missing += 1;
            continue;
        };
        if latitude == 0.0 || longitude == 0.0 {
            set.missing += 1;
            continue;
        }

        let point = GeoPoint {
            platform: platform.to_string(),
            latitude,
            longitude,
            name: record.name.clone(),
        };
        if bounds.contains(latitude, longitude) {
            set.points.push(point);
        } else {
            set.outside.push(point);
        }
    }

    if !set.outside.is_empty() {
        tracing::debug!(
            platform,
            outside = set.outside.len(),
            "coordinates outside the bounding box"
        );
        set.warnings.push(NormalizeWarning {
            code: WarningCode::InvalidCoordinates,
            message: format!("{} points outside the bounding box", set.outside.len()),
            location: None,
        });
    }
    if set.missing > 0 {
        set.warnings.push(NormalizeWarning {
            code: WarningCode::InvalidCoordinates,
            message: format!("{} rows without usable coordinates", set.missing),
            location: None,
        });
    }

    set
}
